//! Stripe and routed-shape types shared by the routing stages.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::geometry::{LineString, Point, Polygon};

/// Stripe direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Warp,
    Weft,
}

impl Direction {
    pub fn name(&self) -> &'static str {
        match self {
            Direction::Warp => "warp",
            Direction::Weft => "weft",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Geometry generated for one color in one direction.
///
/// Filled stripes are polygons, stroked stripes are lines (stripes too
/// narrow to fill).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StripeSet {
    pub polygons: Vec<Polygon>,
    pub lines: Vec<LineString>,
}

impl StripeSet {
    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty() && self.lines.is_empty()
    }
}

/// Per-color stripe geometry for one direction, in generation order.
pub type Stripes = IndexMap<String, StripeSet>;

/// A filled stripe with the entry and exit points used for travel stitching.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutedFill {
    pub polygon: Polygon,
    pub start: Option<Point>,
    pub end: Option<Point>,
    pub direction: Direction,
}

/// A stroked stripe or a travel move.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutedLine {
    pub line: LineString,
    /// Pure travel: geometry only, no stitch styling.
    pub travel: bool,
    pub direction: Direction,
}

/// One routed piece of a color's stitch path.
#[derive(Debug, Clone, PartialEq)]
pub enum RoutedShape {
    Fill(RoutedFill),
    Line(RoutedLine),
}

impl RoutedShape {
    pub fn fill(polygon: Polygon, start: Point, end: Point, direction: Direction) -> Self {
        RoutedShape::Fill(RoutedFill {
            polygon,
            start: Some(start),
            end: Some(end),
            direction,
        })
    }

    pub fn stroke(line: LineString, direction: Direction) -> Self {
        RoutedShape::Line(RoutedLine { line, travel: false, direction })
    }

    pub fn travel(line: LineString, direction: Direction) -> Self {
        RoutedShape::Line(RoutedLine { line, travel: true, direction })
    }

    pub fn direction(&self) -> Direction {
        match self {
            RoutedShape::Fill(fill) => fill.direction,
            RoutedShape::Line(line) => line.direction,
        }
    }

    pub fn is_travel(&self) -> bool {
        matches!(self, RoutedShape::Line(RoutedLine { travel: true, .. }))
    }

    /// Where the needle enters this shape, if known.
    pub fn start_point(&self) -> Option<Point> {
        match self {
            RoutedShape::Fill(fill) => fill.start,
            RoutedShape::Line(line) => line.line.first(),
        }
    }

    /// Where the needle leaves this shape, if known.
    pub fn end_point(&self) -> Option<Point> {
        match self {
            RoutedShape::Fill(fill) => fill.end,
            RoutedShape::Line(line) => line.line.last(),
        }
    }
}

/// Routed shapes of one color, split into fills and strokes.
///
/// The order inside each list is the stitch order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColorGroup {
    pub fills: Vec<RoutedShape>,
    pub strokes: Vec<RoutedShape>,
}

impl ColorGroup {
    pub fn is_empty(&self) -> bool {
        self.fills.is_empty() && self.strokes.is_empty()
    }

    /// Total area of the filled stripes in this group.
    pub fn fill_area(&self) -> f64 {
        self.fills
            .iter()
            .map(|shape| match shape {
                RoutedShape::Fill(fill) => fill.polygon.area(),
                RoutedShape::Line(_) => 0.0,
            })
            .sum()
    }
}

/// Color groups keyed by color, in stitch order.
pub type ColorGroups = IndexMap<String, ColorGroup>;
