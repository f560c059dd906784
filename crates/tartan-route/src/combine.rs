//! Direction routing and warp/weft merging.
//!
//! Warp and weft are routed as two independent graph problems per color,
//! yet a color is stitched as one continuous path. Merging concatenates
//! warp shapes then weft shapes per color and bridges every gap between
//! two annotated fills (and the first stroke of each batch) with a travel
//! along the outline.

use log::debug;

use crate::assemble::{assemble, SegmentSource};
use crate::geometry::{LineString, Point, Polygon};
use crate::graph::{FillGraph, StitchGraphBuilder};
use crate::ring::{boundary_rings, Ring};
use crate::routing_line::extract_routing_lines;
use crate::shapes::{ColorGroup, ColorGroups, Direction, RoutedShape, Stripes};

/// Routing lines of this length or shorter are not handed to the graph.
pub const MIN_SEGMENT_LENGTH: f64 = 5.0;

/// Routes stripes over one outline with one graph builder.
pub struct Router<'a, B: StitchGraphBuilder> {
    builder: &'a B,
    outline: &'a Polygon,
    rings: Vec<Ring>,
}

impl<'a, B: StitchGraphBuilder> Router<'a, B> {
    pub fn new(builder: &'a B, outline: &'a Polygon) -> Self {
        Self { builder, outline, rings: boundary_rings(outline) }
    }

    /// Outline boundary rings, exterior first.
    pub fn rings(&self) -> &[Ring] {
        &self.rings
    }

    /// Route every color of one direction, keeping color order.
    pub fn route_direction(&self, stripes: &Stripes, direction: Direction) -> ColorGroups {
        let routing = extract_routing_lines(stripes);
        stripes
            .iter()
            .zip(routing.values())
            .map(|((color, set), lines)| {
                let group = ColorGroup {
                    fills: self.route_shapes(color, &lines.polygons, Some(&set.polygons), direction),
                    strokes: self.route_shapes(color, &lines.lines, None, direction),
                };
                debug!(
                    "{} {}: {} fill shapes, {} stroke shapes",
                    direction,
                    color,
                    group.fills.len(),
                    group.strokes.len()
                );
                (color.clone(), group)
            })
            .collect()
    }

    /// Graph-route one bucket of lines.
    ///
    /// With `polygons` the segments resolve to those stripe polygons,
    /// otherwise to the line geometry itself.
    fn route_shapes(
        &self,
        color: &str,
        lines: &[LineString],
        polygons: Option<&[Polygon]>,
        direction: Direction,
    ) -> Vec<RoutedShape> {
        let (Some(first), Some(last)) = (
            lines.iter().find_map(LineString::first),
            lines.iter().rev().find_map(LineString::last),
        ) else {
            return Vec::new();
        };

        // Weft paths are read tail to head
        let (start, end) = match direction {
            Direction::Warp => (first, last),
            Direction::Weft => (last, first),
        };

        let segments: Vec<LineString> = lines
            .iter()
            .filter(|line| line.length() > MIN_SEGMENT_LENGTH)
            .cloned()
            .collect();

        let mut graph = self.builder.build_fill_graph(self.outline, &segments, start, end);
        if graph.is_empty() {
            debug!("{} {}: empty fill graph, nothing to route", direction, color);
            return Vec::new();
        }
        self.builder.make_valid(&mut graph);
        let travel_graph = self.builder.build_travel_graph(&graph, self.outline, 0.0, false);
        let path = self.builder.find_path(&graph, &travel_graph, start, end);

        let source = match polygons {
            Some(polygons) => SegmentSource::Polygons(polygons),
            None => SegmentSource::Lines(&graph),
        };
        assemble(&path, &self.rings, &source, direction)
    }

    /// Route both directions and merge them per color.
    pub fn route(&self, warp: &Stripes, weft: &Stripes) -> ColorGroups {
        let warp = self.route_direction(warp, Direction::Warp);
        let weft = self.route_direction(weft, Direction::Weft);
        self.combine(warp, weft)
    }

    /// Merge routed warp and weft groups into one group per color.
    pub fn combine(&self, warp: ColorGroups, weft: ColorGroups) -> ColorGroups {
        match self.rings.first() {
            Some(seam_ring) => combine_groups(warp.into_iter().chain(weft), seam_ring),
            None => combine_groups(warp.into_iter().chain(weft), &NoRing),
        }
    }
}

/// Something seam travel can be drawn along.
pub trait SeamPath {
    fn travel(&self, from: Point, to: Point) -> Option<LineString>;
}

impl SeamPath for Ring {
    fn travel(&self, from: Point, to: Point) -> Option<LineString> {
        Ring::travel(self, from, to)
    }
}

/// Outline without a usable ring: seams stay unbridged.
struct NoRing;

impl SeamPath for NoRing {
    fn travel(&self, _from: Point, _to: Point) -> Option<LineString> {
        None
    }
}

/// Fold routed batches (warp colors, then weft colors) into merged groups.
///
/// ## Rust Lesson #18: fold
///
/// `fold` threads one accumulator through the whole iterator. The merged
/// groups are the only state, so the ordering rules below are all local to
/// a single step.
pub fn combine_groups<I, S>(batches: I, seam: &S) -> ColorGroups
where
    I: IntoIterator<Item = (String, ColorGroup)>,
    S: SeamPath + ?Sized,
{
    batches
        .into_iter()
        .fold(ColorGroups::new(), |mut merged, (color, batch)| {
            let group = merged.entry(color).or_default();
            append_fills(&mut group.fills, batch.fills, seam);
            append_strokes(group, batch.strokes, seam);
            merged
        })
}

/// Append fills, bridging each pair of annotated fills with seam travel.
fn append_fills<S: SeamPath + ?Sized>(fills: &mut Vec<RoutedShape>, batch: Vec<RoutedShape>, seam: &S) {
    for shape in batch {
        if let (Some(RoutedShape::Fill(prev)), RoutedShape::Fill(next)) = (fills.last(), &shape) {
            if let (Some(from), Some(to)) = (prev.end, next.start) {
                if let Some(line) = seam.travel(from, to) {
                    fills.push(RoutedShape::travel(line, next.direction));
                }
            }
        }
        fills.push(shape);
    }
}

/// Append strokes, bridging from the previous stroke (or the last fill)
/// to the first stroke of the batch.
fn append_strokes<S: SeamPath + ?Sized>(group: &mut ColorGroup, batch: Vec<RoutedShape>, seam: &S) {
    let Some(first) = batch.first() else {
        return;
    };

    let from = match group.strokes.last() {
        Some(prev) => prev.end_point(),
        None => match group.fills.last() {
            Some(RoutedShape::Fill(fill)) => fill.end,
            _ => None,
        },
    };

    if let (Some(from), Some(to)) = (from, first.start_point()) {
        if let Some(line) = seam.travel(from, to) {
            group.strokes.push(RoutedShape::travel(line, first.direction()));
        }
    }
    group.strokes.extend(batch);
}
