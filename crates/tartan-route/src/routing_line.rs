//! Routing lines: one representative line per filled stripe.
//!
//! The graph builder routes over line segments, not polygons. Each stripe
//! polygon is summarized by the diagonal of its minimum rotated rectangle,
//! clipped to the polygon, which follows the stripe's long axis.

use log::trace;

use crate::bounds::minimum_rotated_rectangle;
use crate::clip::{clip_line_to_polygon, line_polygon_intersections};
use crate::geometry::{Line, LineString, Point, Polygon};
use crate::shapes::{StripeSet, Stripes};

/// Routing input for one color: a routing line per polygon (same order as
/// the polygons) and the stroked stripe lines as they are.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoutingLines {
    pub polygons: Vec<LineString>,
    pub lines: Vec<LineString>,
}

/// Per-color routing lines, in the same color order as the stripes.
pub type ColorRoutingLines = indexmap::IndexMap<String, RoutingLines>;

/// Compute the routing line of a stripe polygon.
///
/// Never fails: when the diagonal only touches the polygon the result is a
/// zero-length line at the touching point, and downstream stages drop it.
pub fn routing_line(polygon: &Polygon) -> LineString {
    let Some(rect) = minimum_rotated_rectangle(&polygon.outer) else {
        return LineString::default();
    };

    let diagonal = Line::between(rect[0], rect[2]);
    let pieces = clip_line_to_polygon(diagonal, polygon);

    if let (Some(first), Some(last)) = (pieces.first(), pieces.last()) {
        return LineString::segment(first.start(), last.end());
    }

    // Thin or degenerate polygon: keep at least a point
    let touch = line_polygon_intersections(diagonal, polygon)
        .first()
        .map_or(rect[0], |&(x, y, _)| Point::new(x, y));
    trace!("routing line degenerated to a point at ({:.3}, {:.3})", touch.x, touch.y);
    LineString::segment(touch, touch)
}

/// Routing lines for every polygon of one color.
pub fn routing_lines_for(stripes: &StripeSet) -> RoutingLines {
    RoutingLines {
        polygons: stripes.polygons.iter().map(routing_line).collect(),
        lines: stripes.lines.clone(),
    }
}

/// Routing lines for every color of one direction.
pub fn extract_routing_lines(stripes: &Stripes) -> ColorRoutingLines {
    stripes
        .iter()
        .map(|(color, set)| (color.clone(), routing_lines_for(set)))
        .collect()
}
