//! Path assembly: turn a routed edge list into ordered shapes.
//!
//! Segment edges become the stripe they were seeded from (a polygon for
//! fills, the stroke line for strokes). Runs of non-segment edges between
//! two segments become a single travel line along the outline boundary.

use log::{debug, warn};

use crate::geometry::{LineString, Point, Polygon};
use crate::graph::{EdgeKind, FillGraph, PathEdge};
use crate::ring::{which_ring, Ring};
use crate::shapes::{Direction, RoutedShape};

/// A routing-line endpoint must lie within this distance of its polygon.
pub const POLYGON_MATCH_TOLERANCE: f64 = 0.01;

/// What a segment edge resolves to.
pub enum SegmentSource<'a, G: FillGraph> {
    /// Filled stripes: look the polygon up by the edge's start point.
    Polygons(&'a [Polygon]),
    /// Stroked stripes: take the line geometry stored in the fill graph.
    Lines(&'a G),
}

/// A travel run in progress, as arc positions on one ring.
#[derive(Debug, Clone, Copy)]
struct TravelRun {
    ring: usize,
    from: f64,
    to: f64,
}

impl TravelRun {
    fn begin(rings: &[Ring], edge: &PathEdge) -> Option<Self> {
        let ring = which_ring(rings, edge.start)?;
        Some(Self {
            ring,
            from: rings[ring].project(edge.start),
            to: rings[ring].project(edge.end),
        })
    }

    fn extend(&mut self, rings: &[Ring], edge: &PathEdge) {
        self.to = rings[self.ring].project(edge.end);
    }

    /// Final travel line, with the shortest-arc correction applied.
    /// `None` when the run collapsed to a point.
    fn finish(self, rings: &[Ring]) -> Option<LineString> {
        let line = rings[self.ring].shortest_arc(self.from, self.to);
        (!line.is_degenerate()).then_some(line)
    }
}

/// Walk `path` and build the routed shapes of one color and direction.
///
/// Travel edges before the first routed shape and after the last one are
/// dropped: they lead to or from the graph's start/end points, not between
/// stripes.
pub fn assemble<G: FillGraph>(
    path: &[PathEdge],
    rings: &[Ring],
    source: &SegmentSource<'_, G>,
    direction: Direction,
) -> Vec<RoutedShape> {
    let mut shapes = Vec::new();
    let mut travel: Option<TravelRun> = None;

    for edge in path {
        if edge.is_segment() {
            // Repair copies duplicate a segment that is routed already
            if edge.kind != EdgeKind::Segment {
                continue;
            }
            if let Some(line) = travel.take().and_then(|run| run.finish(rings)) {
                shapes.push(RoutedShape::travel(line, direction));
            }
            if let Some(shape) = resolve_segment(edge, source, direction) {
                shapes.push(shape);
            }
        } else if !shapes.is_empty() {
            match travel.as_mut() {
                Some(run) => run.extend(rings, edge),
                None => travel = TravelRun::begin(rings, edge),
            }
        }
    }

    shapes
}

fn resolve_segment<G: FillGraph>(
    edge: &PathEdge,
    source: &SegmentSource<'_, G>,
    direction: Direction,
) -> Option<RoutedShape> {
    match source {
        SegmentSource::Polygons(polygons) => {
            let polygon = find_polygon(polygons, edge.start)?;
            Some(RoutedShape::fill(polygon.clone(), edge.start, edge.end, direction))
        }
        SegmentSource::Lines(graph) => {
            let line = oriented_segment(*graph, edge);
            if line.is_degenerate() {
                debug!("dropping zero-length stroke at ({:.3}, {:.3})", edge.start.x, edge.start.y);
                return None;
            }
            Some(RoutedShape::stroke(line, direction))
        }
    }
}

/// Stroke geometry for a segment edge, facing the traversal direction.
fn oriented_segment<G: FillGraph>(graph: &G, edge: &PathEdge) -> LineString {
    let line = graph
        .segment_geometry(edge.start, edge.end)
        .unwrap_or_else(|| LineString::segment(edge.start, edge.end));

    match (line.first(), line.last()) {
        (Some(first), Some(last)) if edge.start.distance(last) < edge.start.distance(first) => {
            line.reversed()
        }
        _ => line,
    }
}

/// The single polygon within [`POLYGON_MATCH_TOLERANCE`] of `point`.
///
/// No match, or more than one, yields `None`: the segment is dropped
/// rather than attributed to a guessed stripe.
pub fn find_polygon(polygons: &[Polygon], point: Point) -> Option<&Polygon> {
    let mut candidates = polygons
        .iter()
        .filter(|polygon| polygon.distance_to_point(point) <= POLYGON_MATCH_TOLERANCE);

    let found = candidates.next();
    if found.is_none() {
        warn!("no stripe polygon at ({:.3}, {:.3}), dropping segment", point.x, point.y);
        return None;
    }
    if candidates.next().is_some() {
        warn!("several stripe polygons at ({:.3}, {:.3}), dropping segment", point.x, point.y);
        return None;
    }
    found
}
