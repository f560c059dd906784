//! Fill-stitch graph contract.
//!
//! The router does not search graphs itself. It hands routing segments to a
//! [`StitchGraphBuilder`] and consumes the ordered [`PathEdge`] list it
//! returns. [`boundary::BoundaryGraphBuilder`] is a small reference builder
//! over the outline boundary; any other implementation satisfying the same
//! four operations can be swapped in.

pub mod boundary;

pub use boundary::{BoundaryGraph, BoundaryGraphBuilder, BoundaryTravelGraph};

use crate::geometry::{LineString, Point, Polygon};

/// Kind tag of a path edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeKind {
    /// A stitchable segment (one routing line or stroke).
    Segment,
    /// A copy of a segment inserted while repairing graph topology.
    /// Segment-like, but its geometry is already covered by a `Segment`.
    Repair,
    /// A run along the outline boundary.
    Outline,
    /// Any other non-stitching connection.
    Travel,
}

impl EdgeKind {
    /// True for edges that lay stitches over a segment.
    #[inline]
    pub fn is_segment(self) -> bool {
        matches!(self, EdgeKind::Segment | EdgeKind::Repair)
    }
}

/// One step of a routing solution, oriented in traversal direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathEdge {
    pub start: Point,
    pub end: Point,
    pub kind: EdgeKind,
}

impl PathEdge {
    pub fn new(start: Point, end: Point, kind: EdgeKind) -> Self {
        Self { start, end, kind }
    }

    #[inline]
    pub fn is_segment(&self) -> bool {
        self.kind.is_segment()
    }
}

/// What the router needs to read back from a fill-stitch graph.
pub trait FillGraph {
    /// True when the graph holds no usable segment.
    fn is_empty(&self) -> bool;

    /// Stored geometry of the segment edge between two nodes, in the
    /// orientation it was inserted with. `None` if no such segment edge
    /// exists or it carries no geometry.
    fn segment_geometry(&self, start: Point, end: Point) -> Option<LineString>;
}

/// Builds fill-stitch and travel graphs and finds the stitch path.
///
/// ## Rust Lesson #17: Traits with Associated Types
///
/// An associated type lets each implementation pick its own graph
/// representation while the router stays generic over it.
pub trait StitchGraphBuilder {
    type Graph: FillGraph;
    type TravelGraph;

    /// Graph over the candidate segments and the outline. An empty graph
    /// (no usable segments) is a valid result, not an error.
    fn build_fill_graph(
        &self,
        outline: &Polygon,
        segments: &[LineString],
        start: Point,
        end: Point,
    ) -> Self::Graph;

    /// Repair topology so that every segment is reachable.
    fn make_valid(&self, graph: &mut Self::Graph);

    /// Graph of non-stitching moves available between segments.
    fn build_travel_graph(
        &self,
        fill_graph: &Self::Graph,
        outline: &Polygon,
        margin: f64,
        underpath: bool,
    ) -> Self::TravelGraph;

    /// Ordered edge list from `start` to `end` covering the segments.
    ///
    /// Must terminate for any finite input.
    fn find_path(
        &self,
        fill_graph: &Self::Graph,
        travel_graph: &Self::TravelGraph,
        start: Point,
        end: Point,
    ) -> Vec<PathEdge>;
}
