//! Reference stitch graph over the outline boundary.
//!
//! Nodes sit at segment endpoints and outline vertices. Segments become
//! `Segment` edges; consecutive nodes along each boundary ring are joined by
//! `Outline` edges carrying the ring arc between them. Endpoints that do not
//! lie on the outline get a straight `Travel` edge to their projection.
//!
//! ## Path search
//!
//! Greedy nearest-segment: from the current node, Dijkstra over the travel
//! graph finds the cheapest unvisited segment endpoint, the travel run is
//! emitted, then the segment itself. One iteration per segment, so the
//! search is bounded by the input size.

use std::collections::HashMap;

use log::{debug, trace};
use petgraph::algo::dijkstra;
use petgraph::graph::{EdgeIndex, NodeIndex, UnGraph};
use petgraph::unionfind::UnionFind;
use petgraph::visit::EdgeRef;

use super::{EdgeKind, FillGraph, PathEdge, StitchGraphBuilder};
use crate::geometry::{LineString, Point, Polygon};
use crate::ring::{boundary_rings, which_ring, Ring};

/// Edge payload.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphEdge {
    pub kind: EdgeKind,
    pub geometry: Option<LineString>,
    pub length: f64,
}

type Graph = UnGraph<Point, GraphEdge>;

/// Fill-stitch graph produced by [`BoundaryGraphBuilder`].
#[derive(Debug, Clone)]
pub struct BoundaryGraph {
    graph: Graph,
    /// Spatial hash: grid cell -> nodes in that cell
    grid: HashMap<(i64, i64), Vec<NodeIndex>>,
    tolerance: f64,
}

/// Travel graph: the fill graph's nodes with only non-stitching edges
/// (plus segments as `Repair` edges when underpathing is allowed).
#[derive(Debug, Clone)]
pub struct BoundaryTravelGraph {
    graph: Graph,
}

/// Configuration for the reference graph builder.
#[derive(Debug, Clone)]
pub struct BoundaryGraphBuilder {
    /// Maximum distance between points to treat them as the same node.
    /// Default: 0.001
    pub tolerance: f64,
}

impl Default for BoundaryGraphBuilder {
    fn default() -> Self {
        Self { tolerance: 0.001 }
    }
}

/// Convert a point to a grid cell coordinate.
#[inline]
fn point_to_cell(p: Point, grid_size: f64) -> (i64, i64) {
    ((p.x / grid_size).floor() as i64, (p.y / grid_size).floor() as i64)
}

impl BoundaryGraph {
    fn new(tolerance: f64) -> Self {
        Self {
            graph: Graph::new_undirected(),
            grid: HashMap::new(),
            tolerance: tolerance.max(1e-9),
        }
    }

    /// Node within tolerance of `p`, if any.
    fn find_node(&self, p: Point) -> Option<NodeIndex> {
        let cell = point_to_cell(p, self.tolerance);
        // Check this cell and all 8 neighbors
        for dx in -1..=1 {
            for dy in -1..=1 {
                if let Some(nodes) = self.grid.get(&(cell.0 + dx, cell.1 + dy)) {
                    if let Some(&n) = nodes.iter().find(|&&n| self.graph[n].distance(p) <= self.tolerance) {
                        return Some(n);
                    }
                }
            }
        }
        None
    }

    /// Existing node near `p`, or a new one.
    fn node_for(&mut self, p: Point) -> NodeIndex {
        if let Some(n) = self.find_node(p) {
            return n;
        }
        let n = self.graph.add_node(p);
        self.grid.entry(point_to_cell(p, self.tolerance)).or_default().push(n);
        n
    }

    /// Node near `p`, falling back to the closest node overall.
    fn nearest_node(&self, p: Point) -> Option<NodeIndex> {
        self.find_node(p).or_else(|| {
            self.graph
                .node_indices()
                .min_by(|&a, &b| self.graph[a].distance(p).total_cmp(&self.graph[b].distance(p)))
        })
    }

    fn add_edge(&mut self, a: NodeIndex, b: NodeIndex, kind: EdgeKind, geometry: LineString) -> EdgeIndex {
        let length = geometry.length();
        self.graph.add_edge(a, b, GraphEdge { kind, geometry: Some(geometry), length })
    }

    /// Number of `Segment` edges.
    pub fn segment_count(&self) -> usize {
        self.graph.edge_weights().filter(|e| e.kind == EdgeKind::Segment).count()
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Segment edges in insertion order.
    fn segment_edges(&self) -> Vec<EdgeIndex> {
        self.graph
            .edge_indices()
            .filter(|&e| self.graph[e].kind == EdgeKind::Segment)
            .collect()
    }

    /// Snap `node` onto its nearest ring; returns the ring and the ring node.
    fn anchor(&mut self, node: NodeIndex, rings: &[Ring]) -> Option<(usize, f64, NodeIndex)> {
        let p = self.graph[node];
        let ring_idx = which_ring(rings, p)?;
        let ring = &rings[ring_idx];
        let pos = ring.project(p);
        let on_ring = ring.point_at(pos);
        if on_ring.distance(p) <= self.tolerance {
            return Some((ring_idx, pos, node));
        }
        let anchor = self.node_for(on_ring);
        self.add_edge(node, anchor, EdgeKind::Travel, LineString::segment(p, on_ring));
        Some((ring_idx, pos, anchor))
    }

    /// Join consecutive nodes along each ring with outline edges.
    fn link_rings(&mut self, rings: &[Ring], mut stops: Vec<Vec<(f64, NodeIndex)>>) {
        for (ring, stops) in rings.iter().zip(stops.iter_mut()) {
            stops.sort_by(|a, b| a.0.total_cmp(&b.0));
            stops.dedup_by(|a, b| a.1 == b.1);
            if stops.len() < 2 {
                continue;
            }

            for pair in stops.windows(2) {
                let (from, a) = pair[0];
                let (to, b) = pair[1];
                if a != b {
                    self.add_edge(a, b, EdgeKind::Outline, ring.substring(from, to));
                }
            }

            // Close the loop through the ring seam
            if let (Some(&(last_pos, last)), Some(&(first_pos, first))) = (stops.last(), stops.first()) {
                if last != first {
                    self.add_edge(last, first, EdgeKind::Outline, ring.complement(last_pos, first_pos));
                }
            }
        }
    }
}

impl FillGraph for BoundaryGraph {
    fn is_empty(&self) -> bool {
        self.segment_count() == 0
    }

    fn segment_geometry(&self, start: Point, end: Point) -> Option<LineString> {
        let a = self.find_node(start)?;
        let b = self.find_node(end)?;
        self.graph
            .edges(a)
            .filter(|e| e.target() == b && e.weight().kind == EdgeKind::Segment)
            .find_map(|e| e.weight().geometry.clone())
    }
}

impl StitchGraphBuilder for BoundaryGraphBuilder {
    type Graph = BoundaryGraph;
    type TravelGraph = BoundaryTravelGraph;

    fn build_fill_graph(
        &self,
        outline: &Polygon,
        segments: &[LineString],
        start: Point,
        end: Point,
    ) -> BoundaryGraph {
        let mut graph = BoundaryGraph::new(self.tolerance);

        for segment in segments {
            let (Some(a), Some(b)) = (segment.first(), segment.last()) else {
                continue;
            };
            if segment.is_degenerate() {
                continue;
            }
            let na = graph.node_for(a);
            let nb = graph.node_for(b);
            if na != nb {
                graph.add_edge(na, nb, EdgeKind::Segment, segment.clone());
            }
        }

        if graph.is_empty() {
            return graph;
        }

        graph.node_for(start);
        graph.node_for(end);

        let rings = boundary_rings(outline);
        let mut stops: Vec<Vec<(f64, NodeIndex)>> = vec![Vec::new(); rings.len()];

        let endpoints: Vec<NodeIndex> = graph.graph.node_indices().collect();
        for node in endpoints {
            if let Some((ring_idx, pos, anchor)) = graph.anchor(node, &rings) {
                stops[ring_idx].push((pos, anchor));
            }
        }
        for (ring_idx, ring) in rings.iter().enumerate() {
            for (pos, vertex) in ring.vertices() {
                let node = graph.node_for(vertex);
                stops[ring_idx].push((pos, node));
            }
        }
        graph.link_rings(&rings, stops);

        trace!(
            "fill graph: {} nodes, {} edges, {} segments",
            graph.node_count(),
            graph.edge_count(),
            graph.segment_count()
        );
        graph
    }

    fn make_valid(&self, graph: &mut BoundaryGraph) {
        // Connect components until everything is reachable.
        // Each pass removes one component, so this terminates.
        loop {
            let mut components = UnionFind::<usize>::new(graph.graph.node_count());
            for edge in graph.graph.edge_references() {
                components.union(edge.source().index(), edge.target().index());
            }

            let nodes: Vec<NodeIndex> = graph.graph.node_indices().collect();
            let Some(&root_node) = nodes.first() else {
                return;
            };
            let root = components.find(root_node.index());
            let (inside, outside): (Vec<NodeIndex>, Vec<NodeIndex>) =
                nodes.iter().copied().partition(|n| components.find(n.index()) == root);
            if outside.is_empty() {
                return;
            }

            let mut best: Option<(f64, NodeIndex, NodeIndex)> = None;
            for &a in &inside {
                for &b in &outside {
                    let d = graph.graph[a].distance(graph.graph[b]);
                    if best.is_none_or(|(best_d, _, _)| d < best_d) {
                        best = Some((d, a, b));
                    }
                }
            }
            let Some((_, a, b)) = best else {
                return;
            };
            debug!("connecting disjoint graph components with a travel edge");
            let line = LineString::segment(graph.graph[a], graph.graph[b]);
            graph.add_edge(a, b, EdgeKind::Travel, line);
        }
    }

    fn build_travel_graph(
        &self,
        fill_graph: &BoundaryGraph,
        _outline: &Polygon,
        _margin: f64,
        underpath: bool,
    ) -> BoundaryTravelGraph {
        // Travel already runs on the outline rings, so no margin is applied.
        let graph = fill_graph.graph.filter_map(
            |_, p| Some(*p),
            |_, edge| match edge.kind {
                EdgeKind::Segment | EdgeKind::Repair if !underpath => None,
                EdgeKind::Segment => Some(GraphEdge { kind: EdgeKind::Repair, ..edge.clone() }),
                _ => Some(edge.clone()),
            },
        );
        BoundaryTravelGraph { graph }
    }

    fn find_path(
        &self,
        fill_graph: &BoundaryGraph,
        travel_graph: &BoundaryTravelGraph,
        start: Point,
        end: Point,
    ) -> Vec<PathEdge> {
        let mut path = Vec::new();
        let Some(mut current) = fill_graph.nearest_node(start) else {
            return path;
        };

        let mut pending = fill_graph.segment_edges();
        while !pending.is_empty() {
            let costs = dijkstra(&travel_graph.graph, current, None, |e| e.weight().length);

            // (cost, pending index, entry node, exit node)
            let mut best: Option<(f64, usize, NodeIndex, NodeIndex)> = None;
            let mut nearest: Option<(f64, usize, NodeIndex, NodeIndex)> = None;
            let here = fill_graph.graph[current];

            for (i, &edge) in pending.iter().enumerate() {
                let Some((a, b)) = fill_graph.graph.edge_endpoints(edge) else {
                    continue;
                };
                for (entry, exit) in [(a, b), (b, a)] {
                    if let Some(&cost) = costs.get(&entry) {
                        if best.is_none_or(|(c, ..)| cost < c) {
                            best = Some((cost, i, entry, exit));
                        }
                    }
                    let d = here.distance(fill_graph.graph[entry]);
                    if nearest.is_none_or(|(c, ..)| d < c) {
                        nearest = Some((d, i, entry, exit));
                    }
                }
            }

            let (i, entry, exit) = match (best, nearest) {
                (Some((_, i, entry, exit)), _) => {
                    path.extend(travel_edges(&travel_graph.graph, &costs, current, entry));
                    (i, entry, exit)
                }
                // Nothing reachable: jump to the closest segment
                (None, Some((_, i, entry, exit))) => {
                    debug!("no travel path to remaining segments, jumping");
                    (i, entry, exit)
                }
                (None, None) => break,
            };

            path.push(PathEdge::new(
                fill_graph.graph[entry],
                fill_graph.graph[exit],
                EdgeKind::Segment,
            ));
            pending.remove(i);
            current = exit;
        }

        if let Some(end_node) = fill_graph.nearest_node(end) {
            if end_node != current {
                let costs = dijkstra(&travel_graph.graph, current, Some(end_node), |e| e.weight().length);
                path.extend(travel_edges(&travel_graph.graph, &costs, current, end_node));
            }
        }

        path
    }
}

/// Reconstruct the cheapest edge run from `source` to `target` out of
/// Dijkstra costs. Empty when `target` is unreachable.
fn travel_edges(
    graph: &Graph,
    costs: &HashMap<NodeIndex, f64>,
    source: NodeIndex,
    target: NodeIndex,
) -> Vec<PathEdge> {
    if !costs.contains_key(&target) {
        return Vec::new();
    }

    // Greedy walk back: step to the neighbor with
    // cost[neighbor] + edge_weight == cost[current].
    let mut steps = Vec::new();
    let mut visited = vec![target];
    let mut current = target;
    while current != source {
        let current_cost = costs.get(&current).copied().unwrap_or(f64::INFINITY);
        let tolerance = 1e-9 * current_cost.max(1.0);
        let step = graph.edges(current).find(|edge| {
            let neighbor = edge.target();
            let neighbor_cost = costs.get(&neighbor).copied().unwrap_or(f64::INFINITY);
            !visited.contains(&neighbor)
                && (neighbor_cost + edge.weight().length - current_cost).abs() <= tolerance
        });
        let Some(edge) = step else {
            debug!("travel reconstruction stalled, dropping travel run");
            return Vec::new();
        };
        let neighbor = edge.target();
        steps.push(PathEdge::new(graph[neighbor], graph[current], edge.weight().kind));
        visited.push(neighbor);
        current = neighbor;
    }

    steps.reverse();
    steps
}
