//! Outline boundary rings parametrized by arc length.
//!
//! Travel moves between stripes are drawn along the outline, never across
//! it. A [`Ring`] turns a closed boundary into a 1D coordinate system:
//! any point can be projected to an arc-length position, and any two
//! positions span a sub-arc.

use crate::geometry::{project_onto_segment, LineString, Point, Polygon, COORD_EPSILON};

/// A closed boundary ring with precomputed arc-length positions.
#[derive(Debug, Clone, PartialEq)]
pub struct Ring {
    /// Closed vertex list: the first vertex is repeated at the end.
    points: Vec<Point>,
    /// `cumulative[i]` = arc length from vertex 0 to vertex i.
    cumulative: Vec<f64>,
}

impl Ring {
    /// Build a ring from open vertices. Needs at least 3 vertices.
    pub fn from_open(vertices: &[Point]) -> Option<Ring> {
        if vertices.len() < 3 {
            return None;
        }

        let mut points = vertices.to_vec();
        if let Some(&first) = vertices.first() {
            points.push(first);
        }

        let mut cumulative = Vec::with_capacity(points.len());
        let mut total = 0.0;
        cumulative.push(0.0);
        for w in points.windows(2) {
            total += w[0].distance(w[1]);
            cumulative.push(total);
        }

        if total <= COORD_EPSILON {
            return None;
        }
        Some(Ring { points, cumulative })
    }

    /// Total ring length.
    #[inline]
    pub fn length(&self) -> f64 {
        self.cumulative.last().copied().unwrap_or(0.0)
    }

    /// Ring vertices (without the closing repeat) with their positions.
    pub fn vertices(&self) -> impl Iterator<Item = (f64, Point)> + '_ {
        let n = self.points.len() - 1;
        self.cumulative[..n].iter().copied().zip(self.points[..n].iter().copied())
    }

    /// Arc-length position of the ring point closest to `p`.
    pub fn project(&self, p: Point) -> f64 {
        let mut best_dist = f64::INFINITY;
        let mut best_pos = 0.0;
        for (i, w) in self.points.windows(2).enumerate() {
            let t = project_onto_segment(p, w[0], w[1]);
            let dist = p.distance(w[0].lerp(w[1], t));
            if dist < best_dist {
                best_dist = dist;
                best_pos = self.cumulative[i] + t * (self.cumulative[i + 1] - self.cumulative[i]);
            }
        }
        best_pos
    }

    /// Distance from `p` to the ring.
    pub fn distance(&self, p: Point) -> f64 {
        self.point_at(self.project(p)).distance(p)
    }

    /// Point at arc-length position `pos` (clamped to the ring).
    pub fn point_at(&self, pos: f64) -> Point {
        let pos = pos.clamp(0.0, self.length());
        let i = self.segment_index(pos);
        let seg_len = self.cumulative[i + 1] - self.cumulative[i];
        if seg_len <= COORD_EPSILON {
            return self.points[i];
        }
        self.points[i].lerp(self.points[i + 1], (pos - self.cumulative[i]) / seg_len)
    }

    /// Index of the segment containing `pos`.
    fn segment_index(&self, pos: f64) -> usize {
        let last = self.points.len() - 2;
        // partition_point returns the first vertex strictly beyond pos
        self.cumulative.partition_point(|&c| c <= pos).saturating_sub(1).min(last)
    }

    /// The arc between two positions without crossing the ring's seam.
    ///
    /// Runs forward when `from < to`, backward otherwise, so the result
    /// always starts at `from` and ends at `to`.
    pub fn substring(&self, from: f64, to: f64) -> LineString {
        let from = from.clamp(0.0, self.length());
        let to = to.clamp(0.0, self.length());

        if from > to {
            return self.substring(to, from).reversed();
        }

        let mut points = vec![self.point_at(from)];
        points.extend(
            self.points
                .iter()
                .zip(&self.cumulative)
                .filter(|&(_, &c)| c > from && c < to)
                .map(|(p, _)| *p),
        );
        points.push(self.point_at(to));
        LineString::new(points).dedup()
    }

    /// The arc between two positions that crosses the ring's seam: the
    /// complement of [`Ring::substring`]. Starts at `from`, ends at `to`.
    pub fn complement(&self, from: f64, to: f64) -> LineString {
        let from = from.clamp(0.0, self.length());
        let to = to.clamp(0.0, self.length());
        let n = self.points.len() - 1; // vertex n is vertex 0 again

        let mut points = vec![self.point_at(from)];
        if from <= to {
            // Backward from `from` down to the seam, then backward from the end to `to`
            points.extend((0..n).rev().filter(|&i| self.cumulative[i] < from).map(|i| self.points[i]));
            points.extend((1..n).rev().filter(|&i| self.cumulative[i] > to).map(|i| self.points[i]));
        } else {
            // Forward from `from` up to the seam, then forward from the start to `to`
            points.extend((1..=n).filter(|&i| self.cumulative[i] > from).map(|i| self.points[i]));
            points.extend((1..n).filter(|&i| self.cumulative[i] < to).map(|i| self.points[i]));
        }
        points.push(self.point_at(to));
        LineString::new(points).dedup()
    }

    /// Shortest-arc correction for a travel drawn from `from` to `to`.
    ///
    /// When the direct arc is longer than half the ring, the complementary
    /// arc is used instead. The threshold is half of the whole ring.
    pub fn shortest_arc(&self, from: f64, to: f64) -> LineString {
        let travel = self.substring(from, to);
        if self.length() / 2.0 < travel.length() {
            let short = self.complement(from, to);
            if !short.is_degenerate() {
                return short;
            }
        }
        travel
    }

    /// Travel along the ring between the projections of two points.
    ///
    /// `None` when both points project to the same ring position.
    pub fn travel(&self, from: Point, to: Point) -> Option<LineString> {
        let line = self.shortest_arc(self.project(from), self.project(to));
        (!line.is_degenerate()).then_some(line)
    }
}

/// Boundary rings of an outline: the exterior first, then each hole.
pub fn boundary_rings(outline: &Polygon) -> Vec<Ring> {
    outline.rings().filter_map(Ring::from_open).collect()
}

/// Index of the ring closest to `p`.
pub fn which_ring(rings: &[Ring], p: Point) -> Option<usize> {
    rings
        .iter()
        .enumerate()
        .map(|(i, ring)| (i, ring.distance(p)))
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_ring() -> Ring {
        Ring::from_open(&Polygon::rect(0.0, 0.0, 100.0, 100.0).outer).unwrap()
    }

    #[test]
    fn length_and_projection() {
        let ring = square_ring();
        assert_eq!(ring.length(), 400.0);
        assert_eq!(ring.project(Point::new(50.0, -3.0)), 50.0);
        assert_eq!(ring.project(Point::new(103.0, 50.0)), 150.0);
        assert_eq!(ring.project(Point::new(-1.0, 50.0)), 350.0);
    }

    #[test]
    fn point_at_positions() {
        let ring = square_ring();
        assert_eq!(ring.point_at(0.0), Point::new(0.0, 0.0));
        assert_eq!(ring.point_at(150.0), Point::new(100.0, 50.0));
        assert_eq!(ring.point_at(400.0), Point::new(0.0, 0.0));
    }

    #[test]
    fn substring_forward_and_backward() {
        let ring = square_ring();
        let forward = ring.substring(50.0, 150.0);
        assert_eq!(forward.points, vec![
            Point::new(50.0, 0.0),
            Point::new(100.0, 0.0),
            Point::new(100.0, 50.0),
        ]);

        let backward = ring.substring(150.0, 50.0);
        assert_eq!(backward.first(), Some(Point::new(100.0, 50.0)));
        assert_eq!(backward.last(), Some(Point::new(50.0, 0.0)));
        assert_eq!(backward.length(), 100.0);
    }

    #[test]
    fn complement_crosses_seam() {
        let ring = square_ring();
        // from 50 (bottom edge) to 350 (left edge) the short way is through the seam
        let short = ring.complement(50.0, 350.0);
        assert_eq!(short.first(), Some(Point::new(50.0, 0.0)));
        assert_eq!(short.last(), Some(Point::new(0.0, 50.0)));
        assert!((short.length() - 100.0).abs() < 1e-9, "got {}", short.length());
        assert!(short.points.contains(&Point::new(0.0, 0.0)));

        let reverse = ring.complement(350.0, 50.0);
        assert_eq!(reverse.first(), Some(Point::new(0.0, 50.0)));
        assert_eq!(reverse.last(), Some(Point::new(50.0, 0.0)));
        assert!((reverse.length() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn shortest_arc_prefers_short_side() {
        let ring = square_ring();
        let travel = ring.shortest_arc(50.0, 350.0);
        assert!(travel.length() <= ring.length() / 2.0);
        assert_eq!(travel.first(), Some(Point::new(50.0, 0.0)));
        assert_eq!(travel.last(), Some(Point::new(0.0, 50.0)));
    }

    #[test]
    fn opposite_corners_use_half_ring() {
        let ring = square_ring();
        let travel = ring.travel(Point::new(100.0, 0.0), Point::new(0.0, 100.0)).unwrap();
        assert!((travel.length() - 200.0).abs() < 1e-9);
    }

    #[test]
    fn travel_between_same_point_is_none() {
        let ring = square_ring();
        assert!(ring.travel(Point::new(20.0, 0.0), Point::new(20.0, -5.0)).is_none());
    }

    #[test]
    fn rings_and_nearest_ring() {
        let outline = Polygon::with_holes(
            Polygon::rect(0.0, 0.0, 100.0, 100.0).outer,
            vec![Polygon::rect(40.0, 40.0, 60.0, 60.0).outer],
        );
        let rings = boundary_rings(&outline);
        assert_eq!(rings.len(), 2);
        assert_eq!(which_ring(&rings, Point::new(1.0, 50.0)), Some(0));
        assert_eq!(which_ring(&rings, Point::new(45.0, 39.0)), Some(1));
    }
}
