//! Core geometry types for tartan routing.
//!
//! ## Rust Lesson #3: Structs & Derives
//!
//! The `#[derive(...)]` macro auto-generates common functionality:
//! - `Debug` = print with `{:?}`
//! - `Clone` / `Copy` = duplicate the value (Copy only for small stack values)
//! - `PartialEq` = compare with `==`
//! - `Serialize` / `Deserialize` = serde can turn it into JSON/YAML and back

use serde::{Deserialize, Serialize};

/// Points closer than this are treated as the same coordinate.
pub const COORD_EPSILON: f64 = 1e-9;

/// A 2D point with x,y coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// A line segment defined by two endpoints.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

/// An open polyline.
///
/// Used for routing lines, stroked stripes and travel moves.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LineString {
    pub points: Vec<Point>,
}

/// A polygon with an outer boundary and optional holes.
///
/// Rings are stored open: the closing vertex is implied, never repeated.
///
/// ## Rust Lesson #4: Ownership & Vec
///
/// This struct OWNS its points - when it's dropped, they're freed.
/// `&[Point]` would be a BORROWED slice (read-only view).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    /// Outer boundary vertices
    pub outer: Vec<Point>,
    /// Interior holes
    #[serde(default)]
    pub holes: Vec<Vec<Point>>,
}

// ============================================================================
// IMPLEMENTATIONS (methods)
// ============================================================================

impl Point {
    /// Create a new point.
    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Distance to another point.
    ///
    /// Point is `Copy`, so `other` is implicitly copied, not moved.
    #[inline]
    pub fn distance(&self, other: Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// True if both coordinates match within [`COORD_EPSILON`].
    #[inline]
    pub fn approx_eq(&self, other: Point) -> bool {
        (self.x - other.x).abs() <= COORD_EPSILON && (self.y - other.y).abs() <= COORD_EPSILON
    }

    /// Linear interpolation towards `other` (t = 0 is self, t = 1 is other).
    #[inline]
    pub fn lerp(&self, other: Point, t: f64) -> Point {
        Point::new(self.x + (other.x - self.x) * t, self.y + (other.y - self.y) * t)
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Point::new(x, y)
    }
}

impl Line {
    #[inline]
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Build a line from two points.
    #[inline]
    pub fn between(a: Point, b: Point) -> Self {
        Self::new(a.x, a.y, b.x, b.y)
    }

    #[inline]
    pub fn start(&self) -> Point {
        Point::new(self.x1, self.y1)
    }

    #[inline]
    pub fn end(&self) -> Point {
        Point::new(self.x2, self.y2)
    }

    #[inline]
    pub fn midpoint(&self) -> Point {
        Point::new((self.x1 + self.x2) / 2.0, (self.y1 + self.y2) / 2.0)
    }

    #[inline]
    pub fn length(&self) -> f64 {
        self.start().distance(self.end())
    }
}

impl LineString {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    /// Two-point line string.
    pub fn segment(a: Point, b: Point) -> Self {
        Self { points: vec![a, b] }
    }

    pub fn first(&self) -> Option<Point> {
        self.points.first().copied()
    }

    pub fn last(&self) -> Option<Point> {
        self.points.last().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Total length along all segments.
    pub fn length(&self) -> f64 {
        self.points.windows(2).map(|w| w[0].distance(w[1])).sum()
    }

    /// Same points in the opposite order.
    pub fn reversed(&self) -> Self {
        let mut points = self.points.clone();
        points.reverse();
        Self { points }
    }

    /// A line string is degenerate when it does not resolve to an actual
    /// line: fewer than two points, or all points coincide.
    pub fn is_degenerate(&self) -> bool {
        match self.points.first() {
            None => true,
            Some(first) => self.points.iter().all(|p| p.approx_eq(*first)),
        }
    }

    /// Drop consecutive duplicate points.
    pub fn dedup(mut self) -> Self {
        self.points.dedup_by(|a, b| a.approx_eq(*b));
        self
    }

    /// Get the bounding box as (min_x, min_y, max_x, max_y).
    pub fn bounding_box(&self) -> Option<(f64, f64, f64, f64)> {
        bounding_box_of_points(&self.points)
    }
}

impl Polygon {
    /// Create a simple polygon with no holes.
    pub fn new(outer: Vec<Point>) -> Self {
        Self { outer: open_ring(outer), holes: Vec::new() }
    }

    /// Create a polygon with holes.
    pub fn with_holes(outer: Vec<Point>, holes: Vec<Vec<Point>>) -> Self {
        Self {
            outer: open_ring(outer),
            holes: holes.into_iter().map(open_ring).collect(),
        }
    }

    /// Axis aligned rectangle.
    pub fn rect(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self::new(vec![
            Point::new(min_x, min_y),
            Point::new(max_x, min_y),
            Point::new(max_x, max_y),
            Point::new(min_x, max_y),
        ])
    }

    /// Get the bounding box as (min_x, min_y, max_x, max_y).
    ///
    /// ## Rust Lesson #6: Option<T>
    ///
    /// Rust has no `null`. `None` here means "no vertices, no box" and the
    /// compiler makes every caller deal with it.
    pub fn bounding_box(&self) -> Option<(f64, f64, f64, f64)> {
        bounding_box_of_points(&self.outer)
    }

    /// Center of the bounding box.
    #[inline]
    pub fn center(&self) -> Option<Point> {
        self.bounding_box().map(|(min_x, min_y, max_x, max_y)| {
            Point::new((min_x + max_x) / 2.0, (min_y + max_y) / 2.0)
        })
    }

    /// Outer ring followed by the holes, in that order.
    pub fn rings(&self) -> impl Iterator<Item = &[Point]> {
        std::iter::once(self.outer.as_slice()).chain(self.holes.iter().map(Vec::as_slice))
    }

    /// Enclosed area: outer minus holes.
    pub fn area(&self) -> f64 {
        let holes: f64 = self.holes.iter().map(|h| signed_area_of_points(h).abs()).sum();
        (signed_area_of_points(&self.outer).abs() - holes).max(0.0)
    }

    /// Calculate signed area of the outer ring using the shoelace formula.
    #[inline]
    pub fn signed_area(&self) -> f64 {
        signed_area_of_points(&self.outer)
    }

    /// Check if a point is inside the polygon body (inside outer, not in any hole).
    #[inline]
    pub fn point_in_body<F>(&self, x: f64, y: f64, point_in_polygon_fn: F) -> bool
    where
        F: Fn(f64, f64, &[Point]) -> bool,
    {
        if !point_in_polygon_fn(x, y, &self.outer) {
            return false;
        }
        !self.holes.iter().any(|hole| point_in_polygon_fn(x, y, hole))
    }

    /// Distance from a point to the polygon body: zero inside, otherwise the
    /// distance to the nearest ring edge.
    pub fn distance_to_point(&self, p: Point) -> f64 {
        if self.point_in_body(p.x, p.y, crate::clip::point_in_polygon) {
            return 0.0;
        }
        self.rings()
            .map(|ring| ring_distance(ring, p))
            .fold(f64::INFINITY, f64::min)
    }

    /// True when the outer ring can bound anything at all.
    pub fn is_valid(&self) -> bool {
        self.outer.len() >= 3 && self.signed_area().abs() > COORD_EPSILON
    }
}

/// Remove a repeated closing vertex.
fn open_ring(mut points: Vec<Point>) -> Vec<Point> {
    if points.len() > 1 {
        if let (Some(first), Some(last)) = (points.first(), points.last()) {
            if first.approx_eq(*last) {
                points.pop();
            }
        }
    }
    points
}

/// Bounding box of a point sequence.
pub fn bounding_box_of_points(points: &[Point]) -> Option<(f64, f64, f64, f64)> {
    if points.is_empty() {
        return None;
    }
    let min_x = points.iter().map(|p| p.x).fold(f64::INFINITY, f64::min);
    let min_y = points.iter().map(|p| p.y).fold(f64::INFINITY, f64::min);
    let max_x = points.iter().map(|p| p.x).fold(f64::NEG_INFINITY, f64::max);
    let max_y = points.iter().map(|p| p.y).fold(f64::NEG_INFINITY, f64::max);
    Some((min_x, min_y, max_x, max_y))
}

/// Calculate signed area of a point sequence using the shoelace formula.
///
/// Returns:
/// - Positive value for counter-clockwise winding
/// - Negative value for clockwise winding
pub fn signed_area_of_points(points: &[Point]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }

    let mut area = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        area += points[i].x * points[j].y;
        area -= points[j].x * points[i].y;
    }
    area / 2.0
}

/// Parameter (0..=1) of the point on segment `a`-`b` closest to `p`.
#[inline]
pub fn project_onto_segment(p: Point, a: Point, b: Point) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len_sq = dx * dx + dy * dy;
    if len_sq <= COORD_EPSILON * COORD_EPSILON {
        return 0.0;
    }
    (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0)
}

/// Distance from `p` to segment `a`-`b`.
#[inline]
pub fn segment_distance(p: Point, a: Point, b: Point) -> f64 {
    p.distance(a.lerp(b, project_onto_segment(p, a, b)))
}

/// Distance from `p` to a closed ring given as open vertices.
pub fn ring_distance(ring: &[Point], p: Point) -> f64 {
    match ring.len() {
        0 => f64::INFINITY,
        1 => p.distance(ring[0]),
        n => (0..n)
            .map(|i| segment_distance(p, ring[i], ring[(i + 1) % n]))
            .fold(f64::INFINITY, f64::min),
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_distance() {
        let p1 = Point::new(0.0, 0.0);
        let p2 = Point::new(3.0, 4.0);
        assert_eq!(p1.distance(p2), 5.0);
    }

    #[test]
    fn line_length() {
        let line = Line::new(0.0, 0.0, 3.0, 4.0);
        assert_eq!(line.length(), 5.0);
    }

    #[test]
    fn linestring_length_and_reverse() {
        let ls = LineString::new(vec![
            Point::new(0.0, 0.0),
            Point::new(3.0, 4.0),
            Point::new(3.0, 10.0),
        ]);
        assert_eq!(ls.length(), 11.0);
        assert_eq!(ls.reversed().first(), Some(Point::new(3.0, 10.0)));
    }

    #[test]
    fn degenerate_linestrings() {
        assert!(LineString::default().is_degenerate());
        assert!(LineString::new(vec![Point::new(1.0, 1.0)]).is_degenerate());
        assert!(LineString::segment(Point::new(1.0, 1.0), Point::new(1.0, 1.0)).is_degenerate());
        assert!(!LineString::segment(Point::new(0.0, 0.0), Point::new(1.0, 0.0)).is_degenerate());
    }

    #[test]
    fn closing_vertex_is_dropped() {
        let poly = Polygon::new(vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 0.0),
        ]);
        assert_eq!(poly.outer.len(), 3);
    }

    #[test]
    fn polygon_bbox_and_center() {
        let poly = Polygon::rect(0.0, 0.0, 10.0, 5.0);
        assert_eq!(poly.bounding_box(), Some((0.0, 0.0, 10.0, 5.0)));
        assert_eq!(poly.center(), Some(Point::new(5.0, 2.5)));
    }

    #[test]
    fn empty_polygon_bbox() {
        let poly = Polygon::new(vec![]);
        assert_eq!(poly.bounding_box(), None);
        assert!(!poly.is_valid());
    }

    #[test]
    fn area_subtracts_holes() {
        let poly = Polygon::with_holes(
            Polygon::rect(0.0, 0.0, 10.0, 10.0).outer,
            vec![Polygon::rect(2.0, 2.0, 4.0, 4.0).outer],
        );
        assert!((poly.area() - 96.0).abs() < 1e-10, "area should be 96, got {}", poly.area());
    }

    #[test]
    fn distance_to_polygon() {
        let poly = Polygon::rect(0.0, 0.0, 10.0, 10.0);
        assert_eq!(poly.distance_to_point(Point::new(5.0, 5.0)), 0.0);
        assert!((poly.distance_to_point(Point::new(13.0, 5.0)) - 3.0).abs() < 1e-10);
        assert!((poly.distance_to_point(Point::new(13.0, 14.0)) - 5.0).abs() < 1e-10);
    }

    #[test]
    fn distance_inside_hole_is_to_hole_ring() {
        let poly = Polygon::with_holes(
            Polygon::rect(0.0, 0.0, 10.0, 10.0).outer,
            vec![Polygon::rect(2.0, 2.0, 8.0, 8.0).outer],
        );
        assert!((poly.distance_to_point(Point::new(5.0, 5.0)) - 3.0).abs() < 1e-10);
    }

    #[test]
    fn signed_area_winding() {
        let ccw = Polygon::rect(0.0, 0.0, 10.0, 10.0);
        assert!((ccw.signed_area() - 100.0).abs() < 1e-10);

        let cw = Polygon::new(vec![
            Point::new(0.0, 0.0),
            Point::new(0.0, 10.0),
            Point::new(10.0, 10.0),
            Point::new(10.0, 0.0),
        ]);
        assert!((cw.signed_area() + 100.0).abs() < 1e-10);
    }

    #[test]
    fn projection_is_clamped() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(10.0, 0.0);
        assert_eq!(project_onto_segment(Point::new(-5.0, 3.0), a, b), 0.0);
        assert_eq!(project_onto_segment(Point::new(15.0, 3.0), a, b), 1.0);
        assert_eq!(project_onto_segment(Point::new(5.0, 3.0), a, b), 0.5);
    }
}
