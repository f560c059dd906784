//! Line clipping against polygons with holes.
//!
//! Routing lines are cut out of stripe polygons here, so every ring
//! (outer boundary and holes) takes part in the intersection test.

use crate::geometry::{Line, Point, Polygon};

/// Intersections closer than this along the clipped line are merged.
const T_EPSILON: f64 = 1e-9;

// ============================================================================
// POINT IN POLYGON (Ray Casting Algorithm)
// ============================================================================
//
// ## Rust Lesson #8: References & Slices
//
// `&[Point]` is a "slice" - a borrowed view into a contiguous sequence.
// It works with Vec<Point>, arrays, or any contiguous memory.

/// Test if a point is inside a ring using ray casting.
///
/// Casts a ray to the right and counts edge crossings.
/// Odd crossings = inside, even = outside.
#[inline]
pub fn point_in_polygon(px: f64, py: f64, polygon: &[Point]) -> bool {
    let n = polygon.len();
    if n < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = n - 1;

    for i in 0..n {
        let (xi, yi) = (polygon[i].x, polygon[i].y);
        let (xj, yj) = (polygon[j].x, polygon[j].y);

        if ((yi > py) != (yj > py)) && (px < (xj - xi) * (py - yi) / (yj - yi) + xi) {
            inside = !inside;
        }

        j = i;
    }

    inside
}

// ============================================================================
// LINE-LINE INTERSECTION
// ============================================================================

/// Result of a line-line intersection test.
///
/// ## Rust Lesson #10: Enums (Sum Types)
///
/// Rust enums can carry data. The compiler ensures you handle ALL
/// variants (exhaustive matching).
#[derive(Debug, Clone, Copy)]
pub enum Intersection {
    None,
    Point { x: f64, y: f64, t: f64 },
}

/// Find intersection point between two line segments.
///
/// Returns the intersection point and `t` parameter (0..1 means on first segment).
#[inline]
pub fn line_segment_intersection(
    x1: f64, y1: f64, x2: f64, y2: f64,
    x3: f64, y3: f64, x4: f64, y4: f64,
) -> Intersection {
    let denom = (y4 - y3) * (x2 - x1) - (x4 - x3) * (y2 - y1);

    // Parallel or coincident lines
    if denom.abs() < 1e-10 {
        return Intersection::None;
    }

    let ua = ((x4 - x3) * (y1 - y3) - (y4 - y3) * (x1 - x3)) / denom;
    let ub = ((x2 - x1) * (y1 - y3) - (y2 - y1) * (x1 - x3)) / denom;

    if (0.0..=1.0).contains(&ua) && (0.0..=1.0).contains(&ub) {
        let ix = x1 + ua * (x2 - x1);
        let iy = y1 + ua * (y2 - y1);
        Intersection::Point { x: ix, y: iy, t: ua }
    } else {
        Intersection::None
    }
}

// ============================================================================
// LINE-POLYGON CLIPPING
// ============================================================================

/// Find all intersections between a line and every ring of a polygon.
///
/// Returns `(x, y, t)` triples sorted by `t` along the line, with
/// coincident hits (a line passing exactly through a vertex) merged.
pub fn line_polygon_intersections(line: Line, polygon: &Polygon) -> Vec<(f64, f64, f64)> {
    let mut intersections = Vec::new();

    for ring in polygon.rings() {
        let n = ring.len();
        if n < 2 {
            continue;
        }
        for i in 0..n {
            let a = ring[i];
            let b = ring[(i + 1) % n];
            if let Intersection::Point { x, y, t } = line_segment_intersection(
                line.x1, line.y1, line.x2, line.y2,
                a.x, a.y, b.x, b.y,
            ) {
                intersections.push((x, y, t));
            }
        }
    }

    intersections.sort_by(|a, b| a.2.total_cmp(&b.2));
    intersections.dedup_by(|a, b| (a.2 - b.2).abs() < T_EPSILON);
    intersections
}

/// Clip a line to a polygon with holes.
///
/// Returns the pieces of the line that lie inside the polygon body,
/// ordered from the line's start to its end.
pub fn clip_line_to_polygon(line: Line, polygon: &Polygon) -> Vec<Line> {
    // Fast bounding box rejection
    if let Some((min_x, min_y, max_x, max_y)) = polygon.bounding_box() {
        let line_min_x = line.x1.min(line.x2);
        let line_max_x = line.x1.max(line.x2);
        let line_min_y = line.y1.min(line.y2);
        let line_max_y = line.y1.max(line.y2);

        if line_max_x < min_x || line_min_x > max_x ||
           line_max_y < min_y || line_min_y > max_y {
            return Vec::new();
        }
    } else {
        return Vec::new();
    }

    // Build all candidate cut points along the line
    let mut points = Vec::new();
    points.push((line.x1, line.y1, 0.0));
    points.extend(line_polygon_intersections(line, polygon));
    points.push((line.x2, line.y2, 1.0));
    points.sort_by(|a, b| a.2.total_cmp(&b.2));
    points.dedup_by(|a, b| (a.2 - b.2).abs() < T_EPSILON);

    // ## Rust Lesson #14: Iterators & Collecting
    //
    // .windows(2) gives sliding windows of size 2: [a,b], [b,c], [c,d], ...
    // .filter_map() combines filter + map: return Some(x) to keep, None to skip

    let pieces: Vec<Line> = points
        .windows(2)
        .filter_map(|pair| {
            let (x1, y1, _) = pair[0];
            let (x2, y2, _) = pair[1];
            let mid_x = (x1 + x2) / 2.0;
            let mid_y = (y1 + y2) / 2.0;
            if polygon.point_in_body(mid_x, mid_y, point_in_polygon) {
                Some(Line::new(x1, y1, x2, y2))
            } else {
                None
            }
        })
        .collect();

    merge_touching(pieces)
}

/// Join consecutive pieces that share an endpoint (a cut at a vertex
/// that did not actually leave the polygon).
fn merge_touching(pieces: Vec<Line>) -> Vec<Line> {
    let mut merged: Vec<Line> = Vec::with_capacity(pieces.len());
    for piece in pieces {
        match merged.last_mut() {
            Some(last) if last.end().approx_eq(piece.start()) => {
                last.x2 = piece.x2;
                last.y2 = piece.y2;
            }
            _ => merged.push(piece),
        }
    }
    merged
}

/// Clip multiple lines to a polygon.
pub fn clip_lines_to_polygon(lines: &[Line], polygon: &Polygon) -> Vec<Line> {
    lines
        .iter()
        .flat_map(|line| clip_line_to_polygon(*line, polygon))
        .collect()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Polygon {
        Polygon::rect(0.0, 0.0, 10.0, 10.0)
    }

    #[test]
    fn point_inside_square() {
        let sq = square();
        assert!(point_in_polygon(5.0, 5.0, &sq.outer));
        assert!(!point_in_polygon(15.0, 5.0, &sq.outer));
        assert!(!point_in_polygon(-1.0, 5.0, &sq.outer));
    }

    #[test]
    fn line_entirely_inside() {
        let line = Line::new(2.0, 5.0, 8.0, 5.0);
        let result = clip_line_to_polygon(line, &square());
        assert_eq!(result.len(), 1);
        assert_eq!(result[0], line);
    }

    #[test]
    fn line_entirely_outside() {
        let line = Line::new(15.0, 5.0, 20.0, 5.0);
        assert!(clip_line_to_polygon(line, &square()).is_empty());
    }

    #[test]
    fn line_crosses_polygon() {
        let line = Line::new(-5.0, 5.0, 15.0, 5.0);
        let result = clip_line_to_polygon(line, &square());
        assert_eq!(result.len(), 1);
        assert!((result[0].x1 - 0.0).abs() < 1e-10);
        assert!((result[0].x2 - 10.0).abs() < 1e-10);
    }

    #[test]
    fn diagonal_through_corners() {
        let line = Line::new(0.0, 0.0, 10.0, 10.0);
        let result = clip_line_to_polygon(line, &square());
        assert_eq!(result.len(), 1, "corner to corner should stay one piece: {:?}", result);
        assert!(result[0].start().approx_eq(Point::new(0.0, 0.0)));
        assert!(result[0].end().approx_eq(Point::new(10.0, 10.0)));
    }

    #[test]
    fn hole_splits_line() {
        let poly = Polygon::with_holes(
            square().outer,
            vec![Polygon::rect(4.0, 4.0, 6.0, 6.0).outer],
        );
        let result = clip_line_to_polygon(Line::new(-1.0, 5.0, 11.0, 5.0), &poly);
        assert_eq!(result.len(), 2, "hole should split the line: {:?}", result);
        assert!((result[0].x2 - 4.0).abs() < 1e-10);
        assert!((result[1].x1 - 6.0).abs() < 1e-10);
    }

    #[test]
    fn line_segment_intersection_test() {
        let result = line_segment_intersection(
            0.0, 0.0, 10.0, 10.0,
            0.0, 10.0, 10.0, 0.0,
        );
        if let Intersection::Point { x, y, .. } = result {
            assert!((x - 5.0).abs() < 1e-10);
            assert!((y - 5.0).abs() < 1e-10);
        } else {
            panic!("Expected intersection");
        }

        let result = line_segment_intersection(
            0.0, 0.0, 10.0, 0.0,
            0.0, 5.0, 10.0, 5.0,
        );
        assert!(matches!(result, Intersection::None));
    }
}
