//! Bounding shapes: convex hull, minimum-area rotated rectangle and
//! minimum enclosing circle.
//!
//! ## Algorithms
//!
//! - **Convex hull**: Andrew's monotone chain, O(n log n)
//! - **Rotated rectangle**: one candidate per hull edge (the optimal
//!   rectangle always has a side collinear with a hull edge), O(h²)
//! - **Enclosing circle**: incremental Welzl over the hull, expected O(h)

use crate::geometry::{Point, COORD_EPSILON};

/// A circle given by center and radius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    pub center: Point,
    pub radius: f64,
}

impl Circle {
    #[inline]
    fn contains(&self, p: Point) -> bool {
        self.center.distance(p) <= self.radius + 1e-7
    }
}

#[inline]
fn cross(o: Point, a: Point, b: Point) -> f64 {
    (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
}

/// Convex hull in counter-clockwise order, without a closing vertex.
///
/// Collinear points are dropped. Fewer than three distinct input points
/// come back as-is (deduplicated).
pub fn convex_hull(points: &[Point]) -> Vec<Point> {
    let mut pts: Vec<Point> = points.to_vec();
    pts.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
    pts.dedup_by(|a, b| a.approx_eq(*b));

    if pts.len() < 3 {
        return pts;
    }

    let mut lower: Vec<Point> = Vec::with_capacity(pts.len());
    for &p in &pts {
        while lower.len() >= 2 && cross(lower[lower.len() - 2], lower[lower.len() - 1], p) <= 0.0 {
            lower.pop();
        }
        lower.push(p);
    }

    let mut upper: Vec<Point> = Vec::with_capacity(pts.len());
    for &p in pts.iter().rev() {
        while upper.len() >= 2 && cross(upper[upper.len() - 2], upper[upper.len() - 1], p) <= 0.0 {
            upper.pop();
        }
        upper.push(p);
    }

    lower.pop();
    upper.pop();
    lower.extend(upper);
    lower
}

/// Minimum-area rectangle enclosing the points, as four corners in order.
///
/// Corners 0 and 2 (and 1 and 3) are diagonally opposite. Degenerate input
/// (a single point or a straight run) yields a zero-width rectangle along
/// the run.
pub fn minimum_rotated_rectangle(points: &[Point]) -> Option<[Point; 4]> {
    let hull = convex_hull(points);
    match hull.len() {
        0 => return None,
        1 => return Some([hull[0]; 4]),
        2 => return Some([hull[0], hull[1], hull[1], hull[0]]),
        _ => {}
    }

    let mut best: Option<(f64, [Point; 4])> = None;
    let n = hull.len();

    for i in 0..n {
        let a = hull[i];
        let b = hull[(i + 1) % n];
        let len = a.distance(b);
        if len <= COORD_EPSILON {
            continue;
        }
        // Unit vectors along and across the edge
        let (ux, uy) = ((b.x - a.x) / len, (b.y - a.y) / len);
        let (vx, vy) = (-uy, ux);

        let mut min_u = f64::INFINITY;
        let mut max_u = f64::NEG_INFINITY;
        let mut min_v = f64::INFINITY;
        let mut max_v = f64::NEG_INFINITY;
        for p in &hull {
            let du = (p.x - a.x) * ux + (p.y - a.y) * uy;
            let dv = (p.x - a.x) * vx + (p.y - a.y) * vy;
            min_u = min_u.min(du);
            max_u = max_u.max(du);
            min_v = min_v.min(dv);
            max_v = max_v.max(dv);
        }

        let area = (max_u - min_u) * (max_v - min_v);
        if best.as_ref().is_some_and(|(best_area, _)| *best_area <= area) {
            continue;
        }

        let corner = |u: f64, v: f64| Point::new(a.x + ux * u + vx * v, a.y + uy * u + vy * v);
        best = Some((
            area,
            [
                corner(min_u, min_v),
                corner(max_u, min_v),
                corner(max_u, max_v),
                corner(min_u, max_v),
            ],
        ));
    }

    best.map(|(_, rect)| rect)
}

/// Smallest circle containing all points.
pub fn minimum_enclosing_circle(points: &[Point]) -> Option<Circle> {
    let hull = convex_hull(points);
    let first = *hull.first()?;

    let mut circle = Circle { center: first, radius: 0.0 };
    for i in 1..hull.len() {
        if circle.contains(hull[i]) {
            continue;
        }
        circle = Circle { center: hull[i], radius: 0.0 };
        for j in 0..i {
            if circle.contains(hull[j]) {
                continue;
            }
            circle = circle_from_two(hull[i], hull[j]);
            for k in 0..j {
                if !circle.contains(hull[k]) {
                    circle = circle_from_three(hull[i], hull[j], hull[k])
                        .unwrap_or_else(|| circle_from_two(hull[i], hull[k]));
                }
            }
        }
    }
    Some(circle)
}

/// Radius of the minimum enclosing circle (zero for empty input).
pub fn minimum_bounding_radius(points: &[Point]) -> f64 {
    minimum_enclosing_circle(points).map_or(0.0, |c| c.radius)
}

fn circle_from_two(a: Point, b: Point) -> Circle {
    let center = a.lerp(b, 0.5);
    Circle { center, radius: center.distance(a) }
}

/// Circumcircle; `None` when the points are collinear.
fn circle_from_three(a: Point, b: Point, c: Point) -> Option<Circle> {
    let d = 2.0 * (a.x * (b.y - c.y) + b.x * (c.y - a.y) + c.x * (a.y - b.y));
    if d.abs() < 1e-12 {
        return None;
    }
    let a2 = a.x * a.x + a.y * a.y;
    let b2 = b.x * b.x + b.y * b.y;
    let c2 = c.x * c.x + c.y * c.y;
    let center = Point::new(
        (a2 * (b.y - c.y) + b2 * (c.y - a.y) + c2 * (a.y - b.y)) / d,
        (a2 * (c.x - b.x) + b2 * (a.x - c.x) + c2 * (b.x - a.x)) / d,
    );
    Some(Circle { center, radius: center.distance(a) })
}
