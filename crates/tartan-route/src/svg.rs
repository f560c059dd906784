//! SVG outline input.
//!
//! Uses usvg for complete SVG resolution (CSS, shapes, etc.) and svgtypes
//! for bare path data, then turns the first filled path into an outline
//! polygon: the first subpath is the exterior, every further subpath a
//! hole.
//!
//! ## Curve Flattening
//!
//! SVG paths contain Bézier curves (cubic and quadratic). These must be
//! "flattened" into line segments for polygon operations. We use lyon_geom
//! for accurate curve approximation with a configurable tolerance.

use lyon_geom::{point, CubicBezierSegment, QuadraticBezierSegment};
use svgtypes::{SimplePathSegment, SimplifyingPathParser};

use crate::error::{Result, TartanError};
use crate::geometry::{Point, Polygon};

/// Tolerance for curve flattening.
/// Lower = more points, smoother curves, slower.
const CURVE_TOLERANCE: f64 = 0.1;

/// Outline polygon from an SVG document: the first filled path.
pub fn outline_from_svg(svg_content: &str) -> Result<Polygon> {
    let options = usvg::Options::default();
    let tree = usvg::Tree::from_str(svg_content, &options).map_err(|e| TartanError::Svg(e.to_string()))?;

    find_outline(tree.root()).ok_or(TartanError::NoOutline)
}

/// Outline polygon from a `d` attribute.
pub fn outline_from_path_data(d: &str) -> Result<Polygon> {
    let mut rings = RingCollector::default();
    for segment in SimplifyingPathParser::from(d) {
        match segment.map_err(|e| TartanError::Svg(e.to_string()))? {
            SimplePathSegment::MoveTo { x, y } => rings.move_to(x, y),
            SimplePathSegment::LineTo { x, y } => rings.line_to(x, y),
            SimplePathSegment::Quadratic { x1, y1, x, y } => rings.quad_to(x1, y1, x, y),
            SimplePathSegment::CurveTo { x1, y1, x2, y2, x, y } => rings.cubic_to(x1, y1, x2, y2, x, y),
            SimplePathSegment::ClosePath => rings.close(),
        }
    }
    rings.finish().ok_or(TartanError::NoOutline)
}

/// Depth-first search for the first filled path with a usable exterior.
fn find_outline(group: &usvg::Group) -> Option<Polygon> {
    group.children().iter().find_map(|node| match node {
        usvg::Node::Group(group) => find_outline(group),
        usvg::Node::Path(path) if path.fill().is_some() => path_to_polygon(path),
        // Ignore text, images, unfilled paths
        _ => None,
    })
}

/// Convert a usvg path to an outline polygon.
fn path_to_polygon(path: &usvg::Path) -> Option<Polygon> {
    use usvg::tiny_skia_path::PathSegment;

    let mut rings = RingCollector::default();
    for segment in path.data().segments() {
        match segment {
            PathSegment::MoveTo(p) => rings.move_to(p.x as f64, p.y as f64),
            PathSegment::LineTo(p) => rings.line_to(p.x as f64, p.y as f64),
            PathSegment::QuadTo(c, p) => rings.quad_to(c.x as f64, c.y as f64, p.x as f64, p.y as f64),
            PathSegment::CubicTo(c1, c2, p) => rings.cubic_to(
                c1.x as f64,
                c1.y as f64,
                c2.x as f64,
                c2.y as f64,
                p.x as f64,
                p.y as f64,
            ),
            PathSegment::Close => rings.close(),
        }
    }
    rings.finish()
}

/// Collects flattened subpaths as polygon rings.
#[derive(Debug, Default)]
struct RingCollector {
    rings: Vec<Vec<Point>>,
    current: Vec<Point>,
}

impl RingCollector {
    fn last(&self) -> Option<Point> {
        self.current.last().copied()
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.close();
        self.current.push(Point::new(x, y));
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.current.push(Point::new(x, y));
    }

    fn quad_to(&mut self, x1: f64, y1: f64, x: f64, y: f64) {
        let Some(from) = self.last() else {
            return self.line_to(x, y);
        };
        let curve = QuadraticBezierSegment {
            from: point(from.x, from.y),
            ctrl: point(x1, y1),
            to: point(x, y),
        };
        // Callback receives LineSegment, we take the endpoint of each segment
        curve.for_each_flattened(CURVE_TOLERANCE, &mut |segment| {
            self.current.push(Point::new(segment.to.x, segment.to.y));
        });
    }

    fn cubic_to(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, x: f64, y: f64) {
        let Some(from) = self.last() else {
            return self.line_to(x, y);
        };
        let curve = CubicBezierSegment {
            from: point(from.x, from.y),
            ctrl1: point(x1, y1),
            ctrl2: point(x2, y2),
            to: point(x, y),
        };
        curve.for_each_flattened(CURVE_TOLERANCE, &mut |segment| {
            self.current.push(Point::new(segment.to.x, segment.to.y));
        });
    }

    /// End the current subpath. Subpaths with fewer than 3 distinct
    /// vertices are dropped.
    fn close(&mut self) {
        let mut ring = std::mem::take(&mut self.current);
        // Duplicate consecutive points can occur from curve flattening
        ring.dedup_by(|a, b| a.approx_eq(*b));
        if ring.len() > 1 && ring.first().zip(ring.last()).is_some_and(|(a, b)| a.approx_eq(*b)) {
            ring.pop();
        }
        if ring.len() >= 3 {
            self.rings.push(ring);
        }
    }

    fn finish(mut self) -> Option<Polygon> {
        self.close();
        let mut rings = self.rings.into_iter();
        let outer = rings.next()?;
        let polygon = Polygon::with_holes(outer, rings.collect());
        polygon.is_valid().then_some(polygon)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_simple_rect() {
        let svg = r#"
            <svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 100 100">
                <rect x="10" y="10" width="80" height="80"/>
            </svg>
        "#;

        let outline = outline_from_svg(svg).unwrap();
        assert_eq!(outline.outer.len(), 4); // rect = 4 points
        assert!(outline.holes.is_empty());
        assert!((outline.area() - 6400.0).abs() < 1e-6);
    }

    #[test]
    fn unfilled_paths_are_skipped() {
        let svg = r#"
            <svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 100 100">
                <path d="M 0,0 L 50,0 L 50,50 Z" fill="none" stroke="black"/>
                <polygon points="10,10 90,10 90,90 10,90"/>
            </svg>
        "#;

        let outline = outline_from_svg(svg).unwrap();
        assert_eq!(outline.bounding_box(), Some((10.0, 10.0, 90.0, 90.0)));
    }

    #[test]
    fn no_outline_error() {
        let svg = r#"
            <svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 100 100">
            </svg>
        "#;

        assert!(matches!(outline_from_svg(svg), Err(TartanError::NoOutline)));
        assert!(matches!(outline_from_svg("not svg"), Err(TartanError::Svg(_))));
    }

    #[test]
    fn curve_flattening_circle() {
        // A circle uses cubic Bézier curves - without proper flattening,
        // this would only have 4-5 points (just the endpoints)
        let svg = r#"
            <svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 100 100">
                <circle cx="50" cy="50" r="40"/>
            </svg>
        "#;

        let outline = outline_from_svg(svg).unwrap();
        assert!(outline.outer.len() > 20,
            "Circle should have many points from curve flattening, got {}",
            outline.outer.len());
    }

    #[test]
    fn subpaths_become_holes() {
        let outline = outline_from_path_data("M 0,0 H 100 V 100 H 0 Z M 40,40 H 60 V 60 H 40 Z").unwrap();
        assert_eq!(outline.outer.len(), 4);
        assert_eq!(outline.holes.len(), 1);
        assert!((outline.area() - 9600.0).abs() < 1e-9);
    }

    #[test]
    fn path_data_with_relative_curves() {
        let outline = outline_from_path_data("m 10,10 c 30,0 50,80 80,80 l 0,-80 z").unwrap();
        assert!(outline.outer.len() > 5,
            "Path with Bézier should have multiple points, got {}",
            outline.outer.len());
        assert_eq!(outline.outer[0], Point::new(10.0, 10.0));
    }

    #[test]
    fn degenerate_path_data() {
        assert!(matches!(outline_from_path_data("M 0,0 L 10,0"), Err(TartanError::NoOutline)));
    }
}
