//! Legacy fill flag search.
//!
//! Legacy fill has no routed entry point. Where its first stitch lands is
//! controlled only by the `reverse` and `flip` flags, so the best pair is
//! found by rendering each of the four combinations and keeping the one
//! whose first stitch lies closest to the routed start point.

use log::debug;

use crate::emit::StitchElement;
use crate::geometry::Point;

/// Flag combinations in evaluation order as `(reverse, flip)`. Ties go to
/// the earliest entry.
pub const FLAG_CANDIDATES: [(bool, bool); 4] = [(false, false), (true, false), (true, true), (false, true)];

/// Renders a legacy fill far enough to report its first stitch.
pub trait LegacyFillRenderer {
    /// First stitch of `element` with its current flags, `None` when the
    /// element produces no stitches.
    fn first_stitch(&self, element: &StitchElement) -> Option<Point>;
}

/// Set `reverse`/`flip` on a legacy fill element so its first stitch lands
/// as close to `target` as possible.
///
/// Returns the chosen `(reverse, flip)` pair, or `None` when the element
/// is not a fill or renders no stitches unflagged. In that case the
/// element is left untouched.
pub fn optimize_legacy_fill<R: LegacyFillRenderer + ?Sized>(
    element: &mut StitchElement,
    target: Point,
    renderer: &R,
) -> Option<(bool, bool)> {
    let original = element.fill_params().map(|params| (params.reverse, params.flip))?;

    let mut distances = [f64::INFINITY; 4];
    for (i, &(reverse, flip)) in FLAG_CANDIDATES.iter().enumerate() {
        set_flags(element, reverse, flip);
        match renderer.first_stitch(element) {
            Some(stitch) => distances[i] = stitch.distance(target),
            // Nothing to measure against without an unflagged stitch
            None if i == 0 => {
                debug!("{}: legacy fill renders no stitches, keeping flags", element.color);
                set_flags(element, original.0, original.1);
                return None;
            }
            None => {}
        }
    }

    let best = distances
        .iter()
        .enumerate()
        .fold(0, |best, (i, d)| if *d < distances[best] { i } else { best });
    let (reverse, flip) = FLAG_CANDIDATES[best];
    set_flags(element, reverse, flip);
    Some((reverse, flip))
}

fn set_flags(element: &mut StitchElement, reverse: bool, flip: bool) {
    if let Some(params) = element.fill_params_mut() {
        params.reverse = reverse;
        params.flip = flip;
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::emit::ElementEmitter;
    use crate::geometry::{LineString, Polygon};
    use crate::settings::{StitchType, TartanSettings};
    use crate::shapes::Direction;

    /// Rows run along x; reverse starts from the right, flip from the top.
    struct CornerRenderer {
        calls: Cell<usize>,
    }

    impl CornerRenderer {
        fn new() -> Self {
            Self { calls: Cell::new(0) }
        }
    }

    impl LegacyFillRenderer for CornerRenderer {
        fn first_stitch(&self, element: &StitchElement) -> Option<Point> {
            self.calls.set(self.calls.get() + 1);
            let params = element.fill_params()?;
            let x = if params.reverse { 10.0 } else { 0.0 };
            let y = if params.flip { 10.0 } else { 0.0 };
            Some(Point::new(x, y))
        }
    }

    struct NoStitches;

    impl LegacyFillRenderer for NoStitches {
        fn first_stitch(&self, _element: &StitchElement) -> Option<Point> {
            None
        }
    }

    fn legacy_element() -> StitchElement {
        let settings = TartanSettings { stitch_type: StitchType::LegacyFill, ..Default::default() };
        ElementEmitter::new(&settings)
            .fill_element("red", &Polygon::rect(0.0, 0.0, 10.0, 10.0), Direction::Warp, None, None)
            .unwrap()
    }

    #[test]
    fn picks_the_closest_corner() {
        let renderer = CornerRenderer::new();
        let cases = [
            (Point::new(1.0, 1.0), (false, false)),
            (Point::new(9.0, 1.0), (true, false)),
            (Point::new(9.0, 9.0), (true, true)),
            (Point::new(1.0, 9.0), (false, true)),
        ];
        for (target, expected) in cases {
            let mut element = legacy_element();
            assert_eq!(optimize_legacy_fill(&mut element, target, &renderer), Some(expected));
            let params = element.fill_params().unwrap();
            assert_eq!((params.reverse, params.flip), expected);
        }
        assert_eq!(renderer.calls.get(), 16, "every candidate is rendered once");
    }

    #[test]
    fn ties_keep_the_earliest_candidate() {
        let mut element = legacy_element();
        // equidistant from all four corners
        let chosen = optimize_legacy_fill(&mut element, Point::new(5.0, 5.0), &CornerRenderer::new());
        assert_eq!(chosen, Some((false, false)));
    }

    #[test]
    fn search_is_idempotent() {
        let renderer = CornerRenderer::new();
        let target = Point::new(8.0, 7.0);
        let mut element = legacy_element();
        let first = optimize_legacy_fill(&mut element, target, &renderer);
        let after_first = element.clone();
        let second = optimize_legacy_fill(&mut element, target, &renderer);
        assert_eq!(first, second);
        assert_eq!(element, after_first);
    }

    #[test]
    fn no_stitches_leaves_element_unchanged() {
        let mut element = legacy_element();
        element.fill_params_mut().unwrap().flip = true;
        let before = element.clone();
        assert_eq!(optimize_legacy_fill(&mut element, Point::new(0.0, 0.0), &NoStitches), None);
        assert_eq!(element, before);
    }

    #[test]
    fn strokes_are_not_optimized() {
        let settings = TartanSettings::default();
        let mut stroke = ElementEmitter::new(&settings)
            .line_element("red", &LineString::segment(Point::new(0.0, 0.0), Point::new(1.0, 0.0)), false)
            .unwrap();
        assert_eq!(optimize_legacy_fill(&mut stroke, Point::new(0.0, 0.0), &CornerRenderer::new()), None);
    }
}
