//! Tartan pattern generation.
//!
//! Drives one pattern end to end: pattern dimensions from the outline,
//! stripe generation for warp and weft, routing and merging, stacking,
//! and finally element emission with command markers.

use indexmap::IndexMap;
use log::{debug, info};

use crate::bounds::minimum_bounding_radius;
use crate::combine::Router;
use crate::emit::{ElementEmitter, StitchElement};
use crate::error::{Result, TartanError};
use crate::geometry::{Point, Polygon};
use crate::graph::StitchGraphBuilder;
use crate::legacy::{optimize_legacy_fill, LegacyFillRenderer};
use crate::settings::{Stripe, StitchType, TartanSettings};
use crate::shapes::{ColorGroups, Direction, RoutedShape, Stripes};

/// Area covered by the stripe pattern, and the rotation center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PatternDimensions {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
    /// Center of the outline's bounding box.
    pub center: Point,
}

impl PatternDimensions {
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}

/// Pattern area for `outline`.
///
/// Offsets shift the pattern origin. With a rotation the area grows to the
/// square around the bounding-box center whose half side is the outline's
/// minimum enclosing radius, so rotated stripes leave no gaps in the
/// corners.
pub fn pattern_dimensions(outline: &Polygon, settings: &TartanSettings) -> Result<PatternDimensions> {
    let (min_x, min_y, max_x, max_y) = outline
        .bounding_box()
        .ok_or_else(|| TartanError::InvalidOutline("outline has no vertices".to_string()))?;
    let center = Point::new((min_x + max_x) / 2.0, (min_y + max_y) / 2.0);

    if settings.rotate != 0.0 {
        let radius = minimum_bounding_radius(&outline.outer);
        return Ok(PatternDimensions {
            min_x: center.x - radius,
            min_y: center.y - radius,
            max_x: center.x + radius,
            max_y: center.y + radius,
            center,
        });
    }

    let (offset_x, offset_y) = settings.offset_px();
    Ok(PatternDimensions {
        min_x: min_x - offset_x,
        min_y: min_y - offset_y,
        max_x,
        max_y,
        center,
    })
}

/// Everything a stripe generator needs for one direction.
#[derive(Debug, Clone)]
pub struct StripeRequest<'a> {
    pub stripes: &'a [Stripe],
    pub dimensions: PatternDimensions,
    pub outline: &'a Polygon,
    /// Degrees, around `dimensions.center`.
    pub rotation: f64,
    pub symmetry: bool,
    /// Percent.
    pub scale: f64,
    pub min_stripe_width: f64,
    pub direction: Direction,
}

/// Turns a stripe sequence into clipped stripe geometry.
///
/// The result must hold an entry for every color of the sequence (an empty
/// [`crate::shapes::StripeSet`] when a color misses the outline).
pub trait StripeGenerator {
    fn generate_stripes(&self, request: &StripeRequest<'_>) -> Stripes;
}

/// Finished elements of one pattern.
///
/// All fills are stitched before all strokes; inside each list colors
/// follow the stacking order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TartanGroup {
    pub fills: IndexMap<String, Vec<StitchElement>>,
    pub strokes: IndexMap<String, Vec<StitchElement>>,
}

impl TartanGroup {
    /// Elements in stitch order.
    pub fn elements(&self) -> impl Iterator<Item = &StitchElement> {
        self.fills.values().flatten().chain(self.strokes.values().flatten())
    }

    pub fn len(&self) -> usize {
        self.elements().count()
    }

    pub fn is_empty(&self) -> bool {
        self.elements().next().is_none()
    }
}

/// Generates tartan patterns with one stripe generator and graph builder.
pub struct TartanOrchestrator<'a, G: StripeGenerator, B: StitchGraphBuilder> {
    settings: &'a TartanSettings,
    generator: &'a G,
    builder: &'a B,
    legacy_renderer: Option<&'a dyn LegacyFillRenderer>,
}

impl<'a, G: StripeGenerator, B: StitchGraphBuilder> TartanOrchestrator<'a, G, B> {
    pub fn new(settings: &'a TartanSettings, generator: &'a G, builder: &'a B) -> Self {
        Self { settings, generator, builder, legacy_renderer: None }
    }

    /// Renderer used to pick legacy fill flags.
    pub fn with_legacy_renderer(mut self, renderer: &'a dyn LegacyFillRenderer) -> Self {
        self.legacy_renderer = Some(renderer);
        self
    }

    /// Generate the pattern inside `outline`.
    pub fn generate(&self, outline: &Polygon) -> Result<TartanGroup> {
        if !outline.is_valid() {
            return Err(TartanError::InvalidOutline(format!(
                "need at least 3 exterior vertices enclosing an area, got {}",
                outline.outer.len()
            )));
        }

        let settings = self.settings;
        let dimensions = pattern_dimensions(outline, settings)?;
        let (warp_stripes, weft_stripes) = settings.pallet.stripes(settings.scale, settings.min_stripe_width);
        debug!(
            "pallet {:?}: {} warp, {} weft stripes",
            settings.pallet.colors(),
            warp_stripes.len(),
            weft_stripes.len()
        );

        let warp = self.stripes(&warp_stripes, &dimensions, outline, Direction::Warp)?;
        let weft = self.stripes(&weft_stripes, &dimensions, outline, Direction::Weft)?;

        let router = Router::new(self.builder, outline);
        let mut groups = router.route(&warp, &weft);
        settings.stacking.apply(&mut groups);

        let group = self.emit(&groups);
        info!(
            "tartan: {} colors, {} elements ({}, {} policy)",
            groups.len(),
            group.len(),
            settings.stitch_type.name(),
            settings.stacking.name()
        );
        Ok(group)
    }

    /// Stripe geometry of one direction, checked against its sequence.
    fn stripes(
        &self,
        stripes: &[Stripe],
        dimensions: &PatternDimensions,
        outline: &Polygon,
        direction: Direction,
    ) -> Result<Stripes> {
        if stripes.is_empty() {
            debug!("{}: no stripes", direction);
            return Ok(Stripes::new());
        }

        let request = StripeRequest {
            stripes,
            dimensions: *dimensions,
            outline,
            rotation: self.settings.rotate,
            symmetry: self.settings.pallet.symmetry,
            scale: self.settings.scale,
            min_stripe_width: self.settings.min_stripe_width,
            direction,
        };
        let generated = self.generator.generate_stripes(&request);

        if let Some(missing) = stripes.iter().find(|s| !generated.contains_key(&s.color)) {
            return Err(TartanError::MissingStripeGeometry { color: missing.color.clone(), direction });
        }
        Ok(generated)
    }

    fn emit(&self, groups: &ColorGroups) -> TartanGroup {
        let emitter = ElementEmitter::new(self.settings);
        let mut output = TartanGroup::default();

        for (color, group) in groups {
            let fills: Vec<StitchElement> = group
                .fills
                .iter()
                .filter_map(|shape| self.emit_fill(&emitter, color, shape))
                .collect();
            let strokes = emitter.emit_all(color, &group.strokes);

            if !fills.is_empty() {
                output.fills.insert(color.clone(), fills);
            }
            if !strokes.is_empty() {
                output.strokes.insert(color.clone(), strokes);
            }
        }
        output
    }

    fn emit_fill(&self, emitter: &ElementEmitter<'_>, color: &str, shape: &RoutedShape) -> Option<StitchElement> {
        let mut element = emitter.emit(color, shape)?;
        if !element.is_fill() {
            return Some(element);
        }

        match self.settings.stitch_type {
            StitchType::AutoFill => element.attach_commands(),
            StitchType::LegacyFill => {
                match (self.legacy_renderer, element.start) {
                    (Some(renderer), Some(target)) => {
                        optimize_legacy_fill(&mut element, target, renderer);
                    }
                    (None, Some(_)) => debug!("{}: no legacy renderer, keeping default flags", color),
                    _ => {}
                }
                element.strip_annotations();
            }
            StitchType::Manual => element.strip_annotations(),
        }
        Some(element)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimensions_follow_bounding_box() {
        let outline = Polygon::rect(10.0, 20.0, 110.0, 70.0);
        let dims = pattern_dimensions(&outline, &TartanSettings::default()).unwrap();
        assert_eq!((dims.min_x, dims.min_y, dims.max_x, dims.max_y), (10.0, 20.0, 110.0, 70.0));
        assert_eq!(dims.center, Point::new(60.0, 45.0));
        assert_eq!(dims.width(), 100.0);
    }

    #[test]
    fn offsets_move_the_origin() {
        let outline = Polygon::rect(0.0, 0.0, 100.0, 100.0);
        let settings = TartanSettings { offset_x: 25.4, offset_y: 12.7, ..Default::default() };
        let dims = pattern_dimensions(&outline, &settings).unwrap();
        assert!((dims.min_x - -96.0).abs() < 1e-9);
        assert!((dims.min_y - -48.0).abs() < 1e-9);
        assert_eq!(dims.max_x, 100.0);
        assert_eq!(dims.center, Point::new(50.0, 50.0));
    }

    #[test]
    fn rotation_covers_the_enclosing_circle() {
        let outline = Polygon::rect(0.0, 0.0, 100.0, 50.0);
        let settings = TartanSettings { rotate: 30.0, ..Default::default() };
        let dims = pattern_dimensions(&outline, &settings).unwrap();

        let radius = (50.0f64.powi(2) + 25.0f64.powi(2)).sqrt();
        assert!((dims.width() - 2.0 * radius).abs() < 1e-6, "width {}", dims.width());
        assert!((dims.height() - 2.0 * radius).abs() < 1e-6);
        assert_eq!(dims.center, Point::new(50.0, 25.0));
    }

    #[test]
    fn empty_outline_has_no_dimensions() {
        let err = pattern_dimensions(&Polygon::new(vec![]), &TartanSettings::default()).unwrap_err();
        assert!(matches!(err, TartanError::InvalidOutline(_)));
    }
}
