//! Tartan settings.
//!
//! Settings are plain serde structs so they can be loaded from YAML or
//! JSON. Every field has a default, so a partial document is valid.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::shapes::Direction;
use crate::stack::StackingPolicy;

/// Document pixels per millimeter (96 dpi).
pub const PIXELS_PER_MM: f64 = 96.0 / 25.4;

/// Fill method of emitted fill elements.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StitchType {
    #[default]
    AutoFill,
    LegacyFill,
    /// No fill method is set; stitching is left to the user.
    Manual,
}

impl StitchType {
    pub fn name(&self) -> &'static str {
        match self {
            StitchType::AutoFill => "auto_fill",
            StitchType::LegacyFill => "legacy_fill",
            StitchType::Manual => "manual",
        }
    }
}

/// One stripe of a pallet sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stripe {
    pub color: String,
    /// Width in millimeters at 100% scale.
    pub width: f64,
}

impl Stripe {
    pub fn new(color: impl Into<String>, width: f64) -> Self {
        Self { color: color.into(), width }
    }
}

/// Warp and weft stripe sequences.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pallet {
    #[serde(default)]
    pub warp: Vec<Stripe>,
    #[serde(default)]
    pub weft: Vec<Stripe>,
    /// Mirror the sequence at each repeat.
    #[serde(default)]
    pub symmetry: bool,
    /// Weft reuses the warp sequence.
    #[serde(default)]
    pub equal_warp_weft: bool,
}

impl Pallet {
    /// Raw stripe sequence of one direction.
    pub fn sequence(&self, direction: Direction) -> &[Stripe] {
        match direction {
            Direction::Warp => &self.warp,
            Direction::Weft => &self.weft,
        }
    }

    /// Rendered width of one direction's sequence.
    ///
    /// Only stripes at least `min_width` wide after scaling count.
    pub fn width(&self, direction: Direction, scale: f64, min_width: f64) -> f64 {
        self.sequence(direction)
            .iter()
            .map(|stripe| stripe.width * scale / 100.0)
            .filter(|&width| width >= min_width)
            .sum()
    }

    /// Stripe sequences actually generated, as `(warp, weft)`.
    ///
    /// A direction with zero rendered width is dropped. With
    /// `equal_warp_weft` the weft is the warp sequence.
    pub fn stripes(&self, scale: f64, min_width: f64) -> (Vec<Stripe>, Vec<Stripe>) {
        let keep = |direction| {
            if self.width(direction, scale, min_width) > 0.0 {
                self.sequence(direction).to_vec()
            } else {
                Vec::new()
            }
        };

        let warp = keep(Direction::Warp);
        let weft = if self.equal_warp_weft { warp.clone() } else { keep(Direction::Weft) };
        (warp, weft)
    }

    /// Distinct colors in first-seen order, warp before weft.
    pub fn colors(&self) -> Vec<String> {
        let mut colors: Vec<String> = Vec::new();
        for stripe in self.warp.iter().chain(&self.weft) {
            if !colors.contains(&stripe.color) {
                colors.push(stripe.color.clone());
            }
        }
        colors
    }
}

/// Everything that controls one tartan pattern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TartanSettings {
    /// Overall pattern rotation in degrees.
    #[serde(default)]
    pub rotate: f64,

    /// Stripe width scale in percent.
    #[serde(default = "default_scale")]
    pub scale: f64,

    /// Pattern origin offset in millimeters.
    #[serde(default)]
    pub offset_x: f64,
    #[serde(default)]
    pub offset_y: f64,

    #[serde(default)]
    pub stitch_type: StitchType,

    /// Fill row spacing in millimeters.
    #[serde(default = "default_row_spacing")]
    pub row_spacing: f64,

    /// Fill angles in degrees, before the overall rotation is removed.
    #[serde(default)]
    pub angle_warp: f64,
    #[serde(default = "default_angle_weft")]
    pub angle_weft: f64,

    /// Stripes narrower than this (mm) are stroked instead of filled.
    #[serde(default = "default_min_stripe_width")]
    pub min_stripe_width: f64,

    #[serde(default)]
    pub bean_stitch_repeats: u32,

    /// Auto-fill may travel under already stitched rows.
    #[serde(default)]
    pub underpath: bool,

    /// A policy name (`largest_first`, `custom:red,blue`) or the
    /// serialized enum.
    #[serde(default, deserialize_with = "crate::stack::deserialize_policy")]
    pub stacking: StackingPolicy,

    #[serde(default)]
    pub pallet: Pallet,
}

fn default_scale() -> f64 {
    100.0
}

fn default_row_spacing() -> f64 {
    0.25
}

fn default_angle_weft() -> f64 {
    90.0
}

fn default_min_stripe_width() -> f64 {
    1.0
}

impl Default for TartanSettings {
    fn default() -> Self {
        Self {
            rotate: 0.0,
            scale: default_scale(),
            offset_x: 0.0,
            offset_y: 0.0,
            stitch_type: StitchType::default(),
            row_spacing: default_row_spacing(),
            angle_warp: 0.0,
            angle_weft: default_angle_weft(),
            min_stripe_width: default_min_stripe_width(),
            bean_stitch_repeats: 0,
            underpath: false,
            stacking: StackingPolicy::default(),
            pallet: Pallet::default(),
        }
    }
}

impl TartanSettings {
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Origin offset in document pixels.
    pub fn offset_px(&self) -> (f64, f64) {
        (self.offset_x * PIXELS_PER_MM, self.offset_y * PIXELS_PER_MM)
    }

    /// Fill angle of one direction relative to the rotated pattern.
    pub fn fill_angle(&self, direction: Direction) -> f64 {
        match direction {
            Direction::Warp => self.angle_warp - self.rotate,
            Direction::Weft => self.angle_weft - self.rotate,
        }
    }
}
