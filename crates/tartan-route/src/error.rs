//! Error type for tartan routing.
//!
//! Only hard failures live here. Conditions the router can recover from
//! (an empty graph, an unmatched stripe polygon, zero-length geometry, a
//! legacy fill that renders no stitches) are logged and yield an empty or
//! partial result instead.

use thiserror::Error;

use crate::shapes::Direction;

#[derive(Debug, Error)]
pub enum TartanError {
    /// Outline missing, or with fewer than 3 exterior vertices.
    #[error("invalid outline: {0}")]
    InvalidOutline(String),

    /// A pallet color has no geometry in the stripe generator's output.
    #[error("no {direction} stripe geometry for color {color}")]
    MissingStripeGeometry { color: String, direction: Direction },

    #[error("SVG parse error: {0}")]
    Svg(String),

    #[error("no outline found in SVG")]
    NoOutline,

    #[error("settings error: {0}")]
    Settings(String),
}

pub type Result<T> = std::result::Result<T, TartanError>;

impl From<serde_yaml::Error> for TartanError {
    fn from(err: serde_yaml::Error) -> Self {
        TartanError::Settings(err.to_string())
    }
}

impl From<serde_json::Error> for TartanError {
    fn from(err: serde_json::Error) -> Self {
        TartanError::Settings(err.to_string())
    }
}
