//! # tartan-route
//!
//! Stripe routing and path assembly for tartan embroidery fills.
//!
//! Warp and weft stripes are routed per color through a fill-stitch graph,
//! the resulting edge lists are turned into ordered fills, strokes and
//! travel moves along the outline, both directions are merged into one
//! stitch sequence per color, and the result is emitted as annotated
//! stitch elements.
//!
//! ## Rust Lesson #7: Modules
//!
//! Rust modules are like ES6 modules but more explicit:
//! - `mod foo;` = load from `foo.rs` or `foo/mod.rs`
//! - `pub mod foo;` = also export it publicly
//! - `pub use foo::Bar;` = re-export Bar at this level

pub mod assemble;
pub mod bounds;
pub mod clip;
pub mod combine;
pub mod emit;
pub mod error;
pub mod geometry;
pub mod graph;
pub mod legacy;
pub mod ring;
pub mod routing_line;
pub mod settings;
pub mod shapes;
pub mod stack;
pub mod svg;
pub mod tartan;

// Re-export common types at crate root for convenience.
pub use assemble::{assemble, find_polygon, SegmentSource};
pub use combine::{combine_groups, Router};
pub use emit::{ElementEmitter, ElementKind, StitchElement};
pub use error::{Result, TartanError};
pub use geometry::{LineString, Point, Polygon};
pub use graph::{BoundaryGraphBuilder, EdgeKind, FillGraph, PathEdge, StitchGraphBuilder};
pub use legacy::{optimize_legacy_fill, LegacyFillRenderer};
pub use ring::Ring;
pub use routing_line::{extract_routing_lines, routing_line, RoutingLines};
pub use settings::{Pallet, StitchType, Stripe, TartanSettings};
pub use shapes::{ColorGroup, ColorGroups, Direction, RoutedShape, StripeSet, Stripes};
pub use stack::StackingPolicy;
pub use svg::{outline_from_path_data, outline_from_svg};
pub use tartan::{pattern_dimensions, PatternDimensions, StripeGenerator, StripeRequest, TartanGroup, TartanOrchestrator};
