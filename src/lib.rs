#![doc = include_str!("../README.md")]

// Public modules (stable-ish surface)
pub mod config;
pub mod detector;
pub mod error;
pub mod field;
pub mod geometry;
pub mod graph;
pub mod skeleton;

// “Expert” modules – still public, but considered unstable internals.
pub mod resolve;
pub mod spine;

// --- High-level re-exports -------------------------------------------------

// Main entry points: detector + results.
pub use crate::detector::{DetectionReport, SpineDetector, SpineParams, SpineTrace};
pub use crate::error::SpineError;

// Core data model.
pub use crate::field::{ImageField, ScalarField};
pub use crate::geometry::Point;
pub use crate::graph::Graph;
pub use crate::skeleton::{find_spine, RawSkeleton};
pub use crate::spine::Spine;

// --- Prelude ---------------------------------------------------------------

/// Small prelude for quick experiments.
///
/// ```no_run
/// use spine_detector::prelude::*;
///
/// # fn main() {
/// let mut skeleton = Graph::new();
/// let field = ImageField::from_vec(4, 4, vec![0.5; 16]);
/// let detector = SpineDetector::new(SpineParams::default());
/// let report = detector
///     .detect(&mut skeleton, &field, &[Point::new(1, 1)])
///     .expect("empty batch resolves trivially");
/// assert!(report.spines.is_empty());
/// # }
/// ```
pub mod prelude {
    pub use crate::field::ImageField;
    pub use crate::geometry::Point;
    pub use crate::skeleton::RawSkeleton;
    pub use crate::{Graph, SpineDetector, SpineParams};
}
