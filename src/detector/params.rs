//! Parameter types configuring the batch detector.
//!
//! Defaults follow the behaviour of the interactive tooling this engine was
//! built for: a 10 px scoring neighbourhood around the growing tip and a
//! generous but finite cap on resolution rounds.

use serde::{Deserialize, Serialize};

/// Detector-wide parameters controlling seeding, extension and conflict
/// resolution.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SpineParams {
    /// Radius (pixels) around an endpoint within which candidate slabs are
    /// scored during greedy extension.
    pub near_radius_px: f32,
    /// Seeds farther than this from every skeleton edge are skipped.
    /// `None` accepts any distance.
    pub max_seed_dist_px: Option<f32>,
    /// Hard cap on conflict-resolution rounds; exceeding it is reported as
    /// an error instead of looping.
    pub max_resolve_rounds: usize,
}

impl Default for SpineParams {
    fn default() -> Self {
        Self {
            near_radius_px: 10.0,
            max_seed_dist_px: None,
            max_resolve_rounds: 256,
        }
    }
}
