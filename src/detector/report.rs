//! Serializable results of a detection run.

use serde::Serialize;

use crate::geometry::Point;
use crate::resolve::TrackedSpine;
use crate::spine::Spine;

/// One resolved centerline, exported as its raw polyline.
#[derive(Clone, Debug, Serialize)]
pub struct SpineTrace {
    pub seed: Point,
    pub begin: Point,
    pub end: Point,
    /// Raw ordered pixel sequence; polyline reduction is downstream work.
    pub polyline: Vec<Point>,
    pub arc_length: f32,
}

impl SpineTrace {
    /// `None` for spines emptied by conflict resolution.
    pub fn from_spine(seed: Point, spine: &Spine) -> Option<Self> {
        let begin = spine.begin()?;
        let end = spine.end()?;
        Some(Self {
            seed,
            begin,
            end,
            polyline: spine.to_polyline(),
            arc_length: spine.arc_length(),
        })
    }
}

/// Outcome of a batch detection run.
#[derive(Debug, Default)]
pub struct DetectionReport {
    /// Pairwise disjoint spines, in seed order.
    pub spines: Vec<TrackedSpine>,
    /// Seeds with no skeleton edge in reach.
    pub skipped_seeds: Vec<Point>,
    /// Wall-clock time spent in the run.
    pub latency_ms: f64,
}

impl DetectionReport {
    /// Exportable traces of the non-empty spines, in seed order.
    pub fn traces(&self) -> Vec<SpineTrace> {
        self.spines
            .iter()
            .filter_map(|t| SpineTrace::from_spine(t.seed, &t.spine))
            .collect()
    }
}
