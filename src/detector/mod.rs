//! Batch spine detection: seed → extend → resolve.
//!
//! Overview
//! - Seeds one spine per query point at the skeleton edge closest to it;
//!   seeds with no edge in reach are reported back, not failed on.
//! - Extends every spine greedily from both ends, guided by the scalar
//!   field. This stage only reads the skeleton, so the per-seed work runs
//!   data-parallel; results stay in seed order.
//! - Resolves pairwise overlaps sequentially until the batch is disjoint;
//!   graph surgery is deliberately single-threaded.
//!
//! Modules
//! - [`params`] – configuration types used by the detector and the demo
//!   tooling.
//! - [`report`] – serializable per-run results.

pub mod params;
pub mod report;

pub use params::SpineParams;
pub use report::{DetectionReport, SpineTrace};

use std::time::Instant;

use log::debug;
use rayon::prelude::*;

use crate::error::SpineError;
use crate::field::{FieldPointScorer, NearbyMinScorer, ScalarField};
use crate::geometry::Point;
use crate::graph::Graph;
use crate::resolve::{OverlapResolver, TrackedSpine};
use crate::spine::Spine;

/// Batch detector tying the pipeline together.
#[derive(Clone, Debug, Default)]
pub struct SpineDetector {
    params: SpineParams,
}

impl SpineDetector {
    pub fn new(params: SpineParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &SpineParams {
        &self.params
    }

    /// Extract one disjoint spine per seed.
    ///
    /// The skeleton is mutated when conflict resolution has to split edges
    /// mid-slab; callers that need the pristine graph should hand in a
    /// clone.
    pub fn detect<F>(
        &self,
        skeleton: &mut Graph,
        field: &F,
        seeds: &[Point],
    ) -> Result<DetectionReport, SpineError>
    where
        F: ScalarField + Sync,
    {
        let t0 = Instant::now();
        let edge_scorer = NearbyMinScorer::new(field, self.params.near_radius_px);

        let frozen: &Graph = skeleton;
        let seeded: Vec<(Point, Option<Spine>)> = seeds
            .par_iter()
            .map(|&seed| (seed, self.build_spine(frozen, &edge_scorer, seed)))
            .collect();

        let mut spines = Vec::new();
        let mut skipped = Vec::new();
        for (seed, spine) in seeded {
            match spine {
                Some(spine) => spines.push(TrackedSpine { seed, spine }),
                None => {
                    debug!("detect: no skeleton edge near seed {seed}");
                    skipped.push(seed);
                }
            }
        }

        let point_scorer = FieldPointScorer::new(field);
        OverlapResolver::new(
            skeleton,
            &edge_scorer,
            &point_scorer,
            self.params.max_resolve_rounds,
        )
        .resolve(&mut spines)?;

        Ok(DetectionReport {
            spines,
            skipped_seeds: skipped,
            latency_ms: t0.elapsed().as_secs_f64() * 1e3,
        })
    }

    fn build_spine<F: ScalarField>(
        &self,
        skeleton: &Graph,
        scorer: &NearbyMinScorer<'_, F>,
        seed: Point,
    ) -> Option<Spine> {
        let hit = skeleton.closest_edge(seed)?;
        if let Some(max) = self.params.max_seed_dist_px {
            if hit.distance > max {
                debug!(
                    "detect: seed {seed} is {:.1} px out ({max:.1} allowed)",
                    hit.distance
                );
                return None;
            }
        }
        let mut spine = Spine::seeded(skeleton, hit.edge);
        spine.extend(skeleton, scorer);
        Some(spine)
    }
}
