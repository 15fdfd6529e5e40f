//! Conflict resolution: pairwise overlap elimination to a fixed point.
//!
//! Overview
//! - Spines grown from independent seeds can converge onto the same
//!   skeleton branch; this module mutates them in place until no two share
//!   an edge.
//! - Each round picks one maximal shared run between one conflicting pair,
//!   classifies it and applies the resulting plan: either the
//!   run is handed to one spine and the other is shortened past it, or
//!   both spines are cut at the weakest point of the contested stretch.
//! - Mid-edge cuts are applied to the skeleton first and mirrored into
//!   every other spine crossing the split edge, so the whole batch keeps
//!   agreeing on topology.
//! - The fixed point revisits all pairs until nothing overlaps. Every
//!   round must strictly reduce the pair's shared-edge count and a hard
//!   round cap backs that up, so a logic error surfaces as an error value
//!   instead of a silent endless loop.

mod cases;
mod runs;

use log::{debug, warn};

use crate::error::SpineError;
use crate::field::{EdgeScorer, PointScorer};
use crate::geometry::Point;
use crate::graph::Graph;
use crate::spine::{CutPoint, Spine, SpineEnd};

use cases::{classify, PairSide, Resolution, RunView};
use runs::{locate_runs, select_run, OverlapRun};

use cases::run_range_in;

/// One seed point and the spine grown from it.
#[derive(Clone, Debug)]
pub struct TrackedSpine {
    pub seed: Point,
    pub spine: Spine,
}

/// Removes all pairwise edge overlaps from a batch of spines.
pub struct OverlapResolver<'a, E, P> {
    skeleton: &'a mut Graph,
    edge_scorer: &'a E,
    point_scorer: &'a P,
    max_rounds: usize,
}

impl<'a, E: EdgeScorer, P: PointScorer> OverlapResolver<'a, E, P> {
    pub fn new(
        skeleton: &'a mut Graph,
        edge_scorer: &'a E,
        point_scorer: &'a P,
        max_rounds: usize,
    ) -> Self {
        Self {
            skeleton,
            edge_scorer,
            point_scorer,
            max_rounds,
        }
    }

    /// Run the fixed point: afterwards no two spines share an edge.
    ///
    /// Resolving one pair can create or remove overlaps elsewhere, so all
    /// pairs are revisited until a full pass stays clean.
    pub fn resolve(&mut self, spines: &mut [TrackedSpine]) -> Result<(), SpineError> {
        let mut rounds = 0usize;
        loop {
            let mut dirty = false;
            for i in 0..spines.len() {
                for j in i + 1..spines.len() {
                    while spines[i].spine.overlaps(&spines[j].spine) {
                        rounds += 1;
                        if rounds > self.max_rounds {
                            return Err(SpineError::RoundLimitExceeded {
                                rounds: self.max_rounds,
                            });
                        }
                        dirty = true;

                        let before = spines[i].spine.shared_edge_keys(&spines[j].spine).len();
                        self.resolve_pair_once(spines, i, j)?;
                        let after = spines[i].spine.shared_edge_keys(&spines[j].spine).len();
                        if after >= before {
                            return Err(SpineError::NoProgress {
                                first: i,
                                second: j,
                                shared: after,
                            });
                        }
                    }
                }
            }
            if !dirty {
                break;
            }
        }
        Ok(())
    }

    /// Resolve a single conflict round between the pair `(i, j)`, which
    /// must currently overlap. One call removes at least one shared edge.
    pub fn resolve_pair_once(
        &mut self,
        spines: &mut [TrackedSpine],
        i: usize,
        j: usize,
    ) -> Result<(), SpineError> {
        let shared = spines[i].spine.shared_edge_keys(&spines[j].spine);
        if shared.is_empty() {
            return Err(SpineError::NoSharedEdges {
                first: i,
                second: j,
            });
        }
        let runs = locate_runs(&spines[i].spine, &shared);
        let Some(run) = select_run(self.skeleton, &spines[i].spine, runs) else {
            return Err(SpineError::NoSharedEdges {
                first: i,
                second: j,
            });
        };

        let resolution = classify(
            &RunView {
                skeleton: &*self.skeleton,
                first: &spines[i].spine,
                second: &spines[j].spine,
                seed_first: spines[i].seed,
                seed_second: spines[j].seed,
                run: &run,
            },
            self.edge_scorer,
        );
        debug!(
            "resolve: pair ({i}, {j}), run {}..={} of {} edges -> {resolution:?}",
            run.lo,
            run.hi,
            run.edge_count()
        );

        match resolution {
            Resolution::AssignRun { winner } => {
                let loser = match winner {
                    PairSide::First => j,
                    PairSide::Second => i,
                };
                let seed = spines[loser].seed;
                shorten_past_run(&mut spines[loser].spine, seed, &run)
            }
            Resolution::SplitBoth { lo, hi } => self.split_both(spines, i, j, lo, hi, &run),
        }
    }

    /// Cut both conflicting spines at the weakest slab of the contested
    /// stretch, keeping each spine's reference side, and keep every other
    /// spine consistent with the mutated skeleton.
    fn split_both(
        &mut self,
        spines: &mut [TrackedSpine],
        i: usize,
        j: usize,
        lo: usize,
        hi: usize,
        run: &OverlapRun,
    ) -> Result<(), SpineError> {
        let cut = {
            let first = &spines[i].spine;
            match first.weakest_slab(lo, hi, self.point_scorer) {
                Some((pi, si, slab)) => {
                    let mut forbidden = first.endpoint_keys();
                    forbidden.extend(spines[j].spine.endpoint_keys());
                    crate::spine::split::decide_cut(first, pi, si, slab, &forbidden)
                }
                None => {
                    // Nothing to score on the contested stretch; fall back
                    // to handing the run to the spine with less material
                    // outside it.
                    warn!("resolve: slab-less split range, assigning run by arm length");
                    return assign_shorter_arms(spines, i, j, run);
                }
            }
        };

        let mid = match &cut {
            CutPoint::MidSlab {
                edge, slab_index, ..
            } => {
                let mid = match self.skeleton.edge_by_key(edge) {
                    Some(id) => {
                        let (mid, _, _) = self.skeleton.split_edge(id, *slab_index, None);
                        Some(mid)
                    }
                    None => {
                        warn!("resolve: cut edge {edge} is no longer in the skeleton");
                        None
                    }
                };
                for (idx, tracked) in spines.iter_mut().enumerate() {
                    if idx != i && idx != j {
                        tracked.spine.apply_edge_split(edge, *slab_index, mid);
                    }
                }
                mid
            }
            CutPoint::AtVertex { .. } => None,
        };

        let kept_i = keep_reference_side(&spines[i].spine, spines[i].seed, &cut, mid)?;
        spines[i].spine = kept_i;
        let kept_j = keep_reference_side(&spines[j].spine, spines[j].seed, &cut, mid)?;
        spines[j].spine = kept_j;
        Ok(())
    }
}

/// Split `spine` at `cut` and keep the side its reference point sits on.
fn keep_reference_side(
    spine: &Spine,
    seed: Point,
    cut: &CutPoint,
    mid_origin: Option<crate::graph::VertexId>,
) -> Result<Spine, SpineError> {
    let (before, after) = spine.split_at(cut, mid_origin)?;
    Ok(if before.distance_to(seed) <= after.distance_to(seed) {
        before
    } else {
        after
    })
}

/// Remove every run edge from `spine` by shortening from the end the run
/// is reached from first, keeping the reference side intact when the
/// reference lies outside the run.
fn shorten_past_run(spine: &mut Spine, seed: Point, run: &OverlapRun) -> Result<(), SpineError> {
    let Some((lo, hi)) = run_range_in(spine, run) else {
        return Ok(());
    };
    let end = match spine.closest_path_edge(seed) {
        Some((ref_idx, _)) if ref_idx > hi => SpineEnd::Begin,
        Some((ref_idx, _)) if ref_idx < lo => SpineEnd::End,
        _ => {
            if lo <= spine.len() - 1 - hi {
                SpineEnd::Begin
            } else {
                SpineEnd::End
            }
        }
    };

    while run.keys.iter().any(|k| spine.path_index_of_key(k).is_some()) {
        let Some(endpoint) = spine.endpoint(end) else {
            break;
        };
        if spine.shorten_from(endpoint)?.is_none() {
            break;
        }
    }
    Ok(())
}

/// Degenerate fallback: the run goes to the spine whose arms outside the
/// run are shorter; the other spine is shortened past it.
fn assign_shorter_arms(
    spines: &mut [TrackedSpine],
    i: usize,
    j: usize,
    run: &OverlapRun,
) -> Result<(), SpineError> {
    let outside_length = |s: &Spine| -> f32 {
        s.path()
            .iter()
            .filter(|&&e| !run.contains(&s.graph().edge_key(e)))
            .map(|&e| s.graph().edge_length(e))
            .sum()
    };
    let loser = if outside_length(&spines[i].spine) <= outside_length(&spines[j].spine) {
        j
    } else {
        i
    };
    let seed = spines[loser].seed;
    shorten_past_run(&mut spines[loser].spine, seed, run)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{EdgeId, VertexId};
    use std::collections::BTreeSet;

    const FLAT_EDGES: fn(&Graph, EdgeId, VertexId) -> f32 = |_, _, _| 1.0;
    const FLAT_POINTS: fn(Point) -> f32 = |_| 1.0;

    fn vertex(g: &mut Graph, x: i32, y: i32) -> VertexId {
        g.add_vertex(BTreeSet::from([Point::new(x, y)]), None)
    }

    fn edge(g: &mut Graph, a: VertexId, b: VertexId) -> EdgeId {
        let pa = g.vertex(a).representative();
        let pb = g.vertex(b).representative();
        let mut slabs = Vec::new();
        let (mut x, mut y) = (pa.x, pa.y);
        loop {
            x += (pb.x - x).signum();
            y += (pb.y - y).signum();
            if x == pb.x && y == pb.y {
                break;
            }
            slabs.push(Point::new(x, y));
        }
        g.add_edge(a, b, slabs)
    }

    #[test]
    fn full_overlap_splits_at_the_weak_slab() {
        let mut g = Graph::new();
        let a = vertex(&mut g, 0, 0);
        let b = vertex(&mut g, 40, 0);
        let e = edge(&mut g, a, b);

        let mut spines = vec![
            TrackedSpine {
                seed: Point::new(10, 0),
                spine: Spine::seeded(&g, e),
            },
            TrackedSpine {
                seed: Point::new(30, 0),
                spine: Spine::seeded(&g, e),
            },
        ];
        assert!(spines[0].spine.overlaps(&spines[1].spine));

        let weak = |p: Point| -> f32 {
            if p == Point::new(20, 0) {
                0.1
            } else {
                1.0
            }
        };
        let mut resolver = OverlapResolver::new(&mut g, &FLAT_EDGES, &weak, 16);
        resolver
            .resolve(&mut spines)
            .expect("single conflict resolves");

        assert!(!spines[0].spine.overlaps(&spines[1].spine));
        assert!(spines[0].spine.distance_to(Point::new(10, 0)) < 1.0);
        assert!(spines[1].spine.distance_to(Point::new(30, 0)) < 1.0);
        // The skeleton was split at the cut pixel.
        assert_eq!(g.edge_count(), 2);
    }

    #[test]
    fn dead_end_branch_takes_the_run() {
        let mut g = Graph::new();
        let a = vertex(&mut g, 0, 0);
        let b = vertex(&mut g, 30, 0);
        let c = vertex(&mut g, 60, 0);
        let spur = vertex(&mut g, 30, 30);
        let ab = edge(&mut g, a, b);
        let bc = edge(&mut g, b, c);
        let spur_edge = edge(&mut g, spur, b);

        // First spine runs a-b-c with its reference on b-c; the second
        // comes down the spur and shares b-c, with its reference on the
        // spur, whose far end is a skeleton leaf.
        let mut first = Spine::seeded(&g, ab);
        first.add_edge(&g, bc).expect("chain grows");
        let mut second = Spine::seeded(&g, spur_edge);
        second.add_edge(&g, bc).expect("spur joins the chain");

        let mut spines = vec![
            TrackedSpine {
                seed: Point::new(45, 0),
                spine: first,
            },
            TrackedSpine {
                seed: Point::new(30, 20),
                spine: second,
            },
        ];

        let mut resolver = OverlapResolver::new(&mut g, &FLAT_EDGES, &FLAT_POINTS, 16);
        resolver.resolve(&mut spines).expect("conflict resolves");

        assert!(!spines[0].spine.overlaps(&spines[1].spine));
        // The spur spine dead-ends, so it keeps the contested stretch and
        // the chain spine is cut back to the branch point.
        assert_eq!(spines[1].spine.len(), 2);
        assert_eq!(spines[0].spine.len(), 1);
    }

    #[test]
    fn common_direction_assigns_by_weaker_alternative() {
        let mut g = Graph::new();
        let center = vertex(&mut g, 0, 0);
        let arm1 = [vertex(&mut g, -20, 0), vertex(&mut g, -40, 0)];
        let arm2 = [vertex(&mut g, 0, 20), vertex(&mut g, 0, 40)];
        let arm3 = [vertex(&mut g, 20, 0), vertex(&mut g, 40, 0)];

        let a1 = [edge(&mut g, center, arm1[0]), edge(&mut g, arm1[0], arm1[1])];
        let a2 = [edge(&mut g, center, arm2[0]), edge(&mut g, arm2[0], arm2[1])];
        let a3 = [edge(&mut g, center, arm3[0]), edge(&mut g, arm3[0], arm3[1])];

        let mut first = Spine::seeded(&g, a1[1]);
        first.add_edge(&g, a1[0]).expect("arm grows");
        first.add_edge(&g, a3[0]).expect("through the branch");
        first.add_edge(&g, a3[1]).expect("to the leaf");

        let mut second = Spine::seeded(&g, a2[1]);
        second.add_edge(&g, a2[0]).expect("arm grows");
        second.add_edge(&g, a3[0]).expect("through the branch");
        second.add_edge(&g, a3[1]).expect("to the leaf");

        let mut spines = vec![
            TrackedSpine {
                seed: Point::new(-35, 0),
                spine: first,
            },
            TrackedSpine {
                seed: Point::new(0, 35),
                spine: second,
            },
        ];

        let mut resolver = OverlapResolver::new(&mut g, &FLAT_EDGES, &FLAT_POINTS, 16);
        resolver.resolve(&mut spines).expect("conflict resolves");

        assert!(!spines[0].spine.overlaps(&spines[1].spine));
        // Equal alternative scores: the first spine keeps the contested
        // arm, the second is shortened back to its own arm.
        assert_eq!(spines[0].spine.len(), 4);
        assert_eq!(spines[1].spine.len(), 2);
    }

    #[test]
    fn disjoint_spines_are_rejected_as_no_conflict() {
        let mut g = Graph::new();
        let a = vertex(&mut g, 0, 0);
        let b = vertex(&mut g, 20, 0);
        let c = vertex(&mut g, 40, 0);
        let ab = edge(&mut g, a, b);
        let bc = edge(&mut g, b, c);

        let mut spines = vec![
            TrackedSpine {
                seed: Point::new(5, 0),
                spine: Spine::seeded(&g, ab),
            },
            TrackedSpine {
                seed: Point::new(35, 0),
                spine: Spine::seeded(&g, bc),
            },
        ];

        let mut resolver = OverlapResolver::new(&mut g, &FLAT_EDGES, &FLAT_POINTS, 16);
        assert!(matches!(
            resolver.resolve_pair_once(&mut spines, 0, 1),
            Err(SpineError::NoSharedEdges { .. })
        ));
        // The batch as a whole is already clean.
        resolver.resolve(&mut spines).expect("nothing to do");
    }
}
