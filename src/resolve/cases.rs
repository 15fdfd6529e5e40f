//! Case classification for a single shared run between two spines.
//!
//! Pure decision logic: from the geometry of an overlap (where each
//! spine's reference point sits relative to the shared run, and how the
//! spines leave the run), produce the mutation plan. Applying the plan is
//! the driver's job, which keeps the branching testable on its own.

use log::debug;

use crate::field::EdgeScorer;
use crate::geometry::Point;
use crate::graph::Graph;
use crate::spine::Spine;

use super::runs::OverlapRun;

/// Index of a spine within the conflicting pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum PairSide {
    First,
    Second,
}

impl PairSide {
    pub fn other(self) -> Self {
        match self {
            PairSide::First => PairSide::Second,
            PairSide::Second => PairSide::First,
        }
    }
}

/// Planned mutation for one conflict round.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Resolution {
    /// Cut both spines at the weakest slab within the given path-index
    /// range of the first spine; each keeps the side of its own reference.
    SplitBoth { lo: usize, hi: usize },
    /// Hand the whole run to `winner` and shorten the other spine past it.
    AssignRun { winner: PairSide },
}

/// Everything the classification needs to look at, read-only.
pub(crate) struct RunView<'a> {
    pub skeleton: &'a Graph,
    pub first: &'a Spine,
    pub second: &'a Spine,
    pub seed_first: Point,
    pub seed_second: Point,
    pub run: &'a OverlapRun,
}

/// Classify one shared run and pick the resolution.
///
/// - Both references on the run: genuinely ambiguous, split at the weakest
///   point between them.
/// - One reference on the run: when the other spine's own branch dead-ends
///   at a skeleton leaf the run belongs to that spine outright; otherwise
///   the weakest-point search is restricted to the stretch between the
///   inside reference and the branch point.
/// - Neither reference on the run: when both spines leave the run at the
///   same boundary, the run goes to the spine whose alternative branch
///   scores weaker; when they leave at opposite boundaries, fall back to
///   splitting the whole run.
pub(crate) fn classify(view: &RunView<'_>, edge_scorer: &dyn EdgeScorer) -> Resolution {
    let run = view.run;

    let Some((first_ref, _)) = view.first.closest_path_edge(view.seed_first) else {
        return Resolution::AssignRun {
            winner: PairSide::Second,
        };
    };
    let Some((second_ref, _)) = view.second.closest_path_edge(view.seed_second) else {
        return Resolution::AssignRun {
            winner: PairSide::First,
        };
    };

    let inside_first = first_ref >= run.lo && first_ref <= run.hi;
    let second_ref_key = view.second.graph().edge_key(view.second.path()[second_ref]);
    let inside_second = run.contains(&second_ref_key);

    match (inside_first, inside_second) {
        (true, true) => {
            let other = view
                .first
                .path_index_of_key(&second_ref_key)
                .unwrap_or(run.lo);
            let (lo, hi) = ordered(first_ref, other);
            debug!("classify: full overlap, split range {lo}..={hi}");
            Resolution::SplitBoth { lo, hi }
        }
        (true, false) => partial_with_reference_inside(view, PairSide::First, first_ref),
        (false, true) => {
            let inside_idx = view
                .first
                .path_index_of_key(&second_ref_key)
                .unwrap_or(run.lo);
            partial_with_reference_inside(view, PairSide::Second, inside_idx)
        }
        (false, false) => references_outside(view, edge_scorer, first_ref, second_ref),
    }
}

/// One reference sits on the run (`inside_idx`, in first-spine indices);
/// the other spine decides between handing the run over and a restricted
/// split.
fn partial_with_reference_inside(
    view: &RunView<'_>,
    inside: PairSide,
    inside_idx: usize,
) -> Resolution {
    let run = view.run;
    let (outside_spine, outside_seed) = match inside {
        PairSide::First => (view.second, view.seed_second),
        PairSide::Second => (view.first, view.seed_first),
    };

    let Some((o_lo, o_hi)) = run_range_in(outside_spine, run) else {
        // The run vanished from the outside spine; nothing to decide.
        return Resolution::AssignRun {
            winner: inside,
        };
    };
    let Some((o_ref, _)) = outside_spine.closest_path_edge(outside_seed) else {
        return Resolution::AssignRun { winner: inside };
    };
    let ref_before = o_ref < o_lo;

    // Walk the outside spine's own branch, away from the run: does it
    // dead-end at a skeleton leaf?
    let far_end = if ref_before {
        crate::spine::SpineEnd::Begin
    } else {
        crate::spine::SpineEnd::End
    };
    let dead_ends = outside_spine
        .endpoint_origin(far_end)
        .map(|origin| view.skeleton.vertex(origin).is_leaf())
        .unwrap_or(false);
    if dead_ends {
        debug!("classify: partial overlap, outside branch dead-ends -> assign");
        return Resolution::AssignRun {
            winner: inside.other(),
        };
    }

    // Branch point: the run boundary the outside spine exits through,
    // mapped into first-spine indices.
    let exit_pos = if ref_before { o_lo } else { o_hi };
    let exit_key = outside_spine
        .graph()
        .edge_key(outside_spine.path()[exit_pos]);
    let boundary = view.first.path_index_of_key(&exit_key).unwrap_or(run.lo);
    let (lo, hi) = ordered(inside_idx, boundary);
    debug!("classify: partial overlap, restricted split range {lo}..={hi}");
    Resolution::SplitBoth { lo, hi }
}

/// Neither reference sits on the run: compare the directions in which the
/// two spines leave it.
fn references_outside(
    view: &RunView<'_>,
    edge_scorer: &dyn EdgeScorer,
    first_ref: usize,
    second_ref: usize,
) -> Resolution {
    let run = view.run;

    let Some((o_lo, o_hi)) = run_range_in(view.second, run) else {
        return Resolution::AssignRun {
            winner: PairSide::First,
        };
    };

    let first_exits_lo = first_ref < run.lo;
    let second_before = second_ref < o_lo;

    // The spines walk off toward their references through one boundary
    // vertex each; sharing that vertex means they leave the run in a
    // common direction.
    let first_boundary = view
        .first
        .path_vertex(if first_exits_lo { run.lo } else { run.hi + 1 })
        .map(|v| view.first.graph().vertex(v).key());
    let second_boundary = view
        .second
        .path_vertex(if second_before { o_lo } else { o_hi + 1 })
        .map(|v| view.second.graph().vertex(v).key());

    if first_boundary.is_none() || first_boundary != second_boundary {
        debug!("classify: references outside, opposite direction -> split run");
        return Resolution::SplitBoth {
            lo: run.lo,
            hi: run.hi,
        };
    }

    // Common direction: both spines diverge from the same boundary vertex.
    // The run goes to whichever spine's alternative branch is weaker.
    let first_alt = if first_exits_lo {
        run.lo.checked_sub(1)
    } else {
        (run.hi + 1 < view.first.len()).then_some(run.hi + 1)
    };
    let second_alt = if second_before {
        o_lo.checked_sub(1)
    } else {
        (o_hi + 1 < view.second.len()).then_some(o_hi + 1)
    };
    let (Some(first_alt), Some(second_alt)) = (first_alt, second_alt) else {
        debug!("classify: missing alternative branch -> split run");
        return Resolution::SplitBoth {
            lo: run.lo,
            hi: run.hi,
        };
    };

    let first_from = view
        .first
        .path_vertex(if first_exits_lo { run.lo } else { run.hi + 1 });
    let second_from = view
        .second
        .path_vertex(if second_before { o_lo } else { o_hi + 1 });
    let (Some(first_from), Some(second_from)) = (first_from, second_from) else {
        return Resolution::SplitBoth {
            lo: run.lo,
            hi: run.hi,
        };
    };

    let first_score =
        edge_scorer.score(view.first.graph(), view.first.path()[first_alt], first_from);
    let second_score = edge_scorer.score(
        view.second.graph(),
        view.second.path()[second_alt],
        second_from,
    );
    let winner = if first_score <= second_score {
        PairSide::First
    } else {
        PairSide::Second
    };
    debug!(
        "classify: common direction, alt scores {first_score:.3}/{second_score:.3} -> assign to {winner:?}"
    );
    Resolution::AssignRun { winner }
}

/// Positions (min, max) of the run's edges within `spine`'s path.
pub(crate) fn run_range_in(spine: &Spine, run: &OverlapRun) -> Option<(usize, usize)> {
    let positions: Vec<usize> = run
        .keys
        .iter()
        .filter_map(|k| spine.path_index_of_key(k))
        .collect();
    let lo = *positions.iter().min()?;
    let hi = *positions.iter().max()?;
    Some((lo, hi))
}

fn ordered(a: usize, b: usize) -> (usize, usize) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}
