//! Location and selection of shared-edge runs between two spines.

use std::cmp::Reverse;
use std::collections::BTreeSet;

use crate::graph::{EdgeKey, Graph};
use crate::spine::Spine;

/// A maximal contiguous stretch of shared edges, indexed along the first
/// spine's path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct OverlapRun {
    /// First path index of the run in the first spine, inclusive.
    pub lo: usize,
    /// Last path index of the run in the first spine, inclusive.
    pub hi: usize,
    /// Identity keys of the run's edges, in the first spine's path order.
    pub keys: Vec<EdgeKey>,
}

impl OverlapRun {
    pub fn edge_count(&self) -> usize {
        self.hi - self.lo + 1
    }

    pub fn contains(&self, key: &EdgeKey) -> bool {
        self.keys.iter().any(|k| k == key)
    }
}

/// All maximal shared runs along the first spine's path.
pub(crate) fn locate_runs(first: &Spine, shared: &BTreeSet<EdgeKey>) -> Vec<OverlapRun> {
    let keys = first.edge_keys();
    let mut runs = Vec::new();
    let mut open: Option<(usize, Vec<EdgeKey>)> = None;

    for (i, key) in keys.iter().enumerate() {
        if shared.contains(key) {
            match &mut open {
                Some((_, ks)) => ks.push(key.clone()),
                None => open = Some((i, vec![key.clone()])),
            }
        } else if let Some((lo, ks)) = open.take() {
            runs.push(OverlapRun {
                lo,
                hi: i - 1,
                keys: ks,
            });
        }
    }
    if let Some((lo, ks)) = open.take() {
        runs.push(OverlapRun {
            lo,
            hi: keys.len() - 1,
            keys: ks,
        });
    }
    runs
}

/// Pick the run to resolve next: prefer runs with a boundary on a true
/// skeleton leaf, then the longest, then the earliest along the path.
pub(crate) fn select_run(
    skeleton: &Graph,
    first: &Spine,
    runs: Vec<OverlapRun>,
) -> Option<OverlapRun> {
    runs.into_iter().max_by_key(|run| {
        (
            run_touches_leaf(skeleton, first, run),
            run.edge_count(),
            Reverse(run.lo),
        )
    })
}

fn run_touches_leaf(skeleton: &Graph, first: &Spine, run: &OverlapRun) -> bool {
    [run.lo, run.hi + 1].iter().any(|&pos| {
        first
            .path_vertex(pos)
            .and_then(|v| first.graph().vertex(v).origin)
            .map(|origin| skeleton.vertex(origin).is_leaf())
            .unwrap_or(false)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;
    use crate::graph::VertexId;
    use std::collections::BTreeSet as Set;

    /// Chain of six edges along x, plus a detour between the third and
    /// fourth chain vertices so a second spine can diverge mid-way.
    fn ladder() -> (Graph, Vec<crate::graph::EdgeId>, VertexId) {
        let mut g = Graph::new();
        let vs: Vec<VertexId> = (0..=6)
            .map(|i| g.add_vertex(Set::from([Point::new(i * 10, 0)]), None))
            .collect();
        let mut edges = Vec::new();
        for w in vs.windows(2) {
            let ax = g.vertex(w[0]).representative().x;
            edges.push(g.add_edge(
                w[0],
                w[1],
                (ax + 1..ax + 10).map(|x| Point::new(x, 0)).collect(),
            ));
        }
        let detour = g.add_vertex(Set::from([Point::new(25, 10)]), None);
        edges.push(g.add_edge(vs[2], detour, vec![Point::new(22, 5)]));
        edges.push(g.add_edge(detour, vs[3], vec![Point::new(28, 5)]));
        (g, edges, vs[0])
    }

    #[test]
    fn finds_disjoint_runs() {
        let (g, edges, _) = ladder();
        let mut first = Spine::seeded(&g, edges[0]);
        for &e in &edges[1..6] {
            first.add_edge(&g, e).expect("chain grows");
        }
        // Second spine follows the chain but takes the detour in the
        // middle, sharing [0..2] and [3..6) with the first.
        let mut second = Spine::seeded(&g, edges[0]);
        second.add_edge(&g, edges[1]).expect("chain grows");
        second.add_edge(&g, edges[6]).expect("detour up");
        second.add_edge(&g, edges[7]).expect("detour down");
        second.add_edge(&g, edges[3]).expect("chain resumes");
        second.add_edge(&g, edges[4]).expect("chain resumes");

        let shared = first.shared_edge_keys(&second);
        assert_eq!(shared.len(), 4);

        let runs = locate_runs(&first, &shared);
        assert_eq!(runs.len(), 2);
        assert_eq!((runs[0].lo, runs[0].hi), (0, 1));
        assert_eq!((runs[1].lo, runs[1].hi), (3, 4));

        // The first run touches the skeleton leaf at x = 0 and wins even
        // though both runs are the same length.
        let selected = select_run(&g, &first, runs).expect("runs exist");
        assert_eq!((selected.lo, selected.hi), (0, 1));
    }

    #[test]
    fn longer_run_wins_without_leaf_contact() {
        let (g, edges, _) = ladder();
        let mut first = Spine::seeded(&g, edges[1]);
        for &e in &edges[2..6] {
            first.add_edge(&g, e).expect("chain grows");
        }
        let mut second = Spine::seeded(&g, edges[1]);
        second.add_edge(&g, edges[6]).expect("detour");
        second.add_edge(&g, edges[7]).expect("detour");
        second.add_edge(&g, edges[3]).expect("chain resumes");
        second.add_edge(&g, edges[4]).expect("chain resumes");

        let shared = first.shared_edge_keys(&second);
        let runs = locate_runs(&first, &shared);
        assert_eq!(runs.len(), 2);

        // Runs: [edges[1]] alone and [edges[3], edges[4]]. The leaf at
        // x = 0 is not part of either spine here, so length decides.
        let selected = select_run(&g, &first, runs).expect("runs exist");
        assert_eq!(selected.edge_count(), 2);
    }
}
