//! Read-only step iterator over a spine's internal path.

use crate::graph::{EdgeId, VertexId};

use super::path::{Spine, SpineEnd};

/// One traversal step: the edge walked and the vertices it connects, in
/// walking order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WalkStep {
    pub from: VertexId,
    pub to: VertexId,
    pub edge: EdgeId,
}

/// Cursor yielding successive steps from a start vertex through its entry
/// edge, taking the opposite branch at every interior vertex.
///
/// Iteration stops after reaching the stop vertex (when given) or at a leaf
/// of the spine's own sub-graph. The walker never mutates the spine; it is
/// the primitive under path measurement, polyline export and overlap
/// bookkeeping.
pub struct SpineWalker<'a> {
    spine: &'a Spine,
    cursor: Option<(VertexId, EdgeId)>,
    stop: Option<VertexId>,
}

impl<'a> SpineWalker<'a> {
    pub fn new(spine: &'a Spine, start: VertexId, entry: EdgeId, stop: Option<VertexId>) -> Self {
        Self {
            spine,
            cursor: Some((start, entry)),
            stop,
        }
    }

    /// Walk the whole path starting at the given endpoint.
    pub fn from_end(spine: &'a Spine, end: SpineEnd) -> Option<Self> {
        let start = spine.endpoint(end)?;
        let entry = match end {
            SpineEnd::Begin => *spine.path().first()?,
            SpineEnd::End => *spine.path().last()?,
        };
        Some(Self::new(spine, start, entry, None))
    }
}

impl Iterator for SpineWalker<'_> {
    type Item = WalkStep;

    fn next(&mut self) -> Option<WalkStep> {
        let (from, edge) = self.cursor.take()?;
        let to = self.spine.graph().edge(edge).opposite(from)?;
        if Some(to) != self.stop {
            if let Some(next_edge) = self.spine.graph().vertex(to).opposite_branch(edge) {
                self.cursor = Some((to, next_edge));
            }
        }
        Some(WalkStep { from, to, edge })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;
    use crate::graph::Graph;
    use std::collections::BTreeSet;

    fn three_edge_spine() -> Spine {
        let mut g = Graph::new();
        let vs: Vec<VertexId> = [0, 10, 20, 30]
            .iter()
            .map(|&x| g.add_vertex(BTreeSet::from([Point::new(x, 0)]), None))
            .collect();
        let mut edges = Vec::new();
        for w in vs.windows(2) {
            let ax = g.vertex(w[0]).representative().x;
            let slabs = (ax + 1..ax + 10).map(|x| Point::new(x, 0)).collect();
            edges.push(g.add_edge(w[0], w[1], slabs));
        }
        let mut spine = Spine::seeded(&g, edges[0]);
        spine.add_edge(&g, edges[1]).expect("valid growth");
        spine.add_edge(&g, edges[2]).expect("valid growth");
        spine
    }

    #[test]
    fn walks_the_full_path_from_either_end() {
        let spine = three_edge_spine();

        let forward: Vec<WalkStep> = SpineWalker::from_end(&spine, SpineEnd::Begin)
            .expect("non-empty spine")
            .collect();
        assert_eq!(forward.len(), 3);
        assert_eq!(forward[0].from, spine.endpoint(SpineEnd::Begin).unwrap());
        assert_eq!(
            forward[2].to,
            spine.endpoint(SpineEnd::End).expect("non-empty")
        );
        // Steps chain: each step starts where the previous one ended.
        assert_eq!(forward[0].to, forward[1].from);
        assert_eq!(forward[1].to, forward[2].from);

        let backward: Vec<WalkStep> = SpineWalker::from_end(&spine, SpineEnd::End)
            .expect("non-empty spine")
            .collect();
        assert_eq!(backward.len(), 3);
        assert_eq!(
            backward[2].to,
            spine.endpoint(SpineEnd::Begin).expect("non-empty")
        );
    }

    #[test]
    fn stops_at_the_stop_vertex() {
        let spine = three_edge_spine();
        let begin = spine.endpoint(SpineEnd::Begin).expect("non-empty");
        let stop = spine.path_vertex(2).expect("interior vertex");

        let steps: Vec<WalkStep> =
            SpineWalker::new(&spine, begin, spine.path()[0], Some(stop)).collect();
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[1].to, stop);
    }
}
