//! Greedy score-driven spine extension.

use log::{debug, warn};

use crate::field::EdgeScorer;
use crate::graph::{EdgeId, Graph, VertexId};

use super::path::{Spine, SpineEnd};

impl Spine {
    /// Extend both endpoints until no valid candidate remains.
    ///
    /// At every step each skeleton branch of the endpoint's originating
    /// vertex is considered, unless it is already part of the spine or its
    /// far vertex is (which would close a cycle or branch the path). The
    /// strictly best-scoring candidate is appended; ties keep the first
    /// candidate in branch registration order, and non-finite scores never
    /// win. Extension at an end stops for good at a skeleton leaf.
    ///
    /// With a fixed skeleton and scorer the outcome is deterministic:
    /// repeated runs from the same seed produce the same edge sequence.
    pub fn extend<S: EdgeScorer>(&mut self, skeleton: &Graph, scorer: &S) {
        self.extend_end(skeleton, scorer, SpineEnd::Begin);
        self.extend_end(skeleton, scorer, SpineEnd::End);
    }

    fn extend_end<S: EdgeScorer>(&mut self, skeleton: &Graph, scorer: &S, end: SpineEnd) {
        loop {
            let Some(origin) = self.endpoint_origin(end) else {
                break;
            };
            if skeleton.vertex(origin).is_leaf() {
                break;
            }
            let Some(best) = self.best_candidate(skeleton, scorer, origin) else {
                debug!(
                    "extend: no candidate left at {}",
                    skeleton.vertex(origin).key()
                );
                break;
            };
            if let Err(err) = self.add_edge(skeleton, best) {
                // The validity check above should have caught this.
                warn!("extend: candidate rejected late: {err}");
                break;
            }
        }
    }

    fn best_candidate<S: EdgeScorer>(
        &self,
        skeleton: &Graph,
        scorer: &S,
        from: VertexId,
    ) -> Option<EdgeId> {
        let mut best: Option<(EdgeId, f32)> = None;
        for &branch in skeleton.vertex(from).branches() {
            if !self.is_valid_candidate(skeleton, branch, from) {
                continue;
            }
            let score = scorer.score(skeleton, branch, from);
            if !score.is_finite() {
                continue;
            }
            if best.map_or(true, |(_, b)| score > b) {
                best = Some((branch, score));
            }
        }
        best.map(|(edge, _)| edge)
    }

    /// A branch continues the path when it is not already on it and brings
    /// in exactly one new vertex.
    fn is_valid_candidate(&self, skeleton: &Graph, edge: EdgeId, from: VertexId) -> bool {
        let key = skeleton.edge_key(edge);
        if self.path_index_of_key(&key).is_some() {
            return false;
        }
        let Some(far) = skeleton.edge(edge).opposite(from) else {
            return false;
        };
        self.graph()
            .vertex_by_key(&skeleton.vertex(far).key())
            .is_none()
    }
}
