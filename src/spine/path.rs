//! The spine path container: a simple path cloned out of the skeleton,
//! with endpoint bookkeeping and the in-place mutation primitives used by
//! conflict resolution.

use std::collections::BTreeSet;

use log::warn;

use crate::error::SpineError;
use crate::geometry::Point;
use crate::graph::{EdgeId, EdgeKey, Graph, VertexId, VertexKey};

use super::walker::SpineWalker;

/// Identifies one of the two spine endpoints.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpineEnd {
    Begin,
    End,
}

/// How cloned vertices remember the skeleton vertex behind them.
#[derive(Clone, Copy, Debug)]
pub(crate) enum OriginMode {
    /// The source graph is the skeleton itself: the source handle is the
    /// back-reference.
    FromSkeleton,
    /// The source graph is another spine: keep its back-references.
    Carry,
}

/// A simple path through the skeleton.
///
/// The spine owns a private sub-graph cloned edge by edge from the
/// skeleton, the ordered edge list from the begin endpoint to the end
/// endpoint, and the two endpoint handles. Within the private sub-graph
/// every interior vertex has exactly two branches and each endpoint exactly
/// one; no vertex repeats. Cloned vertices carry a back-reference to the
/// skeleton vertex they came from, which is what decides whether an
/// endpoint can still be extended.
#[derive(Clone, Debug, Default)]
pub struct Spine {
    graph: Graph,
    path: Vec<EdgeId>,
    ends: Option<(VertexId, VertexId)>,
}

impl Spine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a spine with one skeleton edge; both endpoints become the
    /// edge's vertices.
    pub fn seeded(skeleton: &Graph, edge: EdgeId) -> Self {
        let mut spine = Self::new();
        spine.seed_with(skeleton, edge, OriginMode::FromSkeleton);
        spine
    }

    pub fn is_empty(&self) -> bool {
        self.ends.is_none()
    }

    /// Number of edges on the path.
    pub fn len(&self) -> usize {
        self.path.len()
    }

    /// The private sub-graph backing the path.
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Path edges from the begin endpoint to the end endpoint.
    pub fn path(&self) -> &[EdgeId] {
        &self.path
    }

    pub fn endpoint(&self, end: SpineEnd) -> Option<VertexId> {
        self.ends.map(|(b, e)| match end {
            SpineEnd::Begin => b,
            SpineEnd::End => e,
        })
    }

    /// Skeleton vertex the given endpoint was cloned from, if any.
    pub fn endpoint_origin(&self, end: SpineEnd) -> Option<VertexId> {
        self.endpoint(end).and_then(|v| self.graph.vertex(v).origin)
    }

    pub(crate) fn endpoint_keys(&self) -> BTreeSet<VertexKey> {
        self.ends
            .map(|(b, e)| {
                BTreeSet::from([self.graph.vertex(b).key(), self.graph.vertex(e).key()])
            })
            .unwrap_or_default()
    }

    /// Representative coordinate of the begin endpoint.
    pub fn begin(&self) -> Option<Point> {
        self.endpoint(SpineEnd::Begin)
            .map(|v| self.graph.vertex(v).representative())
    }

    /// Representative coordinate of the end endpoint.
    pub fn end(&self) -> Option<Point> {
        self.endpoint(SpineEnd::End)
            .map(|v| self.graph.vertex(v).representative())
    }

    /// Swap the endpoint labelling; topology is untouched.
    pub fn reverse(&mut self) {
        if let Some((b, e)) = self.ends {
            self.ends = Some((e, b));
            self.path.reverse();
        }
    }

    /// Append a skeleton edge at whichever endpoint it attaches to.
    ///
    /// Seeds the spine when it is still empty. Otherwise the edge must
    /// touch exactly one current endpoint and its far vertex must be new to
    /// the spine; anything else is rejected without mutating.
    pub fn add_edge(&mut self, skeleton: &Graph, edge: EdgeId) -> Result<(), SpineError> {
        self.attach_edge(skeleton, edge, OriginMode::FromSkeleton)
    }

    fn seed_with(&mut self, source: &Graph, edge: EdgeId, mode: OriginMode) {
        let e = source.edge(edge);
        let (sa, sb) = e.endpoints();
        let va = self.clone_vertex(source, sa, mode);
        let vb = self.clone_vertex(source, sb, mode);
        let id = self.graph.add_edge(va, vb, e.slabs().to_vec());
        self.path.push(id);
        let (v1, v2) = self.graph.edge(id).endpoints();
        self.ends = Some((v1, v2));
        self.debug_check_path();
    }

    pub(crate) fn attach_edge(
        &mut self,
        source: &Graph,
        edge: EdgeId,
        mode: OriginMode,
    ) -> Result<(), SpineError> {
        let (begin, end) = match self.ends {
            None => {
                self.seed_with(source, edge, mode);
                return Ok(());
            }
            Some(ends) => ends,
        };

        let e = source.edge(edge);
        let (sa, sb) = e.endpoints();
        let ka = source.vertex(sa).key();
        let kb = source.vertex(sb).key();
        let begin_key = self.graph.vertex(begin).key();
        let end_key = self.graph.vertex(end).key();

        let (at, near, far) = if ka == begin_key {
            (SpineEnd::Begin, sa, sb)
        } else if kb == begin_key {
            (SpineEnd::Begin, sb, sa)
        } else if ka == end_key {
            (SpineEnd::End, sa, sb)
        } else if kb == end_key {
            (SpineEnd::End, sb, sa)
        } else {
            return Err(SpineError::DetachedEdge {
                edge: source.edge_key(edge).to_string(),
            });
        };

        let far_key = source.vertex(far).key();
        if self.graph.vertex_by_key(&far_key).is_some() {
            return Err(SpineError::CycleEdge {
                edge: source.edge_key(edge).to_string(),
            });
        }

        let near_id = match at {
            SpineEnd::Begin => begin,
            SpineEnd::End => end,
        };
        let far_id = self.clone_vertex(source, far, mode);
        let slabs = e.directed_slabs(near);
        let id = self.graph.add_edge(near_id, far_id, slabs);

        match at {
            SpineEnd::Begin => {
                self.path.insert(0, id);
                self.ends = Some((far_id, end));
            }
            SpineEnd::End => {
                self.path.push(id);
                self.ends = Some((begin, far_id));
            }
        }
        self.debug_check_path();
        Ok(())
    }

    fn clone_vertex(&mut self, source: &Graph, v: VertexId, mode: OriginMode) -> VertexId {
        let sv = source.vertex(v);
        let origin = match mode {
            OriginMode::FromSkeleton => Some(v),
            OriginMode::Carry => sv.origin,
        };
        self.graph.add_vertex(sv.points().clone(), origin)
    }

    /// Rebuild a spine from a consecutive run of edges of `source`
    /// (typically another spine's graph), keeping skeleton back-references.
    pub(crate) fn from_carried_run(source: &Graph, run: &[EdgeId]) -> Result<Self, SpineError> {
        let mut spine = Self::new();
        for &edge in run {
            spine.attach_edge(source, edge, OriginMode::Carry)?;
        }
        Ok(spine)
    }

    /// Vertex at position `index` along the path (0 = begin endpoint,
    /// `len()` = end endpoint).
    pub fn path_vertex(&self, index: usize) -> Option<VertexId> {
        let (begin, _) = self.ends?;
        let mut cur = begin;
        for &edge in self.path.iter().take(index) {
            cur = self.graph.edge(edge).opposite(cur)?;
        }
        Some(cur)
    }

    /// Identity keys of the path edges, in path order.
    pub fn edge_keys(&self) -> Vec<EdgeKey> {
        self.path.iter().map(|&id| self.graph.edge_key(id)).collect()
    }

    /// Position of the edge with identity `key` on the path.
    pub fn path_index_of_key(&self, key: &EdgeKey) -> Option<usize> {
        self.path
            .iter()
            .position(|&id| self.graph.edge_key(id) == *key)
    }

    /// Edge identities present in both spines.
    pub fn shared_edge_keys(&self, other: &Spine) -> BTreeSet<EdgeKey> {
        let mine: BTreeSet<EdgeKey> = self.edge_keys().into_iter().collect();
        other
            .edge_keys()
            .into_iter()
            .filter(|k| mine.contains(k))
            .collect()
    }

    /// True iff the two spines share at least one edge (by endpoint
    /// point-set identity, not arena identity).
    pub fn overlaps(&self, other: &Spine) -> bool {
        !self.shared_edge_keys(other).is_empty()
    }

    /// Path index and distance of the edge closest to `p`.
    pub fn closest_path_edge(&self, p: Point) -> Option<(usize, f32)> {
        let mut best: Option<(usize, f32)> = None;
        for (i, &id) in self.path.iter().enumerate() {
            let d = self.graph.edge_distance(id, p);
            if best.map_or(true, |(_, bd)| d < bd) {
                best = Some((i, d));
            }
        }
        best
    }

    /// Distance from `p` to the nearest edge of the path; infinite for an
    /// empty spine.
    pub fn distance_to(&self, p: Point) -> f32 {
        self.closest_path_edge(p).map_or(f32::INFINITY, |(_, d)| d)
    }

    /// Remove the single edge separating `from` from the rest of the path.
    ///
    /// `from` must be a current endpoint. Returns the vertex that becomes
    /// the new endpoint, or `None` when the last edge was removed and the
    /// spine is now empty.
    pub fn shorten_from(&mut self, from: VertexId) -> Result<Option<VertexId>, SpineError> {
        let (begin, end) = self.ends.ok_or(SpineError::EmptySpine)?;
        if self.path.is_empty() {
            return Err(SpineError::EmptySpine);
        }
        let at = if from == begin {
            SpineEnd::Begin
        } else if from == end {
            SpineEnd::End
        } else {
            return Err(SpineError::NotAnEndpoint {
                vertex: self.graph.vertex(from).key().to_string(),
            });
        };

        let removed = match at {
            SpineEnd::Begin => self.path.remove(0),
            SpineEnd::End => match self.path.pop() {
                Some(e) => e,
                None => return Err(SpineError::EmptySpine),
            },
        };
        let neighbor = self
            .graph
            .edge(removed)
            .opposite(from)
            .ok_or(SpineError::EmptySpine)?;
        self.graph.detach_edge(removed);

        if self.path.is_empty() {
            self.ends = None;
            return Ok(None);
        }
        self.ends = Some(match at {
            SpineEnd::Begin => (neighbor, end),
            SpineEnd::End => (begin, neighbor),
        });
        self.debug_check_path();
        Ok(Some(neighbor))
    }

    /// Mirror a skeleton-level split of the edge `key` at `slab_index`
    /// inside this spine's private graph. `origin` is the skeleton vertex
    /// standing behind the new mid vertex. Returns true when the path
    /// crossed the edge and was rewritten.
    pub(crate) fn apply_edge_split(
        &mut self,
        key: &EdgeKey,
        slab_index: usize,
        origin: Option<VertexId>,
    ) -> bool {
        let Some(pos) = self.path_index_of_key(key) else {
            return false;
        };
        let id = self.path[pos];
        if slab_index >= self.graph.edge(id).slabs().len() {
            warn!("apply_edge_split: slab index {slab_index} out of range on {key}");
            return false;
        }
        let enters_at_v1 = {
            let (v1, _) = self.graph.edge(id).endpoints();
            self.path_vertex(pos) == Some(v1)
        };
        let (_, first_half, second_half) = self.graph.split_edge(id, slab_index, origin);
        let (half_a, half_b) = if enters_at_v1 {
            (first_half, second_half)
        } else {
            (second_half, first_half)
        };
        self.path.splice(pos..=pos, [half_a, half_b]);
        self.debug_check_path();
        true
    }

    /// Raw ordered pixel sequence from the begin endpoint to the end
    /// endpoint: endpoint representative, slabs, every interior vertex
    /// representative in between. This is the input downstream polyline
    /// reduction works from.
    pub fn to_polyline(&self) -> Vec<Point> {
        let Some((begin, _)) = self.ends else {
            return Vec::new();
        };
        let Some(&first) = self.path.first() else {
            return Vec::new();
        };
        let mut out = vec![self.graph.vertex(begin).representative()];
        for step in SpineWalker::new(self, begin, first, None) {
            out.extend(self.graph.edge(step.edge).directed_slabs(step.from));
            out.push(self.graph.vertex(step.to).representative());
        }
        out
    }

    /// Total polyline length of the path.
    pub fn arc_length(&self) -> f32 {
        self.to_polyline()
            .windows(2)
            .map(|w| w[0].distance(w[1]))
            .sum()
    }

    fn debug_check_path(&self) {
        if cfg!(debug_assertions) {
            debug_assert!(self.path_is_consistent(), "spine path invariant violated");
        }
    }

    fn path_is_consistent(&self) -> bool {
        let Some((begin, end)) = self.ends else {
            return self.path.is_empty();
        };
        let Some(&first) = self.path.first() else {
            return false;
        };
        let mut seen = vec![begin];
        let mut walked = 0usize;
        for step in SpineWalker::new(self, begin, first, None) {
            walked += 1;
            if seen.contains(&step.to) {
                return false;
            }
            seen.push(step.to);
        }
        walked == self.path.len() && seen.last() == Some(&end)
    }
}
