//! Weakest-point splitting of a spine into two disjoint sides.

use std::collections::BTreeSet;

use crate::error::SpineError;
use crate::field::PointScorer;
use crate::geometry::Point;
use crate::graph::{EdgeKey, VertexId, VertexKey};

use super::path::Spine;

/// Cuts closer than this to an edge end degrade to a vertex-level cut, so
/// splitting never manufactures near-zero-length edges.
const END_GUARD_SLABS: usize = 3;

/// Where a spine (and the skeleton under it) gets cut.
#[derive(Clone, Debug, PartialEq)]
pub enum CutPoint {
    /// Cut at an interior slab of the edge with this identity key; the slab
    /// becomes a new vertex.
    MidSlab {
        edge: EdgeKey,
        slab_index: usize,
        slab: Point,
    },
    /// Cut at an existing vertex; no new topology is created.
    AtVertex { vertex: VertexKey },
}

/// Two disjoint sides produced by a cut, ordered to match the reference
/// points the split was asked about.
#[derive(Debug)]
pub struct SplitSpine {
    /// Side closer to the first reference point.
    pub first: Spine,
    /// The remaining side.
    pub second: Spine,
    pub cut: CutPoint,
}

/// Decide the concrete cut for the weakest slab, degrading to a vertex cut
/// within the guard band.
///
/// Vertices named in `forbidden` (spine endpoints, where cutting is a
/// no-op) are avoided; when both ends of the edge are forbidden the
/// mid-slab cut stands even inside the guard band, because making progress
/// outranks avoiding a short edge.
pub(crate) fn decide_cut(
    spine: &Spine,
    path_index: usize,
    slab_index: usize,
    slab: Point,
    forbidden: &BTreeSet<VertexKey>,
) -> CutPoint {
    let id = spine.path()[path_index];
    let edge = spine.graph().edge(id);
    let n = edge.slabs().len();

    let near_v1 = slab_index < END_GUARD_SLABS;
    let near_v2 = slab_index + END_GUARD_SLABS >= n;
    if !near_v1 && !near_v2 {
        return CutPoint::MidSlab {
            edge: spine.graph().edge_key(id),
            slab_index,
            slab,
        };
    }

    let (v1, v2) = edge.endpoints();
    let toward_v1 = match (near_v1, near_v2) {
        (true, false) => true,
        (false, true) => false,
        _ => slab_index * 2 < n,
    };
    let (primary, secondary) = if toward_v1 { (v1, v2) } else { (v2, v1) };

    let primary_key = spine.graph().vertex(primary).key();
    if !forbidden.contains(&primary_key) {
        return CutPoint::AtVertex {
            vertex: primary_key,
        };
    }
    let secondary_key = spine.graph().vertex(secondary).key();
    if !forbidden.contains(&secondary_key) {
        return CutPoint::AtVertex {
            vertex: secondary_key,
        };
    }
    CutPoint::MidSlab {
        edge: spine.graph().edge_key(id),
        slab_index,
        slab,
    }
}

impl Spine {
    /// Weakest slab (minimum scorer value, first wins ties) over the path
    /// edges `lo..=hi`. Returns (path index, slab index, slab).
    pub(crate) fn weakest_slab<S: PointScorer>(
        &self,
        lo: usize,
        hi: usize,
        scorer: &S,
    ) -> Option<(usize, usize, Point)> {
        if self.path().is_empty() {
            return None;
        }
        let hi = hi.min(self.path().len() - 1);
        let mut best: Option<(usize, usize, Point, f32)> = None;
        for pi in lo..=hi {
            let edge = self.graph().edge(self.path()[pi]);
            for (si, &slab) in edge.slabs().iter().enumerate() {
                let value = scorer.score(slab);
                if best.map_or(true, |(.., bv)| value < bv) {
                    best = Some((pi, si, slab, value));
                }
            }
        }
        best.map(|(pi, si, slab, _)| (pi, si, slab))
    }

    /// Cut the spine at `cut`, returning the begin-side and end-side
    /// spines. `mid_origin` is the skeleton vertex standing behind a
    /// mid-slab cut when the skeleton was split first.
    pub(crate) fn split_at(
        &self,
        cut: &CutPoint,
        mid_origin: Option<VertexId>,
    ) -> Result<(Spine, Spine), SpineError> {
        match cut {
            CutPoint::AtVertex { vertex } => {
                let mut pos = None;
                for i in 0..=self.path().len() {
                    let at = self.path_vertex(i);
                    if at.map(|v| self.graph().vertex(v).key()) == Some(vertex.clone()) {
                        pos = Some(i);
                        break;
                    }
                }
                let Some(pos) = pos else {
                    // The cut vertex is not on this path; nothing to do.
                    return Ok((self.clone(), Spine::new()));
                };
                let before = Spine::from_carried_run(self.graph(), &self.path()[..pos])?;
                let after = Spine::from_carried_run(self.graph(), &self.path()[pos..])?;
                Ok((before, after))
            }
            CutPoint::MidSlab {
                edge, slab_index, ..
            } => {
                let Some(pos) = self.path_index_of_key(edge) else {
                    return Ok((self.clone(), Spine::new()));
                };
                let id = self.path()[pos];
                let enters_at_v1 = {
                    let (v1, _) = self.graph().edge(id).endpoints();
                    self.path_vertex(pos) == Some(v1)
                };

                // Split inside a scratch copy so both halves can be carried
                // out into the two sides.
                let mut scratch = self.graph().clone();
                let (_, first_half, second_half) =
                    scratch.split_edge(id, *slab_index, mid_origin);
                let (half_before, half_after) = if enters_at_v1 {
                    (first_half, second_half)
                } else {
                    (second_half, first_half)
                };

                let mut run_before = self.path()[..pos].to_vec();
                run_before.push(half_before);
                let mut run_after = vec![half_after];
                run_after.extend_from_slice(&self.path()[pos + 1..]);

                let before = Spine::from_carried_run(&scratch, &run_before)?;
                let after = Spine::from_carried_run(&scratch, &run_after)?;
                Ok((before, after))
            }
        }
    }

    /// Split between the path edges closest to `p1` and `p2` at the weakest
    /// slab per the point scorer.
    ///
    /// The first returned spine is the side closer to `p1`. A weakest slab
    /// within the guard band of its edge degrades to a vertex-level cut; a
    /// slab-less sub-path cuts at the boundary vertex between the two
    /// closest edges. Either side may come back empty when the cut lands on
    /// a terminal vertex.
    pub fn split<S: PointScorer>(
        &self,
        p1: Point,
        p2: Point,
        scorer: &S,
    ) -> Result<SplitSpine, SpineError> {
        let (ia, _) = self.closest_path_edge(p1).ok_or(SpineError::EmptySpine)?;
        let (ib, _) = self.closest_path_edge(p2).ok_or(SpineError::EmptySpine)?;
        let (lo, hi) = if ia <= ib { (ia, ib) } else { (ib, ia) };

        let cut = match self.weakest_slab(lo, hi, scorer) {
            Some((pi, si, slab)) => decide_cut(self, pi, si, slab, &self.endpoint_keys()),
            None => {
                let v = self.path_vertex(hi).ok_or(SpineError::EmptySpine)?;
                CutPoint::AtVertex {
                    vertex: self.graph().vertex(v).key(),
                }
            }
        };

        let (before, after) = self.split_at(&cut, None)?;
        let (first, second) = if before.distance_to(p1) <= after.distance_to(p1) {
            (before, after)
        } else {
            (after, before)
        };
        Ok(SplitSpine { first, second, cut })
    }
}
