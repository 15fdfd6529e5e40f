use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geometry::Point;

use super::vertex::{VertexId, VertexKey};

/// Handle into a graph's edge arena.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct EdgeId(pub u32);

/// Graph-independent edge identity: the canonically ordered pair of
/// endpoint point-set keys.
///
/// Spines and the skeleton compare edges through keys, never through arena
/// handles, so a cloned edge stays equal to the edge it came from.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct EdgeKey {
    a: VertexKey,
    b: VertexKey,
}

impl EdgeKey {
    pub(crate) fn new(a: VertexKey, b: VertexKey) -> Self {
        if b < a {
            Self { a: b, b: a }
        } else {
            Self { a, b }
        }
    }

    pub fn ends(&self) -> (&VertexKey, &VertexKey) {
        (&self.a, &self.b)
    }

    pub fn touches(&self, key: &VertexKey) -> bool {
        self.a == *key || self.b == *key
    }
}

impl fmt::Display for EdgeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.a, self.b)
    }
}

/// An edge of the skeleton: canonical endpoint pair plus the ordered pixel
/// path ("slabs") between them, `slabs[0]` nearest the first endpoint.
#[derive(Clone, Debug)]
pub struct Edge {
    pub id: EdgeId,
    v1: VertexId,
    v2: VertexId,
    slabs: Vec<Point>,
}

impl Edge {
    pub(crate) fn new(id: EdgeId, v1: VertexId, v2: VertexId, slabs: Vec<Point>) -> Self {
        Self { id, v1, v2, slabs }
    }

    pub fn endpoints(&self) -> (VertexId, VertexId) {
        (self.v1, self.v2)
    }

    pub fn touches(&self, v: VertexId) -> bool {
        self.v1 == v || self.v2 == v
    }

    /// The endpoint opposite `v`, or `None` when `v` is not an endpoint.
    pub fn opposite(&self, v: VertexId) -> Option<VertexId> {
        if v == self.v1 {
            Some(self.v2)
        } else if v == self.v2 {
            Some(self.v1)
        } else {
            None
        }
    }

    /// Intermediate pixel path in canonical order (nearest `v1` first).
    pub fn slabs(&self) -> &[Point] {
        &self.slabs
    }

    /// Slabs ordered so traversal starts at `from`.
    pub fn directed_slabs(&self, from: VertexId) -> Vec<Point> {
        let mut slabs = self.slabs.clone();
        if from == self.v2 {
            slabs.reverse();
        }
        slabs
    }

    /// Index and distance of the slab closest to `p`. `None` for slab-less
    /// edges. The first slab wins ties.
    pub fn closest_slab(&self, p: Point) -> Option<(usize, f32)> {
        let mut best: Option<(usize, f32)> = None;
        for (i, slab) in self.slabs.iter().enumerate() {
            let d = p.distance(*slab);
            if best.map_or(true, |(_, bd)| d < bd) {
                best = Some((i, d));
            }
        }
        best
    }
}
