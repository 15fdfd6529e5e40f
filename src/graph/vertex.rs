use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geometry::Point;

use super::edge::EdgeId;

/// Handle into a graph's vertex arena.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct VertexId(pub u32);

/// Ordered point-set key establishing vertex identity across graphs.
///
/// Two vertices are equal iff their point sets are equal, independent of
/// which arena they live in; the key is the comparable form of that rule.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct VertexKey(Vec<Point>);

impl VertexKey {
    pub(crate) fn from_points(points: &BTreeSet<Point>) -> Self {
        Self(points.iter().copied().collect())
    }

    /// Representative coordinate of the cluster (its smallest point).
    pub fn representative(&self) -> Point {
        self.0[0]
    }

    pub fn points(&self) -> &[Point] {
        &self.0
    }
}

impl fmt::Display for VertexKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.representative())
    }
}

/// A junction or endpoint of the skeleton: a cluster of coincident pixel
/// coordinates plus the ordered list of incident edges ("branches").
#[derive(Clone, Debug)]
pub struct Vertex {
    pub id: VertexId,
    points: BTreeSet<Point>,
    branches: Vec<EdgeId>,
    /// Skeleton vertex this one was cloned from, if any. `None` for
    /// skeleton-native vertices and for vertices created by splitting an
    /// edge before the skeleton caught up.
    pub origin: Option<VertexId>,
}

impl Vertex {
    pub(crate) fn new(id: VertexId, points: BTreeSet<Point>, origin: Option<VertexId>) -> Self {
        assert!(!points.is_empty(), "vertex cluster must be non-empty");
        Self {
            id,
            points,
            branches: Vec::new(),
            origin,
        }
    }

    pub fn key(&self) -> VertexKey {
        VertexKey::from_points(&self.points)
    }

    pub fn points(&self) -> &BTreeSet<Point> {
        &self.points
    }

    /// Representative coordinate of the cluster (its smallest point).
    pub fn representative(&self) -> Point {
        // The constructor rejects empty clusters.
        *self
            .points
            .iter()
            .next()
            .expect("vertex cluster is non-empty")
    }

    /// Incident edges in registration order.
    pub fn branches(&self) -> &[EdgeId] {
        &self.branches
    }

    pub fn degree(&self) -> usize {
        self.branches.len()
    }

    /// A vertex with fewer than two incident edges is a leaf.
    pub fn is_leaf(&self) -> bool {
        self.branches.len() < 2
    }

    /// The other branch of a degree-≤2 vertex: given one incident edge,
    /// return the remaining one. `None` when `edge` is not a branch of this
    /// vertex or no other branch exists.
    pub fn opposite_branch(&self, edge: EdgeId) -> Option<EdgeId> {
        if !self.branches.contains(&edge) {
            return None;
        }
        self.branches.iter().copied().find(|&b| b != edge)
    }

    /// Distance from `p` to the nearest cluster point.
    pub fn distance_to(&self, p: Point) -> f32 {
        p.distance_to_nearest(self.points.iter())
            .unwrap_or(f32::INFINITY)
    }

    pub(crate) fn register_branch(&mut self, edge: EdgeId) {
        if !self.branches.contains(&edge) {
            self.branches.push(edge);
        }
    }

    pub(crate) fn unregister_branch(&mut self, edge: EdgeId) {
        self.branches.retain(|&b| b != edge);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vertex(points: &[Point]) -> Vertex {
        Vertex::new(VertexId(0), points.iter().copied().collect(), None)
    }

    #[test]
    fn key_orders_by_point_set() {
        let a = vertex(&[Point::new(1, 1)]);
        let b = vertex(&[Point::new(1, 2)]);
        assert!(a.key() < b.key());
        assert_eq!(a.key(), vertex(&[Point::new(1, 1)]).key());
    }

    #[test]
    fn representative_is_smallest_cluster_point() {
        let v = vertex(&[Point::new(4, 4), Point::new(3, 9), Point::new(3, 5)]);
        assert_eq!(v.representative(), Point::new(3, 5));
    }

    #[test]
    fn opposite_branch_on_degree_two() {
        let mut v = vertex(&[Point::new(0, 0)]);
        v.register_branch(EdgeId(3));
        v.register_branch(EdgeId(7));
        assert_eq!(v.opposite_branch(EdgeId(3)), Some(EdgeId(7)));
        assert_eq!(v.opposite_branch(EdgeId(7)), Some(EdgeId(3)));
        assert_eq!(v.opposite_branch(EdgeId(9)), None);

        v.unregister_branch(EdgeId(7));
        assert_eq!(v.opposite_branch(EdgeId(3)), None);
        assert!(v.is_leaf());
    }
}
