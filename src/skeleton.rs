//! Adapter from an externally produced topological skeleton to the graph
//! model, plus the closest-edge seeding entry point.
//!
//! The skeletonization routine itself lives outside this crate; it hands
//! over a [`RawSkeleton`] (vertex pixel clusters plus slab-carrying edges),
//! which is validated and converted into a [`Graph`] here.

use std::collections::BTreeSet;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::SpineError;
use crate::geometry::Point;
use crate::graph::Graph;
use crate::spine::Spine;

/// One edge of a raw skeleton: endpoint indices into the vertex list plus
/// the ordered pixel path between them.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RawEdge {
    pub v1: usize,
    pub v2: usize,
    #[serde(default)]
    pub slabs: Vec<Point>,
}

/// Topological skeleton as produced by an external skeletonization routine.
///
/// Every vertex is a non-empty cluster of coincident pixels; every edge's
/// slab list is expected to form a connected pixel path between its two
/// endpoints.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RawSkeleton {
    pub vertices: Vec<Vec<Point>>,
    pub edges: Vec<RawEdge>,
}

impl Graph {
    /// Build a graph from a raw skeleton.
    ///
    /// Rejects empty vertex clusters and dangling edge references; both are
    /// contract violations on the skeletonizer's side.
    pub fn from_raw(raw: &RawSkeleton) -> Result<Self, SpineError> {
        let mut graph = Graph::new();

        let mut ids = Vec::with_capacity(raw.vertices.len());
        for (index, cluster) in raw.vertices.iter().enumerate() {
            if cluster.is_empty() {
                return Err(SpineError::EmptyVertexCluster { index });
            }
            let points: BTreeSet<Point> = cluster.iter().copied().collect();
            ids.push(graph.add_vertex(points, None));
        }

        for (index, edge) in raw.edges.iter().enumerate() {
            let a = *ids.get(edge.v1).ok_or(SpineError::UnknownVertex {
                edge: index,
                vertex: edge.v1,
            })?;
            let b = *ids.get(edge.v2).ok_or(SpineError::UnknownVertex {
                edge: index,
                vertex: edge.v2,
            })?;
            graph.add_edge(a, b, edge.slabs.clone());
        }

        debug!(
            "skeleton adapted: {} vertices, {} edges",
            graph.vertex_count(),
            graph.edge_count()
        );
        Ok(graph)
    }
}

/// Seed a spine from the skeleton edge closest to `point`.
///
/// Returns `None` when the graph has no edges: "no spine found here" is a
/// skippable condition for the caller, not an error.
pub fn find_spine(graph: &Graph, point: Point) -> Option<Spine> {
    let hit = graph.closest_edge(point)?;
    debug!(
        "find_spine: seed {point} attaches to edge {} at distance {:.2}",
        graph.edge_key(hit.edge),
        hit.distance
    );
    Some(Spine::seeded(graph, hit.edge))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adapts_a_valid_raw_skeleton() {
        let raw = RawSkeleton {
            vertices: vec![
                vec![Point::new(0, 0)],
                vec![Point::new(10, 0), Point::new(10, 1)],
                vec![Point::new(20, 0)],
            ],
            edges: vec![
                RawEdge {
                    v1: 0,
                    v2: 1,
                    slabs: (1..10).map(|x| Point::new(x, 0)).collect(),
                },
                RawEdge {
                    v1: 1,
                    v2: 2,
                    slabs: (11..20).map(|x| Point::new(x, 0)).collect(),
                },
            ],
        };

        let g = Graph::from_raw(&raw).expect("raw skeleton is valid");
        assert_eq!(g.vertex_count(), 3);
        assert_eq!(g.edge_count(), 2);

        let spine = find_spine(&g, Point::new(4, 2)).expect("edge in reach");
        assert_eq!(spine.len(), 1);
    }

    #[test]
    fn rejects_contract_violations() {
        let empty_cluster = RawSkeleton {
            vertices: vec![vec![]],
            edges: vec![],
        };
        assert_eq!(
            Graph::from_raw(&empty_cluster).unwrap_err(),
            SpineError::EmptyVertexCluster { index: 0 }
        );

        let dangling = RawSkeleton {
            vertices: vec![vec![Point::new(0, 0)]],
            edges: vec![RawEdge {
                v1: 0,
                v2: 3,
                slabs: vec![],
            }],
        };
        assert_eq!(
            Graph::from_raw(&dangling).unwrap_err(),
            SpineError::UnknownVertex { edge: 0, vertex: 3 }
        );
    }

    #[test]
    fn empty_skeleton_yields_no_spine() {
        let g = Graph::new();
        assert!(find_spine(&g, Point::new(5, 5)).is_none());
    }
}
