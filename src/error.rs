//! Error taxonomy for graph surgery and conflict resolution.

use thiserror::Error;

/// Failures surfaced by spine construction, the skeleton adapter and the
/// conflict resolver.
///
/// Topology and resolver variants signal bugs in the calling algorithm;
/// they are raised instead of mutating anything and are not meant to be
/// recovered from. "No spine near this seed" is deliberately not an error:
/// seeding reports it as `None` so the caller can skip the seed.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SpineError {
    /// The edge does not touch either endpoint of the spine.
    #[error("edge {edge} does not attach to a spine endpoint")]
    DetachedEdge { edge: String },

    /// The edge's far vertex is already part of the spine.
    #[error("edge {edge} would close a cycle in the spine")]
    CycleEdge { edge: String },

    /// The vertex handed to a shortening call is not an endpoint.
    #[error("vertex {vertex} is not a spine endpoint")]
    NotAnEndpoint { vertex: String },

    /// The operation requires a seeded, non-empty spine.
    #[error("operation requires a non-empty spine")]
    EmptySpine,

    /// An overlap was claimed for a pair that shares no edges.
    #[error("spines {first} and {second} report an overlap but share no edges")]
    NoSharedEdges { first: usize, second: usize },

    /// A resolution round failed to reduce the pair's shared edges.
    #[error("resolving spines {first} and {second} left {shared} shared edges in place")]
    NoProgress {
        first: usize,
        second: usize,
        shared: usize,
    },

    /// The resolver's defensive round cap was exhausted.
    #[error("conflict resolution exceeded {rounds} rounds without reaching a fixed point")]
    RoundLimitExceeded { rounds: usize },

    /// A raw skeleton vertex carried no points.
    #[error("raw skeleton vertex {index} has an empty point cluster")]
    EmptyVertexCluster { index: usize },

    /// A raw skeleton edge referenced a vertex that does not exist.
    #[error("raw skeleton edge {edge} references unknown vertex {vertex}")]
    UnknownVertex { edge: usize, vertex: usize },
}
