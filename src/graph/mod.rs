//! Arena-backed skeleton graph model.
//!
//! Vertices cluster coincident pixels and list their incident edges by
//! handle; edges carry the ordered slab polyline between their endpoints.
//! Identity across graphs goes through point-set keys ([`VertexKey`],
//! [`EdgeKey`]), never arena handles, so cloned sub-graphs (spines) stay
//! comparable with the skeleton they came from.

pub mod edge;
pub mod store;
pub mod vertex;

pub use edge::{Edge, EdgeId, EdgeKey};
pub use store::{ClosestEdge, Graph};
pub use vertex::{Vertex, VertexId, VertexKey};
