//! Spines: simple paths through the skeleton and their growth, traversal
//! and surgery primitives.
//!
//! - [`path`]: the path container, endpoint bookkeeping and in-place
//!   mutation (growing, shortening, split propagation).
//! - [`extend`]: greedy score-driven extension from a seed edge.
//! - [`split`]: weakest-point splitting used by conflict resolution.
//! - [`walker`]: the read-only step iterator under most traversal logic.

pub mod extend;
pub mod path;
pub mod split;
pub mod walker;

pub use path::{Spine, SpineEnd};
pub use split::{CutPoint, SplitSpine};
pub use walker::{SpineWalker, WalkStep};
