//! Node diffs produced by document mutations.
//!
//! Every mutation returns one [`NodeDiff`] per touched node, consolidated by
//! a [`DiffAccumulator`] across the internal steps of the operation (direct
//! edit, sibling reorder, cascade disconnect).

pub mod accumulator;
pub mod human_summary;
pub mod model;

pub use accumulator::DiffAccumulator;
pub use human_summary::render_diff_summary;
pub use model::{DiffKind, NodeDiff};
