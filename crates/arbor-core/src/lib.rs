//! Arbor Core - behaviour-tree documents and their mutations
//!
//! This crate holds everything that runs without I/O:
//! - The document model (nodes, positions, opaque settings)
//! - The six node mutations and the sibling reorder they share
//! - Per-node diffs consolidated across the steps of one operation
//! - Error and logging facilities used by the store and engine crates
//! - Integrity diagnostics and archive export

pub mod apply;
pub mod commands;
pub mod diff;
pub mod errors;
pub mod export;
pub mod logging_facility;
pub mod model;
pub mod ops;
pub mod rules;

// Re-export commonly used types
pub use apply::{apply, Applied};
pub use commands::{Mutation, NodeMovement};
pub use diff::{DiffAccumulator, NodeDiff};
pub use errors::{ArborError, ExError, ExErrorKind, Result};
pub use model::{AssetType, Document, Node, NodeSettings, NodeType, Position};
