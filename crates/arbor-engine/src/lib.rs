//! Arbor Engine - request orchestration
//!
//! Coordinates the pure mutation core with persistence:
//! - [`LockManager`] serializes writers per asset and per collection
//! - [`VersionGate`] runs the versioned load-mutate-save cycle
//! - [`EditorService`] exposes the request-facing entry points

pub mod gate;
pub mod locks;
pub mod service;

pub use gate::{Modification, VersionGate};
pub use locks::{EntityClass, LockManager};
pub use service::EditorService;
