//! Schema migrations
//!
//! - Embedded SQL, applied in order inside one transaction each
//! - SHA-256 checksums recorded and re-verified on every run
//! - Idempotent: applied migrations are skipped

mod checksums;
mod embedded;
mod runner;

pub use runner::apply_migrations;
