//! Error helpers for arbor-store
//!
//! Store functions return the canonical `ExError` from arbor-core.

use arbor_core::errors::{ExError, ExErrorKind};

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

pub fn migration_error(migration_id: &str, reason: &str) -> ExError {
    ExError::new(ExErrorKind::Persistence)
        .with_op("migration")
        .with_message(format!("Migration {} failed: {}", migration_id, reason))
}

/// A recorded migration no longer matches the embedded SQL
pub fn checksum_mismatch(migration_id: &str, expected: &str, actual: &str) -> ExError {
    ExError::new(ExErrorKind::Persistence)
        .with_op("migration_checksum")
        .with_message(format!(
            "Checksum mismatch for migration {}: expected {}, got {}",
            migration_id, expected, actual
        ))
}

pub fn from_rusqlite(err: rusqlite::Error) -> ExError {
    ExError::new(ExErrorKind::Persistence)
        .with_op("sqlite")
        .with_message(err.to_string())
}

pub fn asset_not_found(asset_id: &str) -> ExError {
    ExError::new(ExErrorKind::NotFound)
        .with_asset_id(asset_id)
        .with_message("Asset not found")
}

/// The stored version moved on since the caller read it
pub fn version_conflict(asset_id: &str, stored: &str, requested: &str) -> ExError {
    ExError::new(ExErrorKind::VersionConflict)
        .with_asset_id(asset_id)
        .with_versions(stored, requested)
        .with_message(format!(
            "Invalid asset version for modification, stored version: {} request version: {}",
            stored, requested
        ))
}

pub fn duplicate_asset_name(asset_name: &str) -> ExError {
    ExError::new(ExErrorKind::AlreadyExists)
        .with_op("create_asset")
        .with_message(format!("Asset name already in use: {}", asset_name))
}

pub fn duplicate_solution_name(solution_name: &str) -> ExError {
    ExError::new(ExErrorKind::DuplicateSolutionName)
        .with_op("create_solution")
        .with_message(format!("Solution name already in use: {}", solution_name))
}

pub fn invalid_solution(solution_id: &str) -> ExError {
    ExError::new(ExErrorKind::InvalidSolution)
        .with_message(format!("Invalid solution: {}", solution_id))
}

/// Solution meta was submitted against an outdated version
pub fn solution_version_conflict(solution_id: &str, stored: &str, requested: &str) -> ExError {
    ExError::new(ExErrorKind::SolutionVersionConflict)
        .with_versions(stored, requested)
        .with_message(format!(
            "Invalid solution version for modification of {}, stored version: {} request version: {}",
            solution_id, stored, requested
        ))
}

/// Stored meta text no longer parses as JSON
pub fn corrupt_solution_meta(solution_id: &str, err: serde_json::Error) -> ExError {
    ExError::new(ExErrorKind::Deserialization)
        .with_message(format!("Solution meta of {} is not valid JSON: {}", solution_id, err))
}

pub fn duplicate_asset_set_name(asset_set_name: &str) -> ExError {
    ExError::new(ExErrorKind::DuplicateAssetSetName)
        .with_op("create_asset_set")
        .with_message(format!("Asset set name already in use: {}", asset_set_name))
}

pub fn invalid_asset_set(asset_set_id: &str) -> ExError {
    ExError::new(ExErrorKind::InvalidAssetSet)
        .with_message(format!("Invalid asset set: {}", asset_set_id))
}
