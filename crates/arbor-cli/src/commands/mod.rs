//! Subcommand implementations

pub mod asset;
pub mod node;
pub mod set;
pub mod solution;

use std::error::Error;
use std::path::Path;
use std::sync::Arc;

use arbor_engine::{EditorService, LockManager};
use arbor_store::SqliteDocumentStore;
use serde::Serialize;

pub type CliResult = Result<(), Box<dyn Error>>;

/// Open (creating if needed) the database and wire up the service
pub fn open_service(db: &str) -> Result<EditorService, Box<dyn Error>> {
    if let Some(parent) = Path::new(db).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let store = SqliteDocumentStore::open(db)?;
    Ok(EditorService::new(
        Arc::new(store),
        Arc::new(LockManager::new()),
    ))
}

pub fn print_json<T: Serialize>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
