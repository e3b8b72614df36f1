//! Persistence for behaviour-tree assets.
//!
//! Documents are stored whole, one row per asset, next to an opaque version
//! token that every successful save replaces. Assets belong to asset sets,
//! which belong to solutions.

pub mod db;
pub mod document_store;
pub mod errors;
pub mod memory_store;
pub mod migrations;
pub mod sqlite_store;

pub use document_store::{
    mint_version, AssetDetail, AssetRecord, AssetSetRecord, AssetSummary, DocumentStore,
    NewAsset, SolutionDetail, SolutionSummary, StoredDocument, EMPTY_SOLUTION_META,
};
pub use errors::Result;
pub use memory_store::InMemoryDocumentStore;
pub use sqlite_store::SqliteDocumentStore;
