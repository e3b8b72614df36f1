//! The persistence contract the engine depends on.

#![allow(clippy::result_large_err)]

use serde::Serialize;
use serde_json::value::RawValue;

use crate::errors::{corrupt_solution_meta, Result};

/// Content and version of one asset as last persisted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredDocument {
    pub content: String,
    pub version: String,
}

/// Full stored row of an asset
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetRecord {
    pub asset_id: String,
    pub asset_set_id: String,
    pub asset_type: String,
    pub asset_name: String,
    #[serde(skip)]
    pub content: String,
    pub asset_version: String,
}

/// Listing entry; content is never loaded for listings
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetSummary {
    pub asset_id: String,
    pub asset_set_id: String,
    pub asset_type: String,
    pub asset_name: String,
    pub asset_version: String,
}

impl From<&AssetRecord> for AssetSummary {
    fn from(record: &AssetRecord) -> Self {
        Self {
            asset_id: record.asset_id.clone(),
            asset_set_id: record.asset_set_id.clone(),
            asset_type: record.asset_type.clone(),
            asset_name: record.asset_name.clone(),
            asset_version: record.asset_version.clone(),
        }
    }
}

/// Full asset row including its content, as returned to readers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetDetail {
    pub asset_id: String,
    pub asset_set_id: String,
    pub asset_type: String,
    pub asset_name: String,
    pub asset_content: String,
    pub asset_version: String,
}

impl From<AssetRecord> for AssetDetail {
    fn from(record: AssetRecord) -> Self {
        Self {
            asset_id: record.asset_id,
            asset_set_id: record.asset_set_id,
            asset_type: record.asset_type,
            asset_name: record.asset_name,
            asset_content: record.content,
            asset_version: record.asset_version,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SolutionSummary {
    pub solution_id: String,
    pub solution_name: String,
    pub solution_version: String,
}

/// A solution with its client-owned meta blob
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SolutionDetail {
    #[serde(flatten)]
    pub summary: SolutionSummary,
    pub solution_meta: Box<RawValue>,
}

impl SolutionDetail {
    /// Rebuild a detail from its stored columns
    ///
    /// # Errors
    /// * `Deserialization` - If the stored meta is not valid JSON
    pub fn from_stored(summary: SolutionSummary, meta: String) -> Result<Self> {
        let solution_meta = RawValue::from_string(meta)
            .map_err(|e| corrupt_solution_meta(&summary.solution_id, e))?;
        Ok(Self {
            summary,
            solution_meta,
        })
    }
}

/// Meta stored for a freshly created solution
pub const EMPTY_SOLUTION_META: &str = "{}";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetSetRecord {
    pub asset_set_id: String,
    pub solution_id: String,
    pub asset_set_name: String,
}

/// Fields supplied when registering an asset
#[derive(Debug, Clone, Copy)]
pub struct NewAsset<'a> {
    pub asset_set_id: &'a str,
    pub asset_type: &'a str,
    pub asset_name: &'a str,
    pub content: &'a str,
}

/// Mint a fresh opaque version token
pub fn mint_version() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Whole-document persistence with compare-and-swap on the version, plus the
/// solution and asset-set rows that organize assets
///
/// Implementations must be safe to share between request threads. Callers
/// serialize writers per asset with the engine's lock manager; `save` still
/// refuses a stale `expected_version` on its own.
pub trait DocumentStore: Send + Sync {
    /// # Errors
    /// * `NotFound` - If no asset has this id
    fn load(&self, asset_id: &str) -> Result<StoredDocument>;

    /// Replace the content if the stored version equals `expected_version`
    ///
    /// Returns the freshly minted version.
    ///
    /// # Errors
    /// * `NotFound` - If no asset has this id
    /// * `VersionConflict` - If the stored version differs from `expected_version`
    fn save(&self, asset_id: &str, content: &str, expected_version: &str) -> Result<String>;

    /// Register a new asset with a fresh id and version
    ///
    /// # Errors
    /// * `InvalidAssetSet` - If `asset.asset_set_id` names no asset set
    /// * `AlreadyExists` - If an asset with the same name exists
    fn create(&self, asset: NewAsset<'_>) -> Result<AssetRecord>;

    /// # Errors
    /// * `NotFound` - If no asset has this id
    fn get_asset(&self, asset_id: &str) -> Result<AssetRecord>;

    /// Assets ordered by name, optionally restricted to one asset set
    fn list(&self, asset_set_id: Option<&str>) -> Result<Vec<AssetSummary>>;

    /// Register a solution with empty meta and a fresh version
    ///
    /// # Errors
    /// * `DuplicateSolutionName` - If the name is taken
    fn create_solution(&self, solution_name: &str) -> Result<SolutionDetail>;

    /// Solutions ordered by name
    fn list_solutions(&self) -> Result<Vec<SolutionSummary>>;

    /// # Errors
    /// * `InvalidSolution` - If no solution has this id
    fn get_solution(&self, solution_id: &str) -> Result<SolutionDetail>;

    /// Replace the meta blob if the stored version equals `expected_version`
    ///
    /// # Errors
    /// * `InvalidSolution` - If no solution has this id
    /// * `SolutionVersionConflict` - If the stored version differs
    fn submit_solution_meta(
        &self,
        solution_id: &str,
        solution_meta: &RawValue,
        expected_version: &str,
    ) -> Result<SolutionDetail>;

    /// # Errors
    /// * `InvalidSolution` - If `solution_id` names no solution
    /// * `DuplicateAssetSetName` - If the solution already has a set with this name
    fn create_asset_set(&self, solution_id: &str, asset_set_name: &str) -> Result<AssetSetRecord>;

    /// Asset sets ordered by name, optionally restricted to one solution
    fn list_asset_sets(&self, solution_id: Option<&str>) -> Result<Vec<AssetSetRecord>>;

    fn find_asset_set(&self, asset_set_id: &str) -> Result<Option<AssetSetRecord>>;
}
