//! In-memory document store for tests and ephemeral sessions.
//!
//! [`InMemoryDocumentStore`] keeps every asset in a `HashMap` behind a
//! `RwLock` and follows the same compare-and-swap rules as the SQLite store.
//! Data is lost when the store is dropped.

#![allow(clippy::result_large_err)]

use std::collections::HashMap;

use parking_lot::RwLock;
use serde_json::value::RawValue;

use crate::document_store::{
    mint_version, AssetRecord, AssetSetRecord, AssetSummary, DocumentStore, NewAsset,
    SolutionDetail, SolutionSummary, StoredDocument, EMPTY_SOLUTION_META,
};
use crate::errors::{
    asset_not_found, duplicate_asset_name, duplicate_asset_set_name, duplicate_solution_name,
    invalid_asset_set, invalid_solution, solution_version_conflict, version_conflict, Result,
};

#[derive(Debug, Clone)]
struct SolutionRow {
    summary: SolutionSummary,
    meta: String,
}

impl SolutionRow {
    fn detail(&self) -> Result<SolutionDetail> {
        SolutionDetail::from_stored(self.summary.clone(), self.meta.clone())
    }
}

#[derive(Debug, Default)]
struct Tables {
    assets: HashMap<String, AssetRecord>,
    asset_sets: HashMap<String, AssetSetRecord>,
    solutions: HashMap<String, SolutionRow>,
}

#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    tables: RwLock<Tables>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record as-is, bypassing name and asset-set checks. Used to seed fixtures.
    pub fn insert(&self, record: AssetRecord) {
        self.tables
            .write()
            .assets
            .insert(record.asset_id.clone(), record);
    }
}

impl DocumentStore for InMemoryDocumentStore {
    fn load(&self, asset_id: &str) -> Result<StoredDocument> {
        let tables = self.tables.read();
        tables
            .assets
            .get(asset_id)
            .map(|record| StoredDocument {
                content: record.content.clone(),
                version: record.asset_version.clone(),
            })
            .ok_or_else(|| asset_not_found(asset_id))
    }

    fn save(&self, asset_id: &str, content: &str, expected_version: &str) -> Result<String> {
        let mut tables = self.tables.write();
        let record = tables
            .assets
            .get_mut(asset_id)
            .ok_or_else(|| asset_not_found(asset_id))?;

        if record.asset_version != expected_version {
            return Err(version_conflict(
                asset_id,
                &record.asset_version,
                expected_version,
            ));
        }

        record.content = content.to_string();
        record.asset_version = mint_version();
        Ok(record.asset_version.clone())
    }

    fn create(&self, asset: NewAsset<'_>) -> Result<AssetRecord> {
        let mut tables = self.tables.write();
        if !tables.asset_sets.contains_key(asset.asset_set_id) {
            return Err(invalid_asset_set(asset.asset_set_id));
        }
        if tables.assets.values().any(|r| r.asset_name == asset.asset_name) {
            return Err(duplicate_asset_name(asset.asset_name));
        }

        let record = AssetRecord {
            asset_id: uuid::Uuid::new_v4().to_string(),
            asset_set_id: asset.asset_set_id.to_string(),
            asset_type: asset.asset_type.to_string(),
            asset_name: asset.asset_name.to_string(),
            content: asset.content.to_string(),
            asset_version: mint_version(),
        };
        tables.assets.insert(record.asset_id.clone(), record.clone());
        Ok(record)
    }

    fn get_asset(&self, asset_id: &str) -> Result<AssetRecord> {
        self.tables
            .read()
            .assets
            .get(asset_id)
            .cloned()
            .ok_or_else(|| asset_not_found(asset_id))
    }

    fn list(&self, asset_set_id: Option<&str>) -> Result<Vec<AssetSummary>> {
        let tables = self.tables.read();
        let mut out: Vec<AssetSummary> = tables
            .assets
            .values()
            .filter(|r| asset_set_id.map_or(true, |set| r.asset_set_id == set))
            .map(AssetSummary::from)
            .collect();
        out.sort_by(|a, b| {
            a.asset_name
                .cmp(&b.asset_name)
                .then_with(|| a.asset_id.cmp(&b.asset_id))
        });
        Ok(out)
    }

    fn create_solution(&self, solution_name: &str) -> Result<SolutionDetail> {
        let mut tables = self.tables.write();
        if tables
            .solutions
            .values()
            .any(|s| s.summary.solution_name == solution_name)
        {
            return Err(duplicate_solution_name(solution_name));
        }

        let row = SolutionRow {
            summary: SolutionSummary {
                solution_id: uuid::Uuid::new_v4().to_string(),
                solution_name: solution_name.to_string(),
                solution_version: mint_version(),
            },
            meta: EMPTY_SOLUTION_META.to_string(),
        };
        let detail = row.detail()?;
        tables
            .solutions
            .insert(row.summary.solution_id.clone(), row);
        Ok(detail)
    }

    fn list_solutions(&self) -> Result<Vec<SolutionSummary>> {
        let tables = self.tables.read();
        let mut out: Vec<SolutionSummary> = tables
            .solutions
            .values()
            .map(|row| row.summary.clone())
            .collect();
        out.sort_by(|a, b| {
            a.solution_name
                .cmp(&b.solution_name)
                .then_with(|| a.solution_id.cmp(&b.solution_id))
        });
        Ok(out)
    }

    fn get_solution(&self, solution_id: &str) -> Result<SolutionDetail> {
        self.tables
            .read()
            .solutions
            .get(solution_id)
            .ok_or_else(|| invalid_solution(solution_id))?
            .detail()
    }

    fn submit_solution_meta(
        &self,
        solution_id: &str,
        solution_meta: &RawValue,
        expected_version: &str,
    ) -> Result<SolutionDetail> {
        let mut tables = self.tables.write();
        let row = tables
            .solutions
            .get_mut(solution_id)
            .ok_or_else(|| invalid_solution(solution_id))?;

        if row.summary.solution_version != expected_version {
            return Err(solution_version_conflict(
                solution_id,
                &row.summary.solution_version,
                expected_version,
            ));
        }

        row.meta = solution_meta.get().to_string();
        row.summary.solution_version = mint_version();
        row.detail()
    }

    fn create_asset_set(&self, solution_id: &str, asset_set_name: &str) -> Result<AssetSetRecord> {
        let mut tables = self.tables.write();
        if !tables.solutions.contains_key(solution_id) {
            return Err(invalid_solution(solution_id));
        }
        if tables
            .asset_sets
            .values()
            .any(|s| s.solution_id == solution_id && s.asset_set_name == asset_set_name)
        {
            return Err(duplicate_asset_set_name(asset_set_name));
        }

        let record = AssetSetRecord {
            asset_set_id: uuid::Uuid::new_v4().to_string(),
            solution_id: solution_id.to_string(),
            asset_set_name: asset_set_name.to_string(),
        };
        tables
            .asset_sets
            .insert(record.asset_set_id.clone(), record.clone());
        Ok(record)
    }

    fn list_asset_sets(&self, solution_id: Option<&str>) -> Result<Vec<AssetSetRecord>> {
        let tables = self.tables.read();
        let mut out: Vec<AssetSetRecord> = tables
            .asset_sets
            .values()
            .filter(|s| solution_id.map_or(true, |id| s.solution_id == id))
            .cloned()
            .collect();
        out.sort_by(|a, b| {
            a.asset_set_name
                .cmp(&b.asset_set_name)
                .then_with(|| a.asset_set_id.cmp(&b.asset_set_id))
        });
        Ok(out)
    }

    fn find_asset_set(&self, asset_set_id: &str) -> Result<Option<AssetSetRecord>> {
        Ok(self.tables.read().asset_sets.get(asset_set_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbor_core::errors::ExErrorKind;

    fn new_asset<'a>(set: &'a AssetSetRecord, name: &'a str) -> NewAsset<'a> {
        NewAsset {
            asset_set_id: &set.asset_set_id,
            asset_type: "BehaviourTree",
            asset_name: name,
            content: "{}",
        }
    }

    fn store_with_set() -> (InMemoryDocumentStore, AssetSetRecord) {
        let store = InMemoryDocumentStore::new();
        let solution = store.create_solution("game").unwrap();
        let set = store
            .create_asset_set(&solution.summary.solution_id, "npc")
            .unwrap();
        (store, set)
    }

    #[test]
    fn test_save_rotates_version() {
        let (store, set) = store_with_set();
        let record = store.create(new_asset(&set, "tree")).unwrap();

        let v2 = store.save(&record.asset_id, "{\"a\":1}", &record.asset_version).unwrap();

        assert_ne!(v2, record.asset_version);
        let loaded = store.load(&record.asset_id).unwrap();
        assert_eq!(loaded.version, v2);
        assert_eq!(loaded.content, "{\"a\":1}");
    }

    #[test]
    fn test_stale_save_is_conflict() {
        let (store, set) = store_with_set();
        let record = store.create(new_asset(&set, "tree")).unwrap();
        store.save(&record.asset_id, "x", &record.asset_version).unwrap();

        let err = store
            .save(&record.asset_id, "y", &record.asset_version)
            .unwrap_err();

        assert_eq!(err.kind(), ExErrorKind::VersionConflict);
        assert_eq!(err.requested_version(), Some(record.asset_version.as_str()));
        assert_eq!(store.load(&record.asset_id).unwrap().content, "x");
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let (store, set) = store_with_set();
        store.create(new_asset(&set, "tree")).unwrap();
        let err = store.create(new_asset(&set, "tree")).unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::AlreadyExists);
    }

    #[test]
    fn test_seeded_record_skips_set_check() {
        let store = InMemoryDocumentStore::new();
        store.insert(AssetRecord {
            asset_id: "seeded".to_string(),
            asset_set_id: "nowhere".to_string(),
            asset_type: "BehaviourTree".to_string(),
            asset_name: "seeded".to_string(),
            content: "{}".to_string(),
            asset_version: "v1".to_string(),
        });
        assert_eq!(store.load("seeded").unwrap().version, "v1");
    }
}
