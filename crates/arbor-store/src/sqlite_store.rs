//! SQLite-backed document store

#![allow(clippy::result_large_err)]

use std::path::Path;

use parking_lot::Mutex;
use rusqlite::{Connection, OptionalExtension, Row};
use serde_json::value::RawValue;

use crate::db;
use crate::document_store::{
    mint_version, AssetRecord, AssetSetRecord, AssetSummary, DocumentStore, NewAsset,
    SolutionDetail, SolutionSummary, StoredDocument, EMPTY_SOLUTION_META,
};
use crate::errors::{
    asset_not_found, duplicate_asset_name, duplicate_asset_set_name, duplicate_solution_name,
    from_rusqlite, invalid_asset_set, invalid_solution, solution_version_conflict,
    version_conflict, Result,
};
use crate::migrations::apply_migrations;

/// Document store over the `ai_asset_documentations`, `ai_asset_sets` and
/// `ai_solutions` tables
///
/// One connection is shared behind a mutex; SQLite serializes writers anyway.
pub struct SqliteDocumentStore {
    conn: Mutex<Connection>,
}

impl SqliteDocumentStore {
    /// Open (creating if needed) a database file and bring its schema up to date
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = db::open(path)?;
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = db::open_in_memory()?;
        Self::from_connection(conn)
    }

    /// Configure and migrate an existing connection
    pub fn from_connection(mut conn: Connection) -> Result<Self> {
        db::configure(&conn)?;
        apply_migrations(&mut conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn stored_version(conn: &Connection, asset_id: &str) -> Result<Option<String>> {
        conn.query_row(
            "SELECT assetVersion FROM ai_asset_documentations WHERE id = ?1",
            [asset_id],
            |row| row.get(0),
        )
        .optional()
        .map_err(from_rusqlite)
    }

    fn count(conn: &Connection, sql: &str, params: impl rusqlite::Params) -> Result<i64> {
        conn.query_row(sql, params, |row| row.get(0))
            .map_err(from_rusqlite)
    }

    fn read_solution(conn: &Connection, solution_id: &str) -> Result<SolutionDetail> {
        let (summary, meta) = conn
            .query_row(
                "SELECT id, solutionName, solutionVersion, solutionMeta
                 FROM ai_solutions WHERE id = ?1",
                [solution_id],
                |row| Ok((solution_summary(row)?, row.get::<_, String>(3)?)),
            )
            .optional()
            .map_err(from_rusqlite)?
            .ok_or_else(|| invalid_solution(solution_id))?;
        SolutionDetail::from_stored(summary, meta)
    }
}

fn solution_summary(row: &Row<'_>) -> rusqlite::Result<SolutionSummary> {
    Ok(SolutionSummary {
        solution_id: row.get(0)?,
        solution_name: row.get(1)?,
        solution_version: row.get(2)?,
    })
}

fn asset_set(row: &Row<'_>) -> rusqlite::Result<AssetSetRecord> {
    Ok(AssetSetRecord {
        asset_set_id: row.get(0)?,
        solution_id: row.get(1)?,
        asset_set_name: row.get(2)?,
    })
}

impl DocumentStore for SqliteDocumentStore {
    fn load(&self, asset_id: &str) -> Result<StoredDocument> {
        let conn = self.conn.lock();
        conn.query_row(
            "SELECT assetContent, assetVersion FROM ai_asset_documentations WHERE id = ?1",
            [asset_id],
            |row| {
                Ok(StoredDocument {
                    content: row.get(0)?,
                    version: row.get(1)?,
                })
            },
        )
        .optional()
        .map_err(from_rusqlite)?
        .ok_or_else(|| asset_not_found(asset_id))
    }

    fn save(&self, asset_id: &str, content: &str, expected_version: &str) -> Result<String> {
        let conn = self.conn.lock();
        let new_version = mint_version();

        let updated = conn
            .execute(
                "UPDATE ai_asset_documentations
                 SET assetContent = ?1, assetVersion = ?2
                 WHERE id = ?3 AND assetVersion = ?4",
                rusqlite::params![content, new_version, asset_id, expected_version],
            )
            .map_err(from_rusqlite)?;

        if updated == 0 {
            return match Self::stored_version(&conn, asset_id)? {
                Some(stored) => Err(version_conflict(asset_id, &stored, expected_version)),
                None => Err(asset_not_found(asset_id)),
            };
        }

        tracing::debug!(asset_id, version = %new_version, "saved document");
        Ok(new_version)
    }

    fn create(&self, asset: NewAsset<'_>) -> Result<AssetRecord> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction().map_err(from_rusqlite)?;

        let set_exists = Self::count(
            &tx,
            "SELECT COUNT(*) FROM ai_asset_sets WHERE id = ?1",
            [asset.asset_set_id],
        )?;
        if set_exists != 1 {
            return Err(invalid_asset_set(asset.asset_set_id));
        }

        let taken = Self::count(
            &tx,
            "SELECT COUNT(*) FROM ai_asset_documentations WHERE assetName = ?1",
            [asset.asset_name],
        )?;
        if taken > 0 {
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
        tx.execute(
            "INSERT INTO ai_asset_documentations
             (id, assetSetId, assetType, assetName, assetContent, assetVersion)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            rusqlite::params![
                record.asset_id,
                record.asset_set_id,
                record.asset_type,
                record.asset_name,
                record.content,
                record.asset_version,
            ],
        )
        .map_err(from_rusqlite)?;
        tx.commit().map_err(from_rusqlite)?;

        tracing::debug!(asset_id = %record.asset_id, asset_name = %record.asset_name, "created asset");
        Ok(record)
    }

    fn get_asset(&self, asset_id: &str) -> Result<AssetRecord> {
        let conn = self.conn.lock();
        conn.query_row(
            "SELECT id, assetSetId, assetType, assetName, assetContent, assetVersion
             FROM ai_asset_documentations WHERE id = ?1",
            [asset_id],
            |row| {
                Ok(AssetRecord {
                    asset_id: row.get(0)?,
                    asset_set_id: row.get(1)?,
                    asset_type: row.get(2)?,
                    asset_name: row.get(3)?,
                    content: row.get(4)?,
                    asset_version: row.get(5)?,
                })
            },
        )
        .optional()
        .map_err(from_rusqlite)?
        .ok_or_else(|| asset_not_found(asset_id))
    }

    fn list(&self, asset_set_id: Option<&str>) -> Result<Vec<AssetSummary>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare(
                "SELECT id, assetSetId, assetType, assetName, assetVersion
                 FROM ai_asset_documentations
                 WHERE ?1 IS NULL OR assetSetId = ?1
                 ORDER BY assetName, id",
            )
            .map_err(from_rusqlite)?;

        let rows = stmt
            .query_map([asset_set_id], |row| {
                Ok(AssetSummary {
                    asset_id: row.get(0)?,
                    asset_set_id: row.get(1)?,
                    asset_type: row.get(2)?,
                    asset_name: row.get(3)?,
                    asset_version: row.get(4)?,
                })
            })
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(from_rusqlite)?;

        Ok(rows)
    }

    fn create_solution(&self, solution_name: &str) -> Result<SolutionDetail> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction().map_err(from_rusqlite)?;

        let taken = Self::count(
            &tx,
            "SELECT COUNT(*) FROM ai_solutions WHERE solutionName = ?1",
            [solution_name],
        )?;
        if taken > 0 {
            return Err(duplicate_solution_name(solution_name));
        }

        let solution_id = uuid::Uuid::new_v4().to_string();
        tx.execute(
            "INSERT INTO ai_solutions (id, solutionName, solutionMeta, solutionVersion)
             VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![solution_id, solution_name, EMPTY_SOLUTION_META, mint_version()],
        )
        .map_err(from_rusqlite)?;
        let detail = Self::read_solution(&tx, &solution_id)?;
        tx.commit().map_err(from_rusqlite)?;

        tracing::debug!(solution_id = %solution_id, solution_name, "created solution");
        Ok(detail)
    }

    fn list_solutions(&self) -> Result<Vec<SolutionSummary>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare(
                "SELECT id, solutionName, solutionVersion
                 FROM ai_solutions
                 ORDER BY solutionName, id",
            )
            .map_err(from_rusqlite)?;

        let rows = stmt
            .query_map([], solution_summary)
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(from_rusqlite)?;
        Ok(rows)
    }

    fn get_solution(&self, solution_id: &str) -> Result<SolutionDetail> {
        let conn = self.conn.lock();
        Self::read_solution(&conn, solution_id)
    }

    fn submit_solution_meta(
        &self,
        solution_id: &str,
        solution_meta: &RawValue,
        expected_version: &str,
    ) -> Result<SolutionDetail> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction().map_err(from_rusqlite)?;

        let updated = tx
            .execute(
                "UPDATE ai_solutions
                 SET solutionMeta = ?1, solutionVersion = ?2
                 WHERE id = ?3 AND solutionVersion = ?4",
                rusqlite::params![solution_meta.get(), mint_version(), solution_id, expected_version],
            )
            .map_err(from_rusqlite)?;
        if updated == 0 {
            let stored = Self::read_solution(&tx, solution_id)?;
            return Err(solution_version_conflict(
                solution_id,
                &stored.summary.solution_version,
                expected_version,
            ));
        }

        let detail = Self::read_solution(&tx, solution_id)?;
        tx.commit().map_err(from_rusqlite)?;
        Ok(detail)
    }

    fn create_asset_set(&self, solution_id: &str, asset_set_name: &str) -> Result<AssetSetRecord> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction().map_err(from_rusqlite)?;

        let solution_exists = Self::count(
            &tx,
            "SELECT COUNT(*) FROM ai_solutions WHERE id = ?1",
            [solution_id],
        )?;
        if solution_exists == 0 {
            return Err(invalid_solution(solution_id));
        }

        let taken = Self::count(
            &tx,
            "SELECT COUNT(*) FROM ai_asset_sets WHERE solutionId = ?1 AND assetSetName = ?2",
            [solution_id, asset_set_name],
        )?;
        if taken > 0 {
            return Err(duplicate_asset_set_name(asset_set_name));
        }

        let record = AssetSetRecord {
            asset_set_id: uuid::Uuid::new_v4().to_string(),
            solution_id: solution_id.to_string(),
            asset_set_name: asset_set_name.to_string(),
        };
        tx.execute(
            "INSERT INTO ai_asset_sets (id, solutionId, assetSetName) VALUES (?1, ?2, ?3)",
            rusqlite::params![record.asset_set_id, record.solution_id, record.asset_set_name],
        )
        .map_err(from_rusqlite)?;
        tx.commit().map_err(from_rusqlite)?;

        tracing::debug!(asset_set_id = %record.asset_set_id, solution_id, "created asset set");
        Ok(record)
    }

    fn list_asset_sets(&self, solution_id: Option<&str>) -> Result<Vec<AssetSetRecord>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare(
                "SELECT id, solutionId, assetSetName
                 FROM ai_asset_sets
                 WHERE ?1 IS NULL OR solutionId = ?1
                 ORDER BY assetSetName, id",
            )
            .map_err(from_rusqlite)?;

        let rows = stmt
            .query_map([solution_id], asset_set)
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(from_rusqlite)?;
        Ok(rows)
    }

    fn find_asset_set(&self, asset_set_id: &str) -> Result<Option<AssetSetRecord>> {
        let conn = self.conn.lock();
        conn.query_row(
            "SELECT id, solutionId, assetSetName FROM ai_asset_sets WHERE id = ?1",
            [asset_set_id],
            asset_set,
        )
        .optional()
        .map_err(from_rusqlite)
    }
}
