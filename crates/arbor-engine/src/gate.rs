//! Versioned load-mutate-save cycle for one asset.
//!
//! Per call:
//! 1. Take the asset's exclusive lock (shared for reads)
//! 2. Load content and version; a missing asset is `NotFound`
//! 3. Refuse a stale caller version with `VersionConflict`
//! 4. Parse the document and apply the mutation
//! 5. Zero diffs: report the unchanged version, nothing is written
//! 6. Otherwise stamp, serialize and save against the loaded version
//!
//! The lock guard is dropped on every exit path.

#![allow(clippy::result_large_err)]

use std::sync::Arc;
use std::time::Instant;

use arbor_core::errors::ExError;
use arbor_core::model::{Document, Node};
use arbor_core::ops::get_node;
use arbor_core::{apply, log_op_end, log_op_error, log_op_start, Applied, Mutation, NodeDiff};
use arbor_core_types::RequestContext;
use arbor_store::errors::{version_conflict, Result};
use arbor_store::DocumentStore;
use serde::Serialize;

use crate::locks::LockManager;

/// Outcome of one gated mutation
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Modification {
    #[serde(rename = "diffNodesInfos")]
    pub diffs: Vec<NodeDiff>,
    pub prev_version: String,
    pub new_version: String,
}

impl Modification {
    /// True when nothing was persisted
    pub fn is_noop(&self) -> bool {
        self.prev_version == self.new_version
    }
}

pub struct VersionGate {
    store: Arc<dyn DocumentStore>,
    locks: Arc<LockManager>,
}

impl VersionGate {
    pub fn new(store: Arc<dyn DocumentStore>, locks: Arc<LockManager>) -> Self {
        Self { store, locks }
    }

    /// Apply `mutation` to the asset if `current_version` is still current
    ///
    /// # Errors
    /// * `NotFound` - If the asset does not exist
    /// * `VersionConflict` - If `current_version` is stale
    /// * `Deserialization` - If the stored content is corrupt
    /// * Any validation error of the mutation itself
    pub fn mutate(
        &self,
        ctx: &RequestContext,
        asset_id: &str,
        current_version: &str,
        mutation: Mutation,
    ) -> Result<Modification> {
        let op = mutation.op_name();
        let span = tracing::info_span!("version_gate", request_id = %ctx.request_id, asset_id);
        let _entered = span.enter();

        let start = Instant::now();
        log_op_start!(op, asset_id = asset_id);

        let result = {
            let _guard = self.locks.write_asset(asset_id);
            self.mutate_locked(asset_id, current_version, mutation)
        };

        let duration_ms = start.elapsed().as_millis() as u64;
        match result {
            Ok(modification) => {
                log_op_end!(
                    op,
                    duration_ms = duration_ms,
                    asset_id = asset_id,
                    diff_count = modification.diffs.len(),
                    new_version = modification.new_version.as_str()
                );
                Ok(modification)
            }
            Err(err) => {
                let err = with_context(err, op, Some(asset_id), ctx);
                log_op_error!(op, err.clone(), duration_ms = duration_ms, asset_id = asset_id);
                Err(err)
            }
        }
    }

    fn mutate_locked(
        &self,
        asset_id: &str,
        current_version: &str,
        mutation: Mutation,
    ) -> Result<Modification> {
        let stored = self.store.load(asset_id)?;
        if stored.version != current_version {
            return Err(version_conflict(asset_id, &stored.version, current_version));
        }

        let document = Document::from_json(&stored.content)?;
        let Applied {
            mut document,
            diffs,
        } = apply(document, mutation)?;

        if diffs.is_empty() {
            return Ok(Modification {
                diffs,
                new_version: stored.version.clone(),
                prev_version: stored.version,
            });
        }

        document.touch();
        let content = document.to_json()?;
        let new_version = self.store.save(asset_id, &content, &stored.version)?;

        Ok(Modification {
            diffs,
            prev_version: stored.version,
            new_version,
        })
    }

    /// Read one node under the asset's shared lock
    ///
    /// # Errors
    /// * `NotFound` - If the asset or the node does not exist
    pub fn read_node(&self, ctx: &RequestContext, asset_id: &str, node_id: &str) -> Result<Node> {
        let span = tracing::info_span!("version_gate", request_id = %ctx.request_id, asset_id);
        let _entered = span.enter();

        let result = self
            .read_document(asset_id)
            .and_then(|(document, _)| Ok(get_node(&document, node_id)?));
        result.map_err(|err| with_context(err, "get_node", Some(asset_id), ctx))
    }

    /// Load and parse a document under the asset's shared lock
    pub(crate) fn read_document(&self, asset_id: &str) -> Result<(Document, String)> {
        let _guard = self.locks.read_asset(asset_id);
        let stored = self.store.load(asset_id)?;
        let document = Document::from_json(&stored.content)?;
        Ok((document, stored.version))
    }
}

/// Fill in the caller-facing fields the lower layers do not know
pub(crate) fn with_context(
    err: ExError,
    op: &str,
    asset_id: Option<&str>,
    ctx: &RequestContext,
) -> ExError {
    let err = if err.op().is_none() { err.with_op(op) } else { err };
    let err = match asset_id {
        Some(id) if err.asset_id().is_none() => err.with_asset_id(id),
        _ => err,
    };
    err.with_request_id(ctx.request_id.clone())
}
