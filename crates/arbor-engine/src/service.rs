//! Request-facing entry points of the editor backend.
//!
//! The six node mutations go through the [`VersionGate`]. Registry calls for
//! solutions, asset sets and assets serialize on their class locks instead,
//! taken in the order documented on [`LockManager`].

#![allow(clippy::result_large_err)]

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use arbor_core::export::{archive_behaviour_tree, ArchiveSource, ArchivedTree, AssetSetArchive};
use arbor_core::model::{AssetType, Node, NodeSettings, NodeType, Position};
use arbor_core::rules::{check_document, IntegrityIssue};
use arbor_core::{
    log_op_end, log_op_error, log_op_start, ArborError, ExError, Mutation, NodeMovement,
};
use arbor_core_types::RequestContext;
use arbor_store::errors::Result;
use arbor_store::{
    AssetDetail, AssetRecord, AssetSetRecord, AssetSummary, DocumentStore, NewAsset,
    SolutionDetail, SolutionSummary,
};
use serde_json::value::RawValue;

use crate::gate::{with_context, Modification, VersionGate};
use crate::locks::{EntityClass, LockManager};

pub struct EditorService {
    store: Arc<dyn DocumentStore>,
    locks: Arc<LockManager>,
    gate: VersionGate,
}

impl EditorService {
    pub fn new(store: Arc<dyn DocumentStore>, locks: Arc<LockManager>) -> Self {
        let gate = VersionGate::new(Arc::clone(&store), Arc::clone(&locks));
        Self { store, locks, gate }
    }

    pub fn gate(&self) -> &VersionGate {
        &self.gate
    }

    pub fn create_node(
        &self,
        ctx: &RequestContext,
        asset_id: &str,
        current_version: &str,
        node_type: NodeType,
        position: Position,
        initial_settings: Option<NodeSettings>,
    ) -> Result<Modification> {
        self.gate.mutate(
            ctx,
            asset_id,
            current_version,
            Mutation::CreateNode {
                node_type,
                position,
                initial_settings,
            },
        )
    }

    pub fn move_nodes(
        &self,
        ctx: &RequestContext,
        asset_id: &str,
        current_version: &str,
        movements: Vec<NodeMovement>,
    ) -> Result<Modification> {
        self.gate.mutate(
            ctx,
            asset_id,
            current_version,
            Mutation::MoveNodes { movements },
        )
    }

    pub fn remove_nodes(
        &self,
        ctx: &RequestContext,
        asset_id: &str,
        current_version: &str,
        node_ids: Vec<String>,
    ) -> Result<Modification> {
        self.gate.mutate(
            ctx,
            asset_id,
            current_version,
            Mutation::RemoveNodes { node_ids },
        )
    }

    pub fn connect_node(
        &self,
        ctx: &RequestContext,
        asset_id: &str,
        current_version: &str,
        parent_id: &str,
        child_id: &str,
    ) -> Result<Modification> {
        self.gate.mutate(
            ctx,
            asset_id,
            current_version,
            Mutation::ConnectNode {
                parent_id: parent_id.to_string(),
                child_id: child_id.to_string(),
            },
        )
    }

    pub fn disconnect_nodes(
        &self,
        ctx: &RequestContext,
        asset_id: &str,
        current_version: &str,
        node_ids: Vec<String>,
    ) -> Result<Modification> {
        self.gate.mutate(
            ctx,
            asset_id,
            current_version,
            Mutation::DisconnectNodes { node_ids },
        )
    }

    pub fn update_node_settings(
        &self,
        ctx: &RequestContext,
        asset_id: &str,
        current_version: &str,
        node_id: &str,
        settings: Option<NodeSettings>,
    ) -> Result<Modification> {
        self.gate.mutate(
            ctx,
            asset_id,
            current_version,
            Mutation::UpdateNodeSettings {
                node_id: node_id.to_string(),
                settings,
            },
        )
    }

    pub fn get_node(&self, ctx: &RequestContext, asset_id: &str, node_id: &str) -> Result<Node> {
        self.gate.read_node(ctx, asset_id, node_id)
    }

    /// Register a solution with empty meta
    ///
    /// # Errors
    /// * `InvalidInput` - If the name is empty
    /// * `DuplicateSolutionName` - If the name is taken
    pub fn create_solution(&self, ctx: &RequestContext, solution_name: &str) -> Result<SolutionDetail> {
        observed(ctx, "create_solution", None, || {
            require_name("solution name", solution_name)?;
            let _guard = self.locks.write_class(EntityClass::Solutions);
            self.store.create_solution(solution_name)
        })
    }

    pub fn list_solutions(&self) -> Result<Vec<SolutionSummary>> {
        let _guard = self.locks.read_class(EntityClass::Solutions);
        self.store.list_solutions()
    }

    pub fn get_solution(&self, ctx: &RequestContext, solution_id: &str) -> Result<SolutionDetail> {
        observed(ctx, "get_solution", None, || {
            let _guard = self.locks.read_class(EntityClass::Solutions);
            self.store.get_solution(solution_id)
        })
    }

    /// Replace a solution's meta blob if `current_version` is still current
    ///
    /// # Errors
    /// * `InvalidInput` - If `solution_meta` is not valid JSON
    /// * `InvalidSolution` - If the solution does not exist
    /// * `SolutionVersionConflict` - If `current_version` is stale
    pub fn submit_solution_meta(
        &self,
        ctx: &RequestContext,
        solution_id: &str,
        current_version: &str,
        solution_meta: &str,
    ) -> Result<SolutionDetail> {
        observed(ctx, "submit_solution_meta", None, || {
            let meta = RawValue::from_string(solution_meta.to_string()).map_err(|e| {
                ArborError::InvalidInput {
                    reason: format!("solution meta is not valid JSON: {}", e),
                }
            })?;

            let _guard = self.locks.write_class(EntityClass::Solutions);
            self.store
                .submit_solution_meta(solution_id, &meta, current_version)
        })
    }

    /// Register an asset set inside an existing solution
    ///
    /// # Errors
    /// * `InvalidInput` - If the name is empty
    /// * `InvalidSolution` - If the solution does not exist
    /// * `DuplicateAssetSetName` - If the solution already has a set with this name
    pub fn create_asset_set(
        &self,
        ctx: &RequestContext,
        solution_id: &str,
        asset_set_name: &str,
    ) -> Result<AssetSetRecord> {
        observed(ctx, "create_asset_set", None, || {
            require_name("asset set name", asset_set_name)?;
            let _solutions = self.locks.read_class(EntityClass::Solutions);
            let _sets = self.locks.write_class(EntityClass::AssetSets);
            self.store.create_asset_set(solution_id, asset_set_name)
        })
    }

    pub fn list_asset_sets(&self, solution_id: Option<&str>) -> Result<Vec<AssetSetRecord>> {
        let _guard = self.locks.read_class(EntityClass::AssetSets);
        self.store.list_asset_sets(solution_id)
    }

    /// Register a new asset with its initial content
    ///
    /// # Errors
    /// * `InvalidInput` - If the asset type is not supported or the name is empty
    /// * `InvalidAssetSet` - If the asset set does not exist
    /// * `AlreadyExists` - If the asset name is taken
    pub fn create_asset(
        &self,
        ctx: &RequestContext,
        asset_set_id: &str,
        asset_type: &str,
        asset_name: &str,
    ) -> Result<AssetRecord> {
        observed(ctx, "create_asset", None, || {
            require_name("asset name", asset_name)?;
            let asset_type = AssetType::parse(asset_type)?;
            let content = asset_type.initial_content()?;

            let _sets = self.locks.read_class(EntityClass::AssetSets);
            let _guard = self.locks.write_class(EntityClass::Assets);
            self.store.create(NewAsset {
                asset_set_id,
                asset_type: asset_type.as_str(),
                asset_name,
                content: &content,
            })
        })
    }

    pub fn list_assets(&self, asset_set_id: Option<&str>) -> Result<Vec<AssetSummary>> {
        let _guard = self.locks.read_class(EntityClass::Assets);
        self.store.list(asset_set_id)
    }

    /// Full stored asset: content and the version to mutate against
    ///
    /// # Errors
    /// * `NotFound` - If the asset does not exist
    pub fn read_asset(&self, ctx: &RequestContext, asset_id: &str) -> Result<AssetDetail> {
        observed(ctx, "read_asset", Some(asset_id), || {
            let _guard = self.locks.read_asset(asset_id);
            self.store.get_asset(asset_id).map(AssetDetail::from)
        })
    }

    /// Flatten a behaviour tree into its archive form
    ///
    /// # Errors
    /// * `NotFound` - If the asset does not exist
    /// * `UnexpectedAssetType` - If the asset is not a behaviour tree
    pub fn export_asset(&self, ctx: &RequestContext, asset_id: &str) -> Result<ArchivedTree> {
        observed(ctx, "export_asset", Some(asset_id), || {
            self.archive_asset(asset_id)
        })
    }

    /// Archive every behaviour tree of the requested asset sets
    ///
    /// Archives follow request order. Unknown or repeated set ids are skipped.
    ///
    /// # Errors
    /// * `InvalidInput` - If no set id is given
    /// * `UnexpectedAssetType` - If a requested set holds a non-tree asset
    pub fn export_asset_sets(
        &self,
        ctx: &RequestContext,
        asset_set_ids: &[String],
    ) -> Result<Vec<AssetSetArchive>> {
        observed(ctx, "export_asset_sets", None, || {
            if asset_set_ids.is_empty() {
                return Err(ArborError::InvalidInput {
                    reason: "no asset set ids given".to_string(),
                }
                .into());
            }

            let _sets = self.locks.read_class(EntityClass::AssetSets);
            let _assets = self.locks.read_class(EntityClass::Assets);

            let mut seen = HashSet::new();
            let mut archives = Vec::new();
            for asset_set_id in asset_set_ids {
                if !seen.insert(asset_set_id.as_str()) {
                    continue;
                }
                let Some(set) = self.store.find_asset_set(asset_set_id)? else {
                    continue;
                };

                let behaviour_tree_assets = self
                    .store
                    .list(Some(set.asset_set_id.as_str()))?
                    .iter()
                    .map(|summary| self.archive_asset(&summary.asset_id))
                    .collect::<Result<Vec<_>>>()?;
                archives.push(AssetSetArchive {
                    asset_set_name: set.asset_set_name,
                    asset_set_id: set.asset_set_id,
                    behaviour_tree_assets,
                });
            }
            Ok(archives)
        })
    }

    fn archive_asset(&self, asset_id: &str) -> Result<ArchivedTree> {
        let _guard = self.locks.read_asset(asset_id);
        let record = self.store.get_asset(asset_id)?;
        archive_behaviour_tree(ArchiveSource {
            asset_id: &record.asset_id,
            asset_name: &record.asset_name,
            asset_version: &record.asset_version,
            asset_type: &record.asset_type,
            content: &record.content,
        })
        .map_err(|err| ExError::from(err).with_asset_id(asset_id))
    }

    /// Structural diagnostics for a stored behaviour tree
    pub fn check_asset(&self, ctx: &RequestContext, asset_id: &str) -> Result<Vec<IntegrityIssue>> {
        observed(ctx, "check_asset", Some(asset_id), || {
            let (document, _) = self.gate.read_document(asset_id)?;
            Ok(check_document(&document))
        })
    }
}

fn require_name(field: &str, value: &str) -> std::result::Result<(), ArborError> {
    if value.trim().is_empty() {
        return Err(ArborError::InvalidInput {
            reason: format!("{} must not be empty", field),
        });
    }
    Ok(())
}

/// Wrap a registry call in the start/end lifecycle events
fn observed<T>(
    ctx: &RequestContext,
    op: &'static str,
    asset_id: Option<&str>,
    call: impl FnOnce() -> Result<T>,
) -> Result<T> {
    let span = tracing::info_span!("editor_service", request_id = %ctx.request_id);
    let _entered = span.enter();

    let start = Instant::now();
    log_op_start!(op, asset_id = asset_id.unwrap_or_default());
    let result = call();
    let duration_ms = start.elapsed().as_millis() as u64;

    match result {
        Ok(value) => {
            log_op_end!(op, duration_ms = duration_ms);
            Ok(value)
        }
        Err(err) => {
            let err = with_context(err, op, asset_id, ctx);
            log_op_error!(op, err.clone(), duration_ms = duration_ms);
            Err(err)
        }
    }
}
