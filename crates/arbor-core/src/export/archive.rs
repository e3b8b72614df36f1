//! Archive export of behaviour-tree assets.
//!
//! The archive flattens each node into a single JSON object: the structural
//! fields (`id`, `type`, `order`, `parentId`) plus every key of its settings
//! object. Settings keys win on collision.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::{ArborError, Result};
use crate::model::{AssetType, Document, Node};

/// Stored asset fields the archive is built from
#[derive(Debug, Clone, Copy)]
pub struct ArchiveSource<'a> {
    pub asset_id: &'a str,
    pub asset_name: &'a str,
    pub asset_version: &'a str,
    pub asset_type: &'a str,
    pub content: &'a str,
}

/// Exported form of one behaviour-tree asset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchivedTree {
    pub asset_name: String,
    pub asset_id: String,
    pub asset_version: String,
    /// JSON array text of flattened nodes
    pub behaviour_tree_nodes: String,
    pub behaviour_tree_descriptors: String,
    pub behaviour_tree_services: String,
}

/// Exported form of one asset set: every behaviour tree it holds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetSetArchive {
    pub asset_set_name: String,
    pub asset_set_id: String,
    pub behaviour_tree_assets: Vec<ArchivedTree>,
}

/// Build the archive of a behaviour-tree asset
///
/// # Errors
/// * `UnexpectedAssetType` - If the asset is not a behaviour tree
/// * `Deserialization` - If the content or a node's settings cannot be read
/// * `Serialization` - If the flattened nodes cannot be encoded
pub fn archive_behaviour_tree(source: ArchiveSource<'_>) -> Result<ArchivedTree> {
    let expected = AssetType::BehaviourTree.as_str();
    if source.asset_type != expected {
        return Err(ArborError::UnexpectedAssetType {
            found: source.asset_type.to_string(),
            expected: expected.to_string(),
        });
    }

    let doc = Document::from_json(source.content)?;
    let flattened = doc
        .nodes
        .iter()
        .map(flatten_node)
        .collect::<Result<Vec<_>>>()?;
    let nodes_json = serde_json::to_string(&flattened)?;

    Ok(ArchivedTree {
        asset_name: source.asset_name.to_string(),
        asset_id: source.asset_id.to_string(),
        asset_version: source.asset_version.to_string(),
        behaviour_tree_nodes: nodes_json,
        behaviour_tree_descriptors: "[]".to_string(),
        behaviour_tree_services: "[]".to_string(),
    })
}

fn flatten_node(node: &Node) -> Result<Map<String, Value>> {
    let mut flat = Map::new();
    flat.insert("id".to_string(), Value::from(node.id.clone()));
    flat.insert("type".to_string(), Value::from(node.node_type.as_str()));
    flat.insert("order".to_string(), Value::from(node.order));
    flat.insert("parentId".to_string(), Value::from(node.parent_id.clone()));

    if let Some(settings) = &node.data {
        let value: Value =
            serde_json::from_str(settings.as_str()).map_err(|e| ArborError::Deserialization {
                message: format!("settings of node {}: {}", node.id, e),
            })?;
        match value {
            Value::Null => {}
            Value::Object(fields) => flat.extend(fields),
            other => {
                return Err(ArborError::Deserialization {
                    message: format!(
                        "settings of node {} must be an object, found {}",
                        node.id, other
                    ),
                })
            }
        }
    }

    Ok(flat)
}
