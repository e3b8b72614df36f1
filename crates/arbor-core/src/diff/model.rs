//! Per-node before/after snapshots.

use serde::{Deserialize, Serialize};

use crate::model::Node;

/// What happened to one node during a single operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffKind {
    Created,
    Removed,
    Updated,
}

/// Consolidated change of one node for one external call
///
/// `pre` is the node as it was when the call started and `post` is the node
/// as persisted; either side is `None` for creation and removal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDiff {
    #[serde(rename = "modifiedNodeId")]
    pub node_id: String,
    #[serde(rename = "preModifiedNode")]
    pub pre: Option<Node>,
    #[serde(rename = "postModifiedNode")]
    pub post: Option<Node>,
}

impl NodeDiff {
    pub fn created(node: Node) -> Self {
        Self {
            node_id: node.id.clone(),
            pre: None,
            post: Some(node),
        }
    }

    pub fn removed(node: Node) -> Self {
        Self {
            node_id: node.id.clone(),
            pre: Some(node),
            post: None,
        }
    }

    pub fn updated(pre: Node, post: Node) -> Self {
        Self {
            node_id: pre.id.clone(),
            pre: Some(pre),
            post: Some(post),
        }
    }

    pub fn kind(&self) -> DiffKind {
        match (&self.pre, &self.post) {
            (None, _) => DiffKind::Created,
            (Some(_), None) => DiffKind::Removed,
            (Some(_), Some(_)) => DiffKind::Updated,
        }
    }
}
