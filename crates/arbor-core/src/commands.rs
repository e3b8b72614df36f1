//! Mutation commands accepted by [`crate::apply`].
//!
//! The serde layout matches the request bodies editor clients already send,
//! so a request payload can be deserialized straight into a [`Mutation`].

use serde::{Deserialize, Serialize};

use crate::model::{NodeSettings, NodeType, Position};

/// Target position for one node of a move batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeMovement {
    pub node_id: String,
    pub to_position: Position,
}

impl NodeMovement {
    pub fn new(node_id: impl Into<String>, x: f32, y: f32) -> Self {
        Self {
            node_id: node_id.into(),
            to_position: Position::new(x, y),
        }
    }
}

/// One structural edit of a behaviour-tree document
///
/// Externally tagged (`{"create_node": {...}}`) so that settings payloads are
/// read straight from the request text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mutation {
    /// Add a detached node
    #[serde(rename_all = "camelCase")]
    CreateNode {
        node_type: NodeType,
        position: Position,
        #[serde(default)]
        initial_settings: Option<NodeSettings>,
    },

    /// Reposition nodes; unknown ids are skipped
    #[serde(rename_all = "camelCase")]
    MoveNodes { movements: Vec<NodeMovement> },

    /// Delete nodes and detach their children
    #[serde(rename_all = "camelCase")]
    RemoveNodes { node_ids: Vec<String> },

    /// Attach `child_id` under `parent_id`
    ConnectNode {
        #[serde(rename = "parentNodeId")]
        parent_id: String,
        #[serde(rename = "childNodeId")]
        child_id: String,
    },

    /// Detach nodes from their parents
    DisconnectNodes {
        #[serde(rename = "childNodeIds")]
        node_ids: Vec<String>,
    },

    /// Replace a node's settings payload
    #[serde(rename_all = "camelCase")]
    UpdateNodeSettings {
        node_id: String,
        settings: Option<NodeSettings>,
    },
}

impl Mutation {
    /// Operation name used in logs and error context
    pub fn op_name(&self) -> &'static str {
        match self {
            Mutation::CreateNode { .. } => "create_node",
            Mutation::MoveNodes { .. } => "move_nodes",
            Mutation::RemoveNodes { .. } => "remove_nodes",
            Mutation::ConnectNode { .. } => "connect_node",
            Mutation::DisconnectNodes { .. } => "disconnect_nodes",
            Mutation::UpdateNodeSettings { .. } => "update_node_settings",
        }
    }
}
