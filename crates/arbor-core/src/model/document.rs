use serde::{Deserialize, Deserializer, Serialize};

use super::node::{Node, NodeType, Position};
use crate::errors::{ArborError, Result};

/// Canvas position of the root in a fresh document
pub const ROOT_POSITION: Position = Position { x: 100.0, y: 100.0 };

/// Edge between two nodes (stored, not interpreted)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    pub id: String,
    pub source: String,
    pub target: String,
}

/// Decorator attached to a node (descriptors and services share this shape)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    pub id: String,
    #[serde(rename = "attachTo")]
    pub attach_to: String,
    pub order: i32,
}

/// Persisted behaviour-tree document
///
/// Field names are capitalized because previously stored assets use that
/// layout. `Connections`, `Descriptors` and `Services` are carried through
/// every mutation untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Unix seconds of the last persisted mutation
    #[serde(rename = "ModifyTimeStamp", default)]
    pub modify_timestamp: i64,

    #[serde(rename = "Nodes", default, deserialize_with = "null_as_empty")]
    pub nodes: Vec<Node>,

    #[serde(rename = "Connections", default, deserialize_with = "null_as_empty")]
    pub connections: Vec<Connection>,

    #[serde(rename = "Descriptors", default, deserialize_with = "null_as_empty")]
    pub descriptors: Vec<Attachment>,

    #[serde(rename = "Services", default, deserialize_with = "null_as_empty")]
    pub services: Vec<Attachment>,
}

// Older writers emitted `null` for empty collections.
fn null_as_empty<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<Vec<T>>::deserialize(deserializer).map(Option::unwrap_or_default)
}

impl Document {
    /// A document holding only its root
    ///
    /// This is the only place a root node is ever created.
    pub fn new_empty() -> Self {
        let root = Node {
            id: uuid::Uuid::new_v4().to_string(),
            parent_id: String::new(),
            position: ROOT_POSITION,
            node_type: NodeType::Root,
            order: 0,
            data: None,
        };
        Self {
            modify_timestamp: chrono::Utc::now().timestamp(),
            nodes: vec![root],
            connections: Vec::new(),
            descriptors: Vec::new(),
            services: Vec::new(),
        }
    }

    /// Parse persisted content
    ///
    /// # Errors
    ///
    /// Returns `Deserialization` when the text is not a document.
    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(|e| ArborError::Deserialization {
            message: e.to_string(),
        })
    }

    /// Render persisted content
    ///
    /// # Errors
    ///
    /// Returns `Serialization` if a node cannot be encoded.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| ArborError::Serialization {
            message: e.to_string(),
        })
    }

    pub fn node(&self, node_id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == node_id)
    }

    pub(crate) fn node_mut(&mut self, node_id: &str) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| n.id == node_id)
    }

    pub fn root(&self) -> Option<&Node> {
        self.nodes.iter().find(|n| n.is_root())
    }

    /// Children of `parent_id`, in document order
    pub fn children_of<'a>(&'a self, parent_id: &'a str) -> impl Iterator<Item = &'a Node> + 'a {
        self.nodes.iter().filter(move |n| n.parent_id == parent_id)
    }

    pub fn touch(&mut self) {
        self.modify_timestamp = chrono::Utc::now().timestamp();
    }
}
