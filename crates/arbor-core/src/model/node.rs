use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::value::RawValue;

use crate::errors::{ArborError, Result};

/// Behaviour-tree node kind
///
/// Serialized with the `bt_*` strings that stored documents already use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeType {
    #[serde(rename = "bt_root")]
    Root,
    #[serde(rename = "bt_selector")]
    Selector,
    #[serde(rename = "bt_sequence")]
    Sequence,
    #[serde(rename = "bt_task")]
    Task,
}

impl NodeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeType::Root => "bt_root",
            NodeType::Selector => "bt_selector",
            NodeType::Sequence => "bt_sequence",
            NodeType::Task => "bt_task",
        }
    }

    /// Parse a wire name such as `bt_task`
    ///
    /// # Errors
    ///
    /// Returns `InvalidNodeType` for any name outside the four known kinds.
    pub fn parse(name: &str) -> Result<Self> {
        match name {
            "bt_root" => Ok(NodeType::Root),
            "bt_selector" => Ok(NodeType::Selector),
            "bt_sequence" => Ok(NodeType::Sequence),
            "bt_task" => Ok(NodeType::Task),
            other => Err(ArborError::InvalidNodeType {
                node_type: other.to_string(),
            }),
        }
    }

    /// Kinds a client may create; the root only exists from document initialization
    pub fn is_creatable(&self) -> bool {
        !matches!(self, NodeType::Root)
    }
}

impl std::fmt::Display for NodeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canvas position; `x` doubles as the sibling sort key
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Both coordinates are finite
    ///
    /// JSON has no encoding for `NaN` or infinities, so a document holding
    /// one could never be loaded again.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Opaque settings payload owned by editor clients
///
/// The text is kept exactly as received so that persisting a document never
/// reformats a client's settings.
#[derive(Debug, Clone)]
pub struct NodeSettings(Box<RawValue>);

impl NodeSettings {
    /// Wrap a JSON text, checking only that it is well-formed
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` when `json` is not valid JSON.
    pub fn from_json(json: impl Into<String>) -> Result<Self> {
        RawValue::from_string(json.into())
            .map(NodeSettings)
            .map_err(|e| ArborError::InvalidInput {
                reason: format!("node settings are not valid JSON: {}", e),
            })
    }

    pub fn as_str(&self) -> &str {
        self.0.get()
    }
}

impl PartialEq for NodeSettings {
    fn eq(&self, other: &Self) -> bool {
        self.0.get() == other.0.get()
    }
}

impl Serialize for NodeSettings {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for NodeSettings {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        Box::<RawValue>::deserialize(deserializer).map(NodeSettings)
    }
}

/// One behaviour-tree node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,

    /// Empty when detached; always empty for the root
    #[serde(rename = "parentId", default)]
    pub parent_id: String,

    pub position: Position,

    #[serde(rename = "type")]
    pub node_type: NodeType,

    /// Rank among siblings, `-1` while detached
    #[serde(default = "detached_order")]
    pub order: i32,

    #[serde(default)]
    pub data: Option<NodeSettings>,
}

/// Order value of a node with no parent
pub const DETACHED_ORDER: i32 = -1;

fn detached_order() -> i32 {
    DETACHED_ORDER
}

impl Node {
    /// A freshly created, detached node with a new id
    pub fn new_detached(node_type: NodeType, position: Position, data: Option<NodeSettings>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            parent_id: String::new(),
            position,
            node_type,
            order: DETACHED_ORDER,
            data,
        }
    }

    pub fn is_root(&self) -> bool {
        self.node_type == NodeType::Root
    }

    pub fn is_detached(&self) -> bool {
        self.parent_id.is_empty()
    }

    pub(crate) fn detach(&mut self) {
        self.parent_id.clear();
        self.order = DETACHED_ORDER;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_type_wire_names() {
        for t in [
            NodeType::Root,
            NodeType::Selector,
            NodeType::Sequence,
            NodeType::Task,
        ] {
            assert_eq!(NodeType::parse(t.as_str()).unwrap(), t);
            assert_eq!(
                serde_json::to_string(&t).unwrap(),
                format!("\"{}\"", t.as_str())
            );
        }
    }

    #[test]
    fn test_unknown_node_type_rejected() {
        let err = NodeType::parse("bt_simpleParallel").unwrap_err();
        assert!(matches!(err, ArborError::InvalidNodeType { .. }));
    }

    #[test]
    fn test_settings_text_preserved_verbatim() {
        let raw = r#"{ "speed" : 3.50, "tag":"x" }"#;
        let settings = NodeSettings::from_json(raw).unwrap();
        assert_eq!(settings.as_str(), raw);
    }

    #[test]
    fn test_settings_rejects_malformed_json() {
        assert!(NodeSettings::from_json("{not json").is_err());
    }

    #[test]
    fn test_node_defaults_when_fields_missing() {
        let json = r#"{"id":"n1","position":{"x":1,"y":2},"type":"bt_task"}"#;
        let node: Node = serde_json::from_str(json).unwrap();
        assert!(node.is_detached());
        assert_eq!(node.order, DETACHED_ORDER);
        assert!(node.data.is_none());
    }

    #[test]
    fn test_new_detached_has_fresh_id() {
        let a = Node::new_detached(NodeType::Task, Position::default(), None);
        let b = Node::new_detached(NodeType::Task, Position::default(), None);
        assert_ne!(a.id, b.id);
        assert_eq!(a.order, DETACHED_ORDER);
    }
}
