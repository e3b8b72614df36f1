use arbor_core::model::{Document, Node, NodeType, Position};
use arbor_core::NodeDiff;

/// A fresh document and the id of its root
#[allow(dead_code)]
pub fn new_doc() -> (Document, String) {
    let doc = Document::new_empty();
    let root_id = doc.root().unwrap().id.clone();
    (doc, root_id)
}

/// Insert a node directly, bypassing the mutation operations
#[allow(dead_code)]
pub fn insert_node(
    doc: &mut Document,
    id: &str,
    node_type: NodeType,
    x: f32,
    parent_id: &str,
    order: i32,
) {
    doc.nodes.push(Node {
        id: id.to_string(),
        parent_id: parent_id.to_string(),
        position: Position::new(x, 0.0),
        node_type,
        order,
        data: None,
    });
}

/// Find the diff entry for one node
#[allow(dead_code)]
pub fn diff_for<'a>(diffs: &'a [NodeDiff], node_id: &str) -> &'a NodeDiff {
    diffs
        .iter()
        .find(|d| d.node_id == node_id)
        .unwrap_or_else(|| panic!("no diff for {}", node_id))
}

#[allow(dead_code)]
pub fn order_of(doc: &Document, node_id: &str) -> i32 {
    doc.node(node_id).unwrap().order
}
