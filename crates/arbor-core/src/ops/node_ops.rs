use std::collections::{HashMap, HashSet};

use indexmap::IndexSet;

use super::reorder::mutate_then_reorder;
use crate::commands::NodeMovement;
use crate::diff::{DiffAccumulator, NodeDiff};
use crate::errors::{ArborError, Result};
use crate::model::{Document, Node, NodeSettings, NodeType, Position};

/// Create a detached node
///
/// The new node gets a fresh id, an empty parent and `order = -1`.
///
/// # Errors
/// * `InvalidNodeType` - If `node_type` is the root kind
/// * `InvalidInput` - If a coordinate is `NaN` or infinite
pub fn create_node(
    doc: &mut Document,
    node_type: NodeType,
    position: Position,
    initial_settings: Option<NodeSettings>,
) -> Result<Vec<NodeDiff>> {
    if !node_type.is_creatable() {
        return Err(ArborError::InvalidNodeType {
            node_type: node_type.to_string(),
        });
    }
    check_position("new node", &position)?;

    let node = Node::new_detached(node_type, position, initial_settings);
    doc.nodes.push(node.clone());
    Ok(vec![NodeDiff::created(node)])
}

/// Move nodes to new positions and re-rank their sibling sets
///
/// Ids that do not resolve are skipped so that a retried batch still applies
/// cleanly. When a batch names the same node twice the first entry wins.
/// Every matched node gets a diff, even if its position is unchanged.
///
/// # Errors
/// * `InvalidInput` - If any target has a non-finite coordinate, whether or
///   not its id resolves. Nothing is moved in that case.
pub fn move_nodes(doc: &mut Document, movements: &[NodeMovement]) -> Result<Vec<NodeDiff>> {
    for movement in movements {
        check_position(&format!("node {}", movement.node_id), &movement.to_position)?;
    }

    let mut targets: HashMap<&str, Position> = HashMap::with_capacity(movements.len());
    for movement in movements {
        targets
            .entry(movement.node_id.as_str())
            .or_insert(movement.to_position);
    }

    let diffs = mutate_then_reorder(doc, |doc, diffs| {
        let mut parents = IndexSet::new();
        for node in doc.nodes.iter_mut() {
            if let Some(position) = targets.get(node.id.as_str()) {
                let pre = node.clone();
                node.position = *position;
                if !node.is_detached() {
                    parents.insert(node.parent_id.clone());
                }
                diffs.record_update(pre, node.clone());
            }
        }
        Ok(parents)
    })?;

    Ok(diffs.into_vec())
}

/// Remove nodes, re-rank their former sibling sets and detach their children
///
/// The whole batch is rejected before anything changes if it names the
/// root. Unknown ids are skipped.
///
/// # Errors
/// * `IllegalRemoveRoot` - If any requested id is the root
pub fn remove_nodes(doc: &mut Document, node_ids: &[String]) -> Result<Vec<NodeDiff>> {
    let requested: HashSet<&str> = node_ids.iter().map(String::as_str).collect();

    if let Some(root) = doc
        .nodes
        .iter()
        .find(|n| n.is_root() && requested.contains(n.id.as_str()))
    {
        return Err(ArborError::IllegalRemoveRoot {
            node_id: root.id.clone(),
        });
    }

    let mut removed_ids: Vec<String> = Vec::new();
    let mut diffs = mutate_then_reorder(doc, |doc, diffs| {
        let (removed, kept): (Vec<Node>, Vec<Node>) = std::mem::take(&mut doc.nodes)
            .into_iter()
            .partition(|n| requested.contains(n.id.as_str()));
        doc.nodes = kept;

        let mut parents = IndexSet::new();
        for node in removed {
            // Children of a removed parent are detached below instead.
            if !node.is_detached() && !requested.contains(node.parent_id.as_str()) {
                parents.insert(node.parent_id.clone());
            }
            removed_ids.push(node.id.clone());
            diffs.record(NodeDiff::removed(node));
        }
        Ok(parents)
    })?;

    for removed_id in &removed_ids {
        diffs.merge(detach_children(doc, removed_id));
    }

    Ok(diffs.into_vec())
}

/// Attach `child_id` under `parent_id` and re-rank the new sibling set
///
/// Re-asserting an existing edge changes nothing on the child but still
/// re-ranks its siblings. When the child leaves another parent, that parent's
/// remaining children are re-ranked too.
///
/// Cycles are not checked.
///
/// # Errors
/// * `InvalidParent` - If `parent_id` does not resolve
/// * `InvalidChild` - If `child_id` does not resolve
/// * `InvalidRootForChild` - If the child is the root
/// * `InvalidTaskForParent` - If the parent is a task
pub fn connect_node(doc: &mut Document, parent_id: &str, child_id: &str) -> Result<Vec<NodeDiff>> {
    let parent = doc.node(parent_id).ok_or_else(|| ArborError::InvalidParent {
        node_id: parent_id.to_string(),
    })?;
    let child = doc.node(child_id).ok_or_else(|| ArborError::InvalidChild {
        node_id: child_id.to_string(),
    })?;

    if child.is_root() {
        return Err(ArborError::InvalidRootForChild {
            node_id: child_id.to_string(),
        });
    }
    if parent.node_type == NodeType::Task {
        return Err(ArborError::InvalidTaskForParent {
            node_id: parent_id.to_string(),
        });
    }

    let diffs = mutate_then_reorder(doc, |doc, diffs| {
        let child = doc
            .node_mut(child_id)
            .ok_or_else(|| ArborError::InvalidChild {
                node_id: child_id.to_string(),
            })?;

        let mut parents = IndexSet::new();
        parents.insert(parent_id.to_string());
        if child.parent_id != parent_id {
            let pre = child.clone();
            let former = std::mem::replace(&mut child.parent_id, parent_id.to_string());
            diffs.record_update(pre, child.clone());
            if !former.is_empty() {
                parents.insert(former);
            }
        }
        Ok(parents)
    })?;

    Ok(diffs.into_vec())
}

/// Detach nodes from their parents and re-rank the sibling sets they left
///
/// All-or-nothing: a requested node without a parent rejects the whole
/// batch before anything changes. Unknown ids are skipped.
///
/// # Errors
/// * `InvalidDisconnectWithoutParent` - If a requested node is already detached
pub fn disconnect_nodes(doc: &mut Document, node_ids: &[String]) -> Result<Vec<NodeDiff>> {
    let requested: HashSet<&str> = node_ids.iter().map(String::as_str).collect();

    if let Some(detached) = doc
        .nodes
        .iter()
        .find(|n| requested.contains(n.id.as_str()) && n.is_detached())
    {
        return Err(ArborError::InvalidDisconnectWithoutParent {
            node_id: detached.id.clone(),
        });
    }

    let diffs = mutate_then_reorder(doc, |doc, diffs| {
        let mut parents = IndexSet::new();
        for node in doc.nodes.iter_mut() {
            if requested.contains(node.id.as_str()) {
                let pre = node.clone();
                parents.insert(node.parent_id.clone());
                node.detach();
                diffs.record_update(pre, node.clone());
            }
        }
        Ok(parents)
    })?;

    Ok(diffs.into_vec())
}

/// Replace the settings payload of one node
///
/// Never changes sibling order.
///
/// # Errors
/// * `InvalidNodeId` - If `node_id` does not resolve
pub fn update_node_settings(
    doc: &mut Document,
    node_id: &str,
    settings: Option<NodeSettings>,
) -> Result<Vec<NodeDiff>> {
    let node = doc
        .node_mut(node_id)
        .ok_or_else(|| ArborError::InvalidNodeId {
            node_id: node_id.to_string(),
        })?;

    let pre = node.clone();
    node.data = settings;
    Ok(vec![NodeDiff::updated(pre, node.clone())])
}

/// Copy of one node
///
/// # Errors
/// * `NodeNotFound` - If `node_id` does not resolve
pub fn get_node(doc: &Document, node_id: &str) -> Result<Node> {
    doc.node(node_id)
        .cloned()
        .ok_or_else(|| ArborError::NodeNotFound {
            node_id: node_id.to_string(),
        })
}

fn check_position(subject: &str, position: &Position) -> Result<()> {
    if position.is_finite() {
        return Ok(());
    }
    Err(ArborError::InvalidInput {
        reason: format!(
            "{} position ({}, {}) is not finite",
            subject, position.x, position.y
        ),
    })
}

// Cascade step of removal: orphaned children become detached.
fn detach_children(doc: &mut Document, parent_id: &str) -> DiffAccumulator {
    let mut diffs = DiffAccumulator::new();
    for node in doc.nodes.iter_mut().filter(|n| n.parent_id == parent_id) {
        let pre = node.clone();
        node.detach();
        diffs.record_update(pre, node.clone());
    }
    diffs
}
