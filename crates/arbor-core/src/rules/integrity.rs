//! Read-only structural diagnostics for a document.
//!
//! Mutations stay permissive about parent references and cycles; this
//! report is how callers find out about either.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::model::Document;

/// One structural problem found in a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "issue", rename_all = "snake_case")]
pub enum IntegrityIssue {
    /// The document does not hold exactly one root
    RootCount { count: usize },
    /// Several nodes share one id
    DuplicateId { node_id: String },
    /// `parentId` names a node that does not exist
    DanglingParent { node_id: String, parent_id: String },
    /// Following parents from this node returns to it
    Cycle { node_id: String },
    /// Sibling orders under this parent are not `0..n`
    NonContiguousOrder { parent_id: String, orders: Vec<i32> },
}

/// Collect every structural issue in `doc`
///
/// Issues are reported in a deterministic order: root count, duplicates,
/// dangling parents, cycles, then sibling orders (parents in first-seen
/// document order).
pub fn check_document(doc: &Document) -> Vec<IntegrityIssue> {
    let mut issues = Vec::new();

    let roots = doc.nodes.iter().filter(|n| n.is_root()).count();
    if roots != 1 {
        issues.push(IntegrityIssue::RootCount { count: roots });
    }

    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    for node in &doc.nodes {
        if !seen.insert(node.id.as_str()) && reported.insert(node.id.as_str()) {
            issues.push(IntegrityIssue::DuplicateId {
                node_id: node.id.clone(),
            });
        }
    }

    for (child_id, parent_id) in find_dangling_parents(doc) {
        issues.push(IntegrityIssue::DanglingParent {
            node_id: child_id,
            parent_id,
        });
    }

    for node in &doc.nodes {
        if has_cycle(doc, &node.id) {
            issues.push(IntegrityIssue::Cycle {
                node_id: node.id.clone(),
            });
        }
    }

    let mut parents: Vec<&str> = Vec::new();
    let mut orders: HashMap<&str, Vec<i32>> = HashMap::new();
    for node in doc.nodes.iter().filter(|n| !n.is_detached()) {
        let entry = orders.entry(node.parent_id.as_str()).or_insert_with(|| {
            parents.push(node.parent_id.as_str());
            Vec::new()
        });
        entry.push(node.order);
    }
    for parent_id in parents {
        let mut sibling_orders = orders.remove(parent_id).unwrap_or_default();
        sibling_orders.sort_unstable();
        let contiguous = sibling_orders
            .iter()
            .enumerate()
            .all(|(rank, &order)| order == rank as i32);
        if !contiguous {
            issues.push(IntegrityIssue::NonContiguousOrder {
                parent_id: parent_id.to_string(),
                orders: sibling_orders,
            });
        }
    }

    issues
}

/// Check whether walking parents from `node_id` ever revisits a node
///
/// The walk stops at a detached node or a dangling parent.
pub fn has_cycle(doc: &Document, node_id: &str) -> bool {
    let mut visited = HashSet::new();
    let mut current = Some(node_id);

    while let Some(id) = current {
        if !visited.insert(id) {
            return id == node_id;
        }
        current = doc
            .node(id)
            .map(|n| n.parent_id.as_str())
            .filter(|p| !p.is_empty());
    }

    false
}

/// Nodes whose parent id does not resolve, as `(child_id, parent_id)`
pub fn find_dangling_parents(doc: &Document) -> Vec<(String, String)> {
    let ids: HashSet<&str> = doc.nodes.iter().map(|n| n.id.as_str()).collect();
    doc.nodes
        .iter()
        .filter(|n| !n.is_detached() && !ids.contains(n.parent_id.as_str()))
        .map(|n| (n.id.clone(), n.parent_id.clone()))
        .collect()
}
