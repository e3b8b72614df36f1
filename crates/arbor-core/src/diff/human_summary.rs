//! Human-readable rendering of node diffs.

use crate::diff::model::{DiffKind, NodeDiff};
use crate::model::Node;

/// Render a short text summary of a diff list
///
/// Informational only; clients consume the structured diffs.
pub fn render_diff_summary(diffs: &[NodeDiff]) -> String {
    if diffs.is_empty() {
        return "No changes.\n".to_string();
    }

    let mut out = format!("{} node(s) changed\n", diffs.len());
    for diff in diffs {
        match diff.kind() {
            DiffKind::Created => {
                let kind = diff
                    .post
                    .as_ref()
                    .map(|n| n.node_type.as_str())
                    .unwrap_or("?");
                out.push_str(&format!("+ {} ({})\n", diff.node_id, kind));
            }
            DiffKind::Removed => {
                out.push_str(&format!("- {}\n", diff.node_id));
            }
            DiffKind::Updated => {
                let changes = match (&diff.pre, &diff.post) {
                    (Some(pre), Some(post)) => changed_fields(pre, post),
                    _ => Vec::new(),
                };
                if changes.is_empty() {
                    out.push_str(&format!("~ {} (unchanged)\n", diff.node_id));
                } else {
                    out.push_str(&format!("~ {}: {}\n", diff.node_id, changes.join(", ")));
                }
            }
        }
    }
    out
}

fn changed_fields(pre: &Node, post: &Node) -> Vec<String> {
    let mut fields = Vec::new();
    if pre.parent_id != post.parent_id {
        fields.push(format!(
            "parent {} -> {}",
            display_parent(&pre.parent_id),
            display_parent(&post.parent_id)
        ));
    }
    if pre.order != post.order {
        fields.push(format!("order {} -> {}", pre.order, post.order));
    }
    if pre.position != post.position {
        fields.push(format!(
            "position ({}, {}) -> ({}, {})",
            pre.position.x, pre.position.y, post.position.x, post.position.y
        ));
    }
    if pre.data != post.data {
        fields.push("settings".to_string());
    }
    fields
}

fn display_parent(parent_id: &str) -> &str {
    if parent_id.is_empty() {
        "<none>"
    } else {
        parent_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NodeType, Position};

    fn node(id: &str, parent: &str, order: i32) -> Node {
        Node {
            id: id.to_string(),
            parent_id: parent.to_string(),
            position: Position::new(1.0, 2.0),
            node_type: NodeType::Sequence,
            order,
            data: None,
        }
    }

    #[test]
    fn test_empty_summary() {
        assert_eq!(render_diff_summary(&[]), "No changes.\n");
    }

    #[test]
    fn test_summary_lists_each_kind() {
        let diffs = vec![
            NodeDiff::created(node("n1", "", -1)),
            NodeDiff::removed(node("n2", "r", 0)),
            NodeDiff::updated(node("n3", "", -1), node("n3", "r", 0)),
        ];
        let text = render_diff_summary(&diffs);
        assert!(text.starts_with("3 node(s) changed"));
        assert!(text.contains("+ n1 (bt_sequence)"));
        assert!(text.contains("- n2"));
        assert!(text.contains("~ n3: parent <none> -> r, order -1 -> 0"));
    }
}
