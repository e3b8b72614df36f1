use indexmap::IndexSet;

use crate::diff::DiffAccumulator;
use crate::errors::Result;
use crate::model::Document;

/// Re-rank the children of `parent_id` by ascending `position.x`
///
/// Siblings get contiguous zero-based `order` values. Only nodes whose rank
/// actually changed produce a diff, so running this twice in a row yields an
/// empty accumulator the second time. Ties keep document order.
///
/// The empty parent id is never reordered: detached nodes have no siblings.
pub fn reorder(doc: &mut Document, parent_id: &str) -> DiffAccumulator {
    let mut diffs = DiffAccumulator::new();
    if parent_id.is_empty() {
        return diffs;
    }

    let mut siblings: Vec<usize> = doc
        .nodes
        .iter()
        .enumerate()
        .filter(|(_, n)| n.parent_id == parent_id)
        .map(|(idx, _)| idx)
        .collect();
    siblings.sort_by(|&a, &b| {
        doc.nodes[a]
            .position
            .x
            .total_cmp(&doc.nodes[b].position.x)
    });

    for (rank, idx) in siblings.into_iter().enumerate() {
        let rank = rank as i32;
        let node = &mut doc.nodes[idx];
        if node.order != rank {
            let pre = node.clone();
            node.order = rank;
            diffs.record_update(pre, node.clone());
        }
    }

    diffs
}

/// Run one mutation step, then reorder every parent it reports as affected
///
/// The step records its direct diffs and returns the parents whose sibling
/// sets it changed. Reorder diffs are merged into the same accumulator, so a
/// node touched by both keeps its original `pre` image.
pub(crate) fn mutate_then_reorder<F>(doc: &mut Document, step: F) -> Result<DiffAccumulator>
where
    F: FnOnce(&mut Document, &mut DiffAccumulator) -> Result<IndexSet<String>>,
{
    let mut diffs = DiffAccumulator::new();
    let affected_parents = step(doc, &mut diffs)?;
    for parent_id in &affected_parents {
        diffs.merge(reorder(doc, parent_id));
    }
    Ok(diffs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Node, NodeType, Position};

    fn child(id: &str, x: f32, order: i32) -> Node {
        Node {
            id: id.to_string(),
            parent_id: "p".to_string(),
            position: Position::new(x, 0.0),
            node_type: NodeType::Task,
            order,
            data: None,
        }
    }

    fn doc_with(nodes: Vec<Node>) -> Document {
        let mut doc = Document::new_empty();
        doc.nodes.extend(nodes);
        doc
    }

    #[test]
    fn test_empty_parent_is_never_reordered() {
        let mut doc = doc_with(vec![Node {
            parent_id: String::new(),
            ..child("d", 5.0, 3)
        }]);
        assert!(reorder(&mut doc, "").is_empty());
        assert_eq!(doc.node("d").unwrap().order, 3);
    }

    #[test]
    fn test_ties_keep_document_order() {
        let mut doc = doc_with(vec![child("a", 1.0, -1), child("b", 1.0, -1)]);
        reorder(&mut doc, "p");
        assert_eq!(doc.node("a").unwrap().order, 0);
        assert_eq!(doc.node("b").unwrap().order, 1);
    }

    #[test]
    fn test_negative_positions_sort_first() {
        let mut doc = doc_with(vec![child("a", 0.5, 0), child("b", -20.0, 1)]);
        let diffs = reorder(&mut doc, "p");
        assert_eq!(diffs.len(), 2);
        assert_eq!(doc.node("b").unwrap().order, 0);
        assert_eq!(doc.node("a").unwrap().order, 1);
    }
}
