//! Merges the diffs produced by the internal steps of one operation.

use indexmap::IndexMap;

use super::model::NodeDiff;
use crate::model::Node;

/// Id-keyed, insertion-ordered set of node diffs
///
/// A node touched by several steps ends up with one entry: the `pre` image of
/// its first recording and the `post` image of its last.
#[derive(Debug, Default, Clone)]
pub struct DiffAccumulator {
    entries: IndexMap<String, NodeDiff>,
}

impl DiffAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one diff, merging with an earlier entry for the same node
    pub fn record(&mut self, diff: NodeDiff) {
        match self.entries.get_mut(&diff.node_id) {
            Some(existing) => existing.post = diff.post,
            None => {
                self.entries.insert(diff.node_id.clone(), diff);
            }
        }
    }

    /// Record a pre/post pair for an in-place update
    pub fn record_update(&mut self, pre: Node, post: Node) {
        self.record(NodeDiff::updated(pre, post));
    }

    pub fn merge(&mut self, other: DiffAccumulator) {
        for diff in other.entries.into_values() {
            self.record(diff);
        }
    }

    pub fn get(&self, node_id: &str) -> Option<&NodeDiff> {
        self.entries.get(node_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_vec(self) -> Vec<NodeDiff> {
        self.entries.into_values().collect()
    }
}
