//! Functional-boundary apply function
//!
//! `apply()` is the single entry point through which a [`Mutation`] reaches
//! a [`Document`].
//!
//! ## Atomicity Contract
//!
//! - **All-or-nothing**: either the mutation succeeds and the new document is
//!   returned, or a typed error is returned and nothing is persisted
//! - **No panics**: invalid requests return typed errors
//! - **Minimal diffs**: one consolidated entry per touched node
//!
//! ## Example
//!
//! ```
//! use arbor_core::{apply, Document, Mutation, NodeType, Position};
//!
//! let doc = Document::new_empty();
//! let applied = apply(
//!     doc,
//!     Mutation::CreateNode {
//!         node_type: NodeType::Task,
//!         position: Position::new(10.0, 20.0),
//!         initial_settings: None,
//!     },
//! )
//! .unwrap();
//! assert_eq!(applied.diffs.len(), 1);
//! assert_eq!(applied.document.nodes.len(), 2);
//! ```

use crate::commands::Mutation;
use crate::diff::NodeDiff;
use crate::errors::Result;
use crate::model::Document;
use crate::ops::node_ops;

/// A mutated document together with the diffs that describe the change
#[derive(Debug, Clone)]
pub struct Applied {
    pub document: Document,
    pub diffs: Vec<NodeDiff>,
}

impl Applied {
    /// True when the mutation left the document untouched
    pub fn is_noop(&self) -> bool {
        self.diffs.is_empty()
    }
}

/// Apply a mutation to a document
///
/// Takes ownership of the document. On error the caller's persisted copy is
/// still the current state.
///
/// # Errors
///
/// Returns the validation error of the mutation; see [`crate::ArborError`].
pub fn apply(mut document: Document, mutation: Mutation) -> Result<Applied> {
    let diffs = match mutation {
        Mutation::CreateNode {
            node_type,
            position,
            initial_settings,
        } => node_ops::create_node(&mut document, node_type, position, initial_settings)?,
        Mutation::MoveNodes { movements } => node_ops::move_nodes(&mut document, &movements)?,
        Mutation::RemoveNodes { node_ids } => node_ops::remove_nodes(&mut document, &node_ids)?,
        Mutation::ConnectNode { parent_id, child_id } => {
            node_ops::connect_node(&mut document, &parent_id, &child_id)?
        }
        Mutation::DisconnectNodes { node_ids } => {
            node_ops::disconnect_nodes(&mut document, &node_ids)?
        }
        Mutation::UpdateNodeSettings { node_id, settings } => {
            node_ops::update_node_settings(&mut document, &node_id, settings)?
        }
    };

    Ok(Applied { document, diffs })
}
