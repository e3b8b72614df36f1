pub mod node_ops;
pub mod reorder;

pub use node_ops::{
    connect_node, create_node, disconnect_nodes, get_node, move_nodes, remove_nodes,
    update_node_settings,
};
pub use reorder::reorder;
