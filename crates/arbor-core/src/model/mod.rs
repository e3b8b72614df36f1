pub mod asset;
pub mod document;
pub mod node;

pub use asset::AssetType;
pub use document::{Attachment, Connection, Document, ROOT_POSITION};
pub use node::{Node, NodeSettings, NodeType, Position, DETACHED_ORDER};
