pub mod archive;

pub use archive::{archive_behaviour_tree, ArchiveSource, ArchivedTree, AssetSetArchive};
