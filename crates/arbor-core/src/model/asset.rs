use crate::errors::{ArborError, Result};

/// Kind of editor asset stored alongside behaviour trees
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetType {
    BehaviourTree,
    BlackBoard,
}

impl AssetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetType::BehaviourTree => "BehaviourTree",
            AssetType::BlackBoard => "BlackBoard",
        }
    }

    /// # Errors
    ///
    /// Returns `InvalidInput` for an unsupported asset type name.
    pub fn parse(name: &str) -> Result<Self> {
        match name {
            "BehaviourTree" => Ok(AssetType::BehaviourTree),
            "BlackBoard" => Ok(AssetType::BlackBoard),
            other => Err(ArborError::InvalidInput {
                reason: format!("unsupported asset type: {}", other),
            }),
        }
    }

    /// Content written when an asset of this type is created
    ///
    /// # Errors
    ///
    /// Returns `Serialization` if the empty document cannot be encoded.
    pub fn initial_content(&self) -> Result<String> {
        match self {
            AssetType::BehaviourTree => super::Document::new_empty().to_json(),
            AssetType::BlackBoard => Ok(String::new()),
        }
    }
}

impl std::fmt::Display for AssetType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
