use arbor_core_types::RequestId;
use thiserror::Error;

/// Result type alias using ArborError
pub type Result<T> = std::result::Result<T, ArborError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind carries a stable string code for programmatic handling and the
/// numeric code that existing editor clients already switch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExErrorKind {
    // Validation
    InvalidNodeType,
    IllegalRemoveRoot,
    InvalidParent,
    InvalidChild,
    InvalidRootForChild,
    InvalidTaskForParent,
    InvalidDisconnectWithoutParent,
    InvalidNodeId,
    AlreadyExists,
    UnexpectedAssetType,
    InvalidInput,

    // Organization
    DuplicateSolutionName,
    InvalidSolution,
    DuplicateAssetSetName,
    InvalidAssetSet,

    // Concurrency
    VersionConflict,
    SolutionVersionConflict,

    // Lookup
    NotFound,

    // Serialization
    Deserialization,
    Serialization,

    // Storage
    Persistence,

    // Internal
    Internal,
}

/// Coarse grouping of error kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    Validation,
    Concurrency,
    NotFound,
    Serialization,
    Storage,
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidNodeType => "ERR_INVALID_NODE_TYPE",
            ExErrorKind::IllegalRemoveRoot => "ERR_ILLEGAL_REMOVE_ROOT",
            ExErrorKind::InvalidParent => "ERR_INVALID_PARENT",
            ExErrorKind::InvalidChild => "ERR_INVALID_CHILD",
            ExErrorKind::InvalidRootForChild => "ERR_INVALID_ROOT_FOR_CHILD",
            ExErrorKind::InvalidTaskForParent => "ERR_INVALID_TASK_FOR_PARENT",
            ExErrorKind::InvalidDisconnectWithoutParent => "ERR_DISCONNECT_WITHOUT_PARENT",
            ExErrorKind::InvalidNodeId => "ERR_INVALID_NODE_ID",
            ExErrorKind::AlreadyExists => "ERR_ALREADY_EXISTS",
            ExErrorKind::UnexpectedAssetType => "ERR_UNEXPECTED_ASSET_TYPE",
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::DuplicateSolutionName => "ERR_DUPLICATE_SOLUTION_NAME",
            ExErrorKind::InvalidSolution => "ERR_INVALID_SOLUTION",
            ExErrorKind::DuplicateAssetSetName => "ERR_DUPLICATE_ASSET_SET_NAME",
            ExErrorKind::InvalidAssetSet => "ERR_INVALID_ASSET_SET",
            ExErrorKind::VersionConflict => "ERR_VERSION_CONFLICT",
            ExErrorKind::SolutionVersionConflict => "ERR_SOLUTION_VERSION_CONFLICT",
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::Deserialization => "ERR_DESERIALIZATION",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Persistence => "ERR_PERSISTENCE",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }

    /// Numeric code understood by existing editor clients
    pub fn numeric_code(&self) -> u32 {
        match self {
            ExErrorKind::InvalidNodeType => 31001,
            ExErrorKind::IllegalRemoveRoot => 31010,
            ExErrorKind::InvalidParent => 31030,
            ExErrorKind::InvalidChild => 31031,
            ExErrorKind::InvalidRootForChild => 31032,
            ExErrorKind::InvalidTaskForParent => 31033,
            ExErrorKind::InvalidDisconnectWithoutParent => 31034,
            ExErrorKind::InvalidNodeId => 31040,
            ExErrorKind::AlreadyExists => 20021,
            ExErrorKind::UnexpectedAssetType => 40001,
            ExErrorKind::InvalidInput => 10010,
            ExErrorKind::DuplicateSolutionName => 20001,
            ExErrorKind::InvalidSolution => 20002,
            ExErrorKind::DuplicateAssetSetName => 20010,
            ExErrorKind::InvalidAssetSet => 20011,
            ExErrorKind::VersionConflict => 30001,
            ExErrorKind::SolutionVersionConflict => 20003,
            ExErrorKind::NotFound => 10002,
            ExErrorKind::Deserialization => 30010,
            ExErrorKind::Serialization => 30011,
            ExErrorKind::Persistence => 10001,
            ExErrorKind::Internal => 10000,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            ExErrorKind::VersionConflict | ExErrorKind::SolutionVersionConflict => {
                ErrorCategory::Concurrency
            }
            ExErrorKind::NotFound => ErrorCategory::NotFound,
            ExErrorKind::Deserialization | ExErrorKind::Serialization => {
                ErrorCategory::Serialization
            }
            ExErrorKind::Persistence => ErrorCategory::Storage,
            ExErrorKind::Internal => ErrorCategory::Internal,
            _ => ErrorCategory::Validation,
        }
    }
}

/// Canonical structured error type
///
/// Store and engine functions return this; engine-level domain failures are
/// converted from [`ArborError`] with their context fields filled in.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    asset_id: Option<String>,
    node_id: Option<String>,
    stored_version: Option<String>,
    requested_version: Option<String>,
    request_id: Option<RequestId>,
    message: String,
}

impl ExError {
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            asset_id: None,
            node_id: None,
            stored_version: None,
            requested_version: None,
            request_id: None,
            message: String::new(),
        }
    }

    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    pub fn with_asset_id(mut self, id: impl Into<String>) -> Self {
        self.asset_id = Some(id.into());
        self
    }

    pub fn with_node_id(mut self, id: impl Into<String>) -> Self {
        self.node_id = Some(id.into());
        self
    }

    /// Record both sides of a version mismatch
    pub fn with_versions(
        mut self,
        stored: impl Into<String>,
        requested: impl Into<String>,
    ) -> Self {
        self.stored_version = Some(stored.into());
        self.requested_version = Some(requested.into());
        self
    }

    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = Some(request_id);
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn numeric_code(&self) -> u32 {
        self.kind.numeric_code()
    }

    pub fn category(&self) -> ErrorCategory {
        self.kind.category()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn asset_id(&self) -> Option<&str> {
        self.asset_id.as_deref()
    }

    pub fn node_id(&self) -> Option<&str> {
        self.node_id.as_deref()
    }

    /// Version held by the store when a conflict was detected
    pub fn stored_version(&self) -> Option<&str> {
        self.stored_version.as_deref()
    }

    /// Version the caller believed was current
    pub fn requested_version(&self) -> Option<&str> {
        self.requested_version.as_deref()
    }

    pub fn request_id(&self) -> Option<&RequestId> {
        self.request_id.as_ref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code(), self.kind.numeric_code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(asset_id) = &self.asset_id {
            write!(f, " (asset_id: {})", asset_id)?;
        }
        if let Some(node_id) = &self.node_id {
            write!(f, " (node_id: {})", node_id)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {}

// ========== End Error Facility ==========

/// Domain errors raised by document mutations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ArborError {
    #[error("Invalid node type for creation: {node_type}")]
    InvalidNodeType { node_type: String },

    #[error("The root node cannot be removed: {node_id}")]
    IllegalRemoveRoot { node_id: String },

    #[error("Connect parent does not exist: {node_id}")]
    InvalidParent { node_id: String },

    #[error("Connect child does not exist: {node_id}")]
    InvalidChild { node_id: String },

    #[error("The root node cannot become a child: {node_id}")]
    InvalidRootForChild { node_id: String },

    #[error("A task node cannot have children: {node_id}")]
    InvalidTaskForParent { node_id: String },

    #[error("Node has no parent to disconnect from: {node_id}")]
    InvalidDisconnectWithoutParent { node_id: String },

    #[error("Node does not exist: {node_id}")]
    InvalidNodeId { node_id: String },

    #[error("Node not found: {node_id}")]
    NodeNotFound { node_id: String },

    #[error("Unexpected asset type {found}, expected {expected}")]
    UnexpectedAssetType { found: String, expected: String },

    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("Failed to deserialize document: {message}")]
    Deserialization { message: String },

    #[error("Failed to serialize document: {message}")]
    Serialization { message: String },
}

impl From<ArborError> for ExError {
    fn from(err: ArborError) -> Self {
        let message = err.to_string();
        match err {
            ArborError::InvalidNodeType { .. } => {
                ExError::new(ExErrorKind::InvalidNodeType).with_message(message)
            }
            ArborError::IllegalRemoveRoot { node_id } => ExError::new(ExErrorKind::IllegalRemoveRoot)
                .with_node_id(node_id)
                .with_message(message),
            ArborError::InvalidParent { node_id } => ExError::new(ExErrorKind::InvalidParent)
                .with_node_id(node_id)
                .with_message(message),
            ArborError::InvalidChild { node_id } => ExError::new(ExErrorKind::InvalidChild)
                .with_node_id(node_id)
                .with_message(message),
            ArborError::InvalidRootForChild { node_id } => {
                ExError::new(ExErrorKind::InvalidRootForChild)
                    .with_node_id(node_id)
                    .with_message(message)
            }
            ArborError::InvalidTaskForParent { node_id } => {
                ExError::new(ExErrorKind::InvalidTaskForParent)
                    .with_node_id(node_id)
                    .with_message(message)
            }
            ArborError::InvalidDisconnectWithoutParent { node_id } => {
                ExError::new(ExErrorKind::InvalidDisconnectWithoutParent)
                    .with_node_id(node_id)
                    .with_message(message)
            }
            ArborError::InvalidNodeId { node_id } => ExError::new(ExErrorKind::InvalidNodeId)
                .with_node_id(node_id)
                .with_message(message),
            ArborError::NodeNotFound { node_id } => ExError::new(ExErrorKind::NotFound)
                .with_node_id(node_id)
                .with_message(message),
            ArborError::UnexpectedAssetType { .. } => {
                ExError::new(ExErrorKind::UnexpectedAssetType).with_message(message)
            }
            ArborError::InvalidInput { .. } => {
                ExError::new(ExErrorKind::InvalidInput).with_message(message)
            }
            ArborError::Deserialization { .. } => {
                ExError::new(ExErrorKind::Deserialization).with_message(message)
            }
            ArborError::Serialization { .. } => {
                ExError::new(ExErrorKind::Serialization).with_message(message)
            }
        }
    }
}

impl From<serde_json::Error> for ArborError {
    fn from(err: serde_json::Error) -> Self {
        ArborError::Serialization {
            message: err.to_string(),
        }
    }
}
