//! Canonical field keys and event names for structured logging

pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";
pub const FIELD_REQUEST_ID: &str = "request_id";
pub const FIELD_TRACE_ID: &str = "trace_id";

// Entity identifiers
pub const FIELD_ASSET_ID: &str = "asset_id";
pub const FIELD_NODE_ID: &str = "node_id";
pub const FIELD_PREV_VERSION: &str = "prev_version";
pub const FIELD_NEW_VERSION: &str = "new_version";

// Collection sizes
pub const FIELD_DIFF_COUNT: &str = "diff_count";
pub const FIELD_NODE_COUNT: &str = "node_count";

// Error fields
pub const FIELD_ERR_KIND: &str = "err_kind";
pub const FIELD_ERR_CODE: &str = "err_code";

// Lifecycle events
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";
