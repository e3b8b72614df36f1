//! Canonical lifecycle macros
//!
//! Callers must depend on `arbor-core-types` for the event constants.

/// Log the start of an operation
///
/// ```
/// # use arbor_core::log_op_start;
/// log_op_start!("move_nodes");
/// log_op_start!("move_nodes", asset_id = "a1");
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = arbor_core_types::schema::EVENT_START,
        );
    };
    ($op:expr, $($field:tt)*) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = arbor_core_types::schema::EVENT_START,
            $($field)*
        );
    };
}

/// Log the successful end of an operation
///
/// ```
/// # use arbor_core::log_op_end;
/// log_op_end!("move_nodes", duration_ms = 3, diff_count = 2);
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, duration_ms = $duration:expr) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = arbor_core_types::schema::EVENT_END,
            duration_ms = $duration,
        );
    };
    ($op:expr, duration_ms = $duration:expr, $($field:tt)*) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = arbor_core_types::schema::EVENT_END,
            duration_ms = $duration,
            $($field)*
        );
    };
}

/// Log an operation failure with its stable error kind and code
///
/// Accepts anything convertible into `ExError`.
///
/// ```
/// # use arbor_core::{log_op_error, errors::ArborError};
/// let err = ArborError::InvalidNodeId { node_id: "n1".to_string() };
/// log_op_error!("update_node_settings", err, duration_ms = 1);
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr, duration_ms = $duration:expr) => {{
        let ex_err: $crate::errors::ExError = $err.into();
        tracing::warn!(
            component = module_path!(),
            op = $op,
            event = arbor_core_types::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err_kind = ?ex_err.kind(),
            err_code = ex_err.code(),
        );
    }};
    ($op:expr, $err:expr, duration_ms = $duration:expr, $($field:tt)*) => {{
        let ex_err: $crate::errors::ExError = $err.into();
        tracing::warn!(
            component = module_path!(),
            op = $op,
            event = arbor_core_types::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err_kind = ?ex_err.kind(),
            err_code = ex_err.code(),
            $($field)*
        );
    }};
}
