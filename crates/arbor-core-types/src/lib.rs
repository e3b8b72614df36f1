//! Types shared by every Arbor crate
//!
//! - **Correlation types**: RequestId, TraceId, RequestContext
//! - **Schema constants**: canonical log field keys and event names

pub mod correlation;
pub mod schema;

pub use correlation::{RequestContext, RequestId, TraceId};
