pub mod integrity;

pub use integrity::{check_document, IntegrityIssue};
