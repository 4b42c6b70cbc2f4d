//! Corona site common types and error kinds.
//!
//! This crate provides foundational types shared across the workspace:
//! - Entity and time-series record types read from the database
//! - Stable error kinds with codes and remediation hints

pub mod error;
pub mod types;

pub use error::{ErrorCategory, ErrorKind, StructuredError};
pub use types::{group_page_file_name, Entity, IncidencePoint, SeriesPoint, OTHER_GROUP_TAG};
