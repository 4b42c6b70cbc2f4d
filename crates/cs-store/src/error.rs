//! Error types for the aggregation store.

use cs_common::ErrorKind;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors from store operations.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The store was closed or never opened.
    #[error("there is no database connection")]
    NotConnected,

    /// The database file could not be opened.
    #[error("could not open database {path}: {reason}")]
    Open { path: PathBuf, reason: String },

    /// A query failed or returned malformed rows.
    #[error("query failed: {0}")]
    Query(String),

    /// Adding or filling a derived column failed.
    #[error("could not {step}: {message}")]
    StorageWrite { step: String, message: String },
}

impl StoreError {
    /// Map to the shared error kind.
    pub fn kind(&self) -> ErrorKind {
        match self {
            StoreError::NotConnected | StoreError::Open { .. } => ErrorKind::NotConnected,
            StoreError::Query(_) => ErrorKind::Query,
            StoreError::StorageWrite { .. } => ErrorKind::StorageWrite,
        }
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::Query(err.to_string())
    }
}
