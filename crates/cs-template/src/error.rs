//! Error types for template loading and rendering.

use crate::engine::EngineState;
use cs_common::ErrorKind;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for template operations.
pub type Result<T> = std::result::Result<T, TemplateError>;

/// Errors that can occur while loading or rendering templates.
#[derive(Error, Debug)]
pub enum TemplateError {
    /// Template file could not be read.
    #[error("failed to read template {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Template document is malformed.
    #[error("malformed template at line {line}: {message}")]
    Malformed { line: usize, message: String },

    /// Requested section does not exist in the document.
    #[error("section '{0}' not found in template")]
    SectionNotFound(String),

    /// Operation is not valid in the current engine state.
    #[error("cannot {operation} while engine is {state}")]
    InvalidState {
        operation: &'static str,
        state: EngineState,
    },

    /// Placeholder is not used by the active section.
    #[error("section '{section}' has no placeholder '{name}'")]
    UnknownPlaceholder { section: String, name: String },
}

impl TemplateError {
    /// Map to the shared error kind.
    pub fn kind(&self) -> ErrorKind {
        match self {
            TemplateError::Read { .. } | TemplateError::Malformed { .. } => ErrorKind::TemplateLoad,
            TemplateError::SectionNotFound(_) => ErrorKind::SectionNotFound,
            TemplateError::InvalidState { .. } => ErrorKind::InvalidState,
            TemplateError::UnknownPlaceholder { .. } => ErrorKind::UnknownPlaceholder,
        }
    }
}
