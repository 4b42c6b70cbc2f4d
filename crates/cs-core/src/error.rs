//! Errors of a generation run.

use cs_common::{ErrorKind, StructuredError};
use cs_config::ConfigError;
use cs_store::StoreError;
use cs_template::TemplateError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for generation operations.
pub type Result<T> = std::result::Result<T, SiteError>;

/// Everything that can abort a generation run.
#[derive(Error, Debug)]
pub enum SiteError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("could not write {path}: {message}")]
    OutputWrite { path: PathBuf, message: String },

    #[error("could not create output directory {path}: {message}")]
    DirectoryCreation { path: PathBuf, message: String },

    #[error("could not copy asset {path}: {message}")]
    AssetCopy { path: PathBuf, message: String },

    #[error("no entities found in the database")]
    NoEntities,

    #[error("{0}")]
    SqliteVersion(String),

    #[error("failed to encode series: {0}")]
    Encode(#[from] serde_json::Error),

    /// Another error, tagged with the page or step it occurred in.
    #[error("{step}: {source}")]
    Step {
        step: String,
        #[source]
        source: Box<SiteError>,
    },
}

impl SiteError {
    /// Map to the shared error kind.
    pub fn kind(&self) -> ErrorKind {
        match self {
            SiteError::Store(e) => e.kind(),
            SiteError::Template(e) => e.kind(),
            SiteError::Config(e) => e.kind(),
            SiteError::OutputWrite { .. } => ErrorKind::OutputWrite,
            SiteError::DirectoryCreation { .. } => ErrorKind::DirectoryCreation,
            SiteError::AssetCopy { .. } => ErrorKind::AssetCopy,
            SiteError::NoEntities | SiteError::SqliteVersion(_) => ErrorKind::Query,
            SiteError::Encode(_) => ErrorKind::Internal,
            SiteError::Step { source, .. } => source.kind(),
        }
    }

    /// Page or step the error occurred in, if known.
    pub fn step(&self) -> Option<&str> {
        match self {
            SiteError::Step { step, .. } => Some(step),
            _ => None,
        }
    }

    /// Structured form for JSONL consumers.
    pub fn to_structured(&self) -> StructuredError {
        let mut err = StructuredError::new(self.kind(), self.to_string());
        if let Some(step) = self.step() {
            err = err.with_context("step", step);
        }
        err
    }
}

/// Attach the page or step name to an error.
pub trait StepContext<T> {
    fn step(self, step: impl Into<String>) -> Result<T>;
}

impl<T, E> StepContext<T> for std::result::Result<T, E>
where
    E: Into<SiteError>,
{
    fn step(self, step: impl Into<String>) -> Result<T> {
        self.map_err(|e| SiteError::Step {
            step: step.into(),
            source: Box::new(e.into()),
        })
    }
}
