//! Error kinds shared by all corona site crates.
//!
//! Each crate defines its own `thiserror` enum and maps every variant to one
//! of the kinds below. The kind carries:
//! - A stable numeric code for machine parsing
//! - A category used to pick the process exit code
//! - A remediation hint for humans
//!
//! Errors serialize to structured JSON for JSONL log consumers:
//! ```json
//! {
//!   "code": 12,
//!   "category": "storage",
//!   "kind": "storage_write",
//!   "message": "could not add column totalCases: attempt to write a readonly database",
//!   "context": { "step": "migration" }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Error categories for grouping related kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Database access and migration.
    Storage,
    /// Template loading and rendering.
    Template,
    /// Output directory and file writes.
    Output,
    /// Configuration files and arguments.
    Config,
    /// Bugs.
    Internal,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Storage => write!(f, "storage"),
            ErrorCategory::Template => write!(f, "template"),
            ErrorCategory::Output => write!(f, "output"),
            ErrorCategory::Config => write!(f, "config"),
            ErrorCategory::Internal => write!(f, "internal"),
        }
    }
}

/// Failure kinds across the generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    // Storage (10-19)
    NotConnected,
    Query,
    StorageWrite,

    // Template (20-29)
    TemplateLoad,
    SectionNotFound,
    InvalidState,
    UnknownPlaceholder,

    // Output (30-39)
    OutputWrite,
    DirectoryCreation,
    AssetCopy,

    // Config (40-49)
    Config,

    // Internal (90-99)
    Internal,
}

impl ErrorKind {
    /// Returns the stable error code for this kind.
    ///
    /// - 10-19: storage
    /// - 20-29: template
    /// - 30-39: output
    /// - 40-49: configuration
    /// - 90-99: internal
    pub fn code(&self) -> u32 {
        match self {
            ErrorKind::NotConnected => 10,
            ErrorKind::Query => 11,
            ErrorKind::StorageWrite => 12,
            ErrorKind::TemplateLoad => 20,
            ErrorKind::SectionNotFound => 21,
            ErrorKind::InvalidState => 22,
            ErrorKind::UnknownPlaceholder => 23,
            ErrorKind::OutputWrite => 30,
            ErrorKind::DirectoryCreation => 31,
            ErrorKind::AssetCopy => 32,
            ErrorKind::Config => 40,
            ErrorKind::Internal => 90,
        }
    }

    /// Returns the category for grouping and exit code selection.
    pub fn category(&self) -> ErrorCategory {
        match self {
            ErrorKind::NotConnected | ErrorKind::Query | ErrorKind::StorageWrite => {
                ErrorCategory::Storage
            }
            ErrorKind::TemplateLoad
            | ErrorKind::SectionNotFound
            | ErrorKind::InvalidState
            | ErrorKind::UnknownPlaceholder => ErrorCategory::Template,
            ErrorKind::OutputWrite | ErrorKind::DirectoryCreation | ErrorKind::AssetCopy => {
                ErrorCategory::Output
            }
            ErrorKind::Config => ErrorCategory::Config,
            ErrorKind::Internal => ErrorCategory::Internal,
        }
    }

    /// Returns a short headline for human-readable output.
    pub fn headline(&self) -> &'static str {
        match self {
            ErrorKind::NotConnected => "No Database Connection",
            ErrorKind::Query => "Database Query Failed",
            ErrorKind::StorageWrite => "Database Update Failed",
            ErrorKind::TemplateLoad => "Template Could Not Be Loaded",
            ErrorKind::SectionNotFound => "Template Section Not Found",
            ErrorKind::InvalidState => "Template Engine Misuse",
            ErrorKind::UnknownPlaceholder => "Unknown Template Placeholder",
            ErrorKind::OutputWrite => "Output File Write Failed",
            ErrorKind::DirectoryCreation => "Output Directory Creation Failed",
            ErrorKind::AssetCopy => "Asset Copy Failed",
            ErrorKind::Config => "Configuration Error",
            ErrorKind::Internal => "Internal Error",
        }
    }

    /// Returns a human-readable remediation hint.
    pub fn remediation(&self) -> &'static str {
        match self {
            ErrorKind::NotConnected => {
                "Check that the database path exists and is a readable SQLite file."
            }
            ErrorKind::Query => {
                "The database does not have the expected country/covid19 tables. Re-import the data."
            }
            ErrorKind::StorageWrite => {
                "Accumulated numbers are missing and could not be written. Make the database file writable once."
            }
            ErrorKind::TemplateLoad => {
                "Check the template path and the section markers in the template file."
            }
            ErrorKind::SectionNotFound => {
                "The template lacks a section the generator needs. Compare it with templates/main.tpl."
            }
            ErrorKind::InvalidState => "Internal sequencing error in page assembly. Please report it.",
            ErrorKind::UnknownPlaceholder => {
                "Set \"unknown_placeholders\" to \"ignore\" or add the placeholder to the template."
            }
            ErrorKind::OutputWrite => "Check free disk space and permissions of the output directory.",
            ErrorKind::DirectoryCreation => {
                "The output directory must not exist yet. Choose a new path or remove the old one."
            }
            ErrorKind::AssetCopy => "Check that the assets directory exists and is readable.",
            ErrorKind::Config => "Fix the configuration file or the command line flags.",
            ErrorKind::Internal => "This is a bug. Please report it with the log output.",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ErrorKind::NotConnected => "not_connected",
            ErrorKind::Query => "query",
            ErrorKind::StorageWrite => "storage_write",
            ErrorKind::TemplateLoad => "template_load",
            ErrorKind::SectionNotFound => "section_not_found",
            ErrorKind::InvalidState => "invalid_state",
            ErrorKind::UnknownPlaceholder => "unknown_placeholder",
            ErrorKind::OutputWrite => "output_write",
            ErrorKind::DirectoryCreation => "directory_creation",
            ErrorKind::AssetCopy => "asset_copy",
            ErrorKind::Config => "config",
            ErrorKind::Internal => "internal",
        };
        write!(f, "{}", s)
    }
}

/// Structured error response for JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredError {
    /// Stable error code.
    pub code: u32,

    /// Error category for grouping.
    pub category: ErrorCategory,

    /// Error kind.
    pub kind: ErrorKind,

    /// Human-readable error message.
    pub message: String,

    /// Additional structured context (e.g., page, step).
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub context: HashMap<String, serde_json::Value>,
}

impl StructuredError {
    /// Build a structured error from a kind and a message.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        StructuredError {
            code: kind.code(),
            category: kind.category(),
            kind,
            message: message.into(),
            context: HashMap::new(),
        }
    }

    /// Add additional context to the error.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        if let Ok(v) = serde_json::to_value(value) {
            self.context.insert(key.into(), v);
        }
        self
    }

    /// Serialize to JSON string.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(r#"{{"code":{},"error":"serialization_failed"}}"#, self.code)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [ErrorKind; 12] = [
        ErrorKind::NotConnected,
        ErrorKind::Query,
        ErrorKind::StorageWrite,
        ErrorKind::TemplateLoad,
        ErrorKind::SectionNotFound,
        ErrorKind::InvalidState,
        ErrorKind::UnknownPlaceholder,
        ErrorKind::OutputWrite,
        ErrorKind::DirectoryCreation,
        ErrorKind::AssetCopy,
        ErrorKind::Config,
        ErrorKind::Internal,
    ];

    #[test]
    fn test_codes_are_unique() {
        let mut codes: Vec<u32> = ALL.iter().map(|k| k.code()).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), ALL.len());
    }

    #[test]
    fn test_code_ranges_match_categories() {
        for kind in ALL {
            let expected = match kind.code() {
                10..=19 => ErrorCategory::Storage,
                20..=29 => ErrorCategory::Template,
                30..=39 => ErrorCategory::Output,
                40..=49 => ErrorCategory::Config,
                _ => ErrorCategory::Internal,
            };
            assert_eq!(kind.category(), expected, "{kind}");
        }
    }

    #[test]
    fn test_display_matches_serde() {
        for kind in ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind));
        }
    }

    #[test]
    fn test_structured_error_json() {
        let err = StructuredError::new(ErrorKind::SectionNotFound, "section 'graph' not found")
            .with_context("page", "de.html");
        let json = err.to_json();
        assert!(json.contains("\"code\":21"));
        assert!(json.contains("\"category\":\"template\""));
        assert!(json.contains("\"page\":\"de.html\""));
    }

    #[test]
    fn test_remediation_not_empty() {
        for kind in ALL {
            assert!(!kind.remediation().is_empty());
            assert!(!kind.headline().is_empty());
        }
    }
}
