//! Exit codes for the corona-site CLI.
//!
//! Exit code ranges:
//! - 0: pages generated
//! - 10-19: user/environment errors (recoverable by user action)
//! - 20-29: internal errors (bugs, should be reported)

use cs_common::{ErrorCategory, ErrorKind};

/// Exit codes for generation runs.
///
/// These codes are a stable contract for automation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// All pages generated.
    Clean = 0,

    // ========================================================================
    // User / Environment Errors (10-19)
    // ========================================================================
    /// Invalid arguments
    ArgsError = 10,

    /// Configuration file missing, malformed or invalid
    ConfigError = 11,

    /// Database missing, unreadable or without expected data
    DatabaseError = 12,

    /// Running totals could not be written
    MigrationError = 13,

    /// Template missing, malformed or lacking a section
    TemplateError = 14,

    /// Output directory, page or asset could not be written
    OutputError = 15,

    // ========================================================================
    // Internal Errors (20-29)
    // ========================================================================
    /// Internal error (bug - please report)
    InternalError = 20,
}

impl ExitCode {
    /// Convert to i32 for process exit.
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    pub fn is_success(self) -> bool {
        self == ExitCode::Clean
    }

    /// Check if this exit code is a user/environment error (codes 10-19).
    pub fn is_user_error(self) -> bool {
        (10..20).contains(&(self as i32))
    }

    /// Check if this exit code is an internal error (codes 20-29).
    pub fn is_internal_error(self) -> bool {
        (self as i32) >= 20
    }

    /// Exit code for a failure kind.
    pub fn for_kind(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::NotConnected | ErrorKind::Query => ExitCode::DatabaseError,
            ErrorKind::StorageWrite => ExitCode::MigrationError,
            ErrorKind::Config => ExitCode::ConfigError,
            ErrorKind::Internal => ExitCode::InternalError,
            other => match other.category() {
                ErrorCategory::Template => ExitCode::TemplateError,
                ErrorCategory::Output => ExitCode::OutputError,
                _ => ExitCode::InternalError,
            },
        }
    }

    /// Get the error code name as a string constant (for JSON output).
    pub fn code_name(&self) -> &'static str {
        match self {
            ExitCode::Clean => "OK_CLEAN",
            ExitCode::ArgsError => "ERR_ARGS",
            ExitCode::ConfigError => "ERR_CONFIG",
            ExitCode::DatabaseError => "ERR_DATABASE",
            ExitCode::MigrationError => "ERR_MIGRATION",
            ExitCode::TemplateError => "ERR_TEMPLATE",
            ExitCode::OutputError => "ERR_OUTPUT",
            ExitCode::InternalError => "ERR_INTERNAL",
        }
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}

impl std::fmt::Display for ExitCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.code_name(), self.as_i32())
    }
}
