//! Corona site generator library.
//!
//! Turns a SQLite database of daily case numbers into a static HTML site:
//! - Exit codes for the command line tool
//! - Structured logging
//! - Page assembly on top of `cs-store` and `cs-template`
//! - Output directory handling
//!
//! The binary entry point is in `main.rs`.

#[macro_use]
pub mod logging;

pub mod error;
pub mod exit_codes;
pub mod output;
pub mod series;
pub mod site;

pub use error::{Result, SiteError, StepContext};
pub use exit_codes::ExitCode;
pub use site::{GenerationSummary, SiteGenerator};
