//! Stable event names and per-run context.

use serde::{Deserialize, Serialize};

/// Stages of a generation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Startup, configuration and checks.
    Init,
    /// Running-total migration.
    Migrate,
    /// Entity, world and group pages.
    Pages,
    /// Asset copy.
    Assets,
    /// Index page.
    Index,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Stage::Init => "init",
            Stage::Migrate => "migrate",
            Stage::Pages => "pages",
            Stage::Assets => "assets",
            Stage::Index => "index",
        };
        write!(f, "{}", s)
    }
}

/// Standard event names used in logging.
pub mod event_names {
    // Run lifecycle
    pub const RUN_STARTED: &str = "run.started";
    pub const RUN_FINISHED: &str = "run.finished";
    pub const RUN_FAILED: &str = "run.failed";

    // Init
    pub const CONFIG_LOADED: &str = "config.loaded";
    pub const SQLITE_CHECK: &str = "sqlite.check";
    pub const TEMPLATE_LOADED: &str = "template.loaded";

    // Migration
    pub const MIGRATION_STEP: &str = "migration.step";
    pub const MIGRATION_FINISHED: &str = "migration.finished";

    // Pages
    pub const PAGE_WRITTEN: &str = "page.written";
    pub const PAGE_SKIPPED_GRAPH: &str = "page.skipped_graph";
    pub const ASSET_COPIED: &str = "asset.copied";
}

/// Correlation data attached to run events.
#[derive(Debug, Clone)]
pub struct LogContext {
    /// Unique ID for this invocation.
    pub run_id: String,
}

impl LogContext {
    pub fn new(run_id: impl Into<String>) -> Self {
        LogContext {
            run_id: run_id.into(),
        }
    }
}
