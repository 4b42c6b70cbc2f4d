//! Runtime checks of the linked SQLite library.

use serde::Serialize;

/// Outcome of a check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "message", rename_all = "snake_case")]
pub enum Status {
    Ok,
    Warn(String),
    Error(String),
}

/// Oldest version with `UPDATE ... FROM`, used by the running-total migration.
pub const MIN_SQLITE_VERSION: i32 = 3_033_000;

/// Oldest version this generator has been run against.
pub const TESTED_SQLITE_VERSION: i32 = 3_037_000;

/// Check the SQLite version linked into the binary.
pub fn sqlite_check() -> Status {
    check_version(rusqlite::version_number(), rusqlite::version())
}

fn check_version(number: i32, text: &str) -> Status {
    if number < MIN_SQLITE_VERSION {
        return Status::Error(format!(
            "The SQLite version you are using ({}) is too old for this program. \
             At least SQLite 3.33.0 is required.",
            text
        ));
    }
    if number < TESTED_SQLITE_VERSION {
        return Status::Warn(format!(
            "The SQLite version you are using ({}) has not been tested with this program. \
             Update to SQLite 3.37.0 or later to avoid that warning.",
            text
        ));
    }
    Status::Ok
}
