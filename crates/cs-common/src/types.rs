//! Entity and time-series types.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Group tag of entities that never get a page of their own.
pub const OTHER_GROUP_TAG: &str = "Other";

/// A country or region for which a time series is reported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    /// Database id.
    pub id: i64,
    /// Display name, e.g. "Germany".
    pub name: String,
    /// Population size.
    pub population: i64,
    /// Short code, e.g. "DE". Used for file names.
    pub short_code: String,
    /// Group tag, e.g. the continent.
    pub group_tag: String,
}

impl Entity {
    /// Name of the HTML page for this entity: lowercased short code plus ".html".
    pub fn page_file_name(&self) -> String {
        format!("{}.html", self.short_code.to_lowercase())
    }

    /// Label used in titles and links, e.g. "Germany (DE)".
    pub fn label(&self) -> String {
        format!("{} ({})", self.name, self.short_code)
    }
}

/// Counts of a single day: either raw daily counts or running totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub cases: i64,
    pub deaths: i64,
}

impl SeriesPoint {
    pub fn new(date: NaiveDate, cases: i64, deaths: i64) -> Self {
        Self {
            date,
            cases,
            deaths,
        }
    }
}

/// A single value of the precomputed 14-day incidence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IncidencePoint {
    pub date: NaiveDate,
    pub incidence: f64,
}

/// Name of the group page file: "group_" plus the lowercased tag plus ".html".
pub fn group_page_file_name(group_tag: &str) -> String {
    format!("group_{}.html", group_tag.to_lowercase())
}
