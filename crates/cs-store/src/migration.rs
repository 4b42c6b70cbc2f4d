//! Running-total migration.
//!
//! The `covid19` table only carries raw daily counts. Accumulated counts are
//! stored in two derived columns, `totalCases` and `totalDeaths`, which are
//! added and filled on first use. Planning is a pure function of the current
//! schema so it can be tested without a database; applying the plan happens
//! in [`crate::Store::ensure_cumulative_columns`].

use serde::{Deserialize, Serialize};

/// When to (re)compute the derived running-total columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CumulativePolicy {
    /// Add and fill a column only if it does not exist yet.
    /// Rows inserted after the first run keep a NULL total.
    #[default]
    AddIfMissing,
    /// Refill both columns on every run.
    Recompute,
}

impl std::str::FromStr for CumulativePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "add_if_missing" | "once" => Ok(CumulativePolicy::AddIfMissing),
            "recompute" | "always" => Ok(CumulativePolicy::Recompute),
            _ => Err(format!("unknown cumulative policy: {}", s)),
        }
    }
}

impl std::fmt::Display for CumulativePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CumulativePolicy::AddIfMissing => write!(f, "add_if_missing"),
            CumulativePolicy::Recompute => write!(f, "recompute"),
        }
    }
}

/// A derived running-total column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DerivedColumn {
    TotalCases,
    TotalDeaths,
}

impl DerivedColumn {
    pub const ALL: [DerivedColumn; 2] = [DerivedColumn::TotalCases, DerivedColumn::TotalDeaths];

    /// Name of the derived column.
    pub fn column(&self) -> &'static str {
        match self {
            DerivedColumn::TotalCases => "totalCases",
            DerivedColumn::TotalDeaths => "totalDeaths",
        }
    }

    /// Name of the raw column the running total is computed from.
    pub fn source_column(&self) -> &'static str {
        match self {
            DerivedColumn::TotalCases => "cases",
            DerivedColumn::TotalDeaths => "deaths",
        }
    }
}

impl std::fmt::Display for DerivedColumn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.column())
    }
}

/// Which derived columns currently exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SchemaState {
    pub has_total_cases: bool,
    pub has_total_deaths: bool,
}

impl SchemaState {
    /// Build the state from the column list of the records table.
    pub fn from_columns<S: AsRef<str>>(columns: &[S]) -> Self {
        let has = |name: &str| columns.iter().any(|c| c.as_ref() == name);
        SchemaState {
            has_total_cases: has(DerivedColumn::TotalCases.column()),
            has_total_deaths: has(DerivedColumn::TotalDeaths.column()),
        }
    }

    pub fn has(&self, column: DerivedColumn) -> bool {
        match column {
            DerivedColumn::TotalCases => self.has_total_cases,
            DerivedColumn::TotalDeaths => self.has_total_deaths,
        }
    }
}

/// One action of the migration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MigrationStep {
    /// `ALTER TABLE covid19 ADD COLUMN <column> INTEGER`.
    AddColumn(DerivedColumn),
    /// Fill the column with the per-entity prefix sum over dates.
    Populate(DerivedColumn),
}

impl MigrationStep {
    pub fn column(&self) -> DerivedColumn {
        match self {
            MigrationStep::AddColumn(c) | MigrationStep::Populate(c) => *c,
        }
    }
}

impl std::fmt::Display for MigrationStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MigrationStep::AddColumn(c) => write!(f, "add column {}", c),
            MigrationStep::Populate(c) => write!(f, "calculate {}", c),
        }
    }
}

/// Compute the steps that bring the running-total columns up to date.
///
/// Under [`CumulativePolicy::AddIfMissing`] an existing column is left alone,
/// so a second call after a successful migration returns no steps.
pub fn plan_migration(state: &SchemaState, policy: CumulativePolicy) -> Vec<MigrationStep> {
    let mut steps = Vec::new();
    for column in DerivedColumn::ALL {
        if !state.has(column) {
            steps.push(MigrationStep::AddColumn(column));
            steps.push(MigrationStep::Populate(column));
        } else if policy == CumulativePolicy::Recompute {
            steps.push(MigrationStep::Populate(column));
        }
    }
    steps
}

/// Outcome of [`crate::Store::ensure_cumulative_columns`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationReport {
    /// Steps that were executed.
    pub steps: Vec<MigrationStep>,
    /// Rows touched by the populate steps.
    pub rows_updated: usize,
}

impl MigrationReport {
    /// True if nothing was changed.
    pub fn is_noop(&self) -> bool {
        self.steps.is_empty()
    }
}
