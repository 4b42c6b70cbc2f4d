//! Table and column names of the corona database.
//!
//! Tables used:
//! - `country`: one row per entity (`countryId`, `name`, `population`, `geoId`, `continent`)
//! - `covid19`: one row per entity and date (`countryId`, `date`, `cases`, `deaths`,
//!   optional `incidence14`, derived `totalCases` and `totalDeaths`)

use rusqlite::Connection;

/// Table holding the entities.
pub const ENTITY_TABLE: &str = "country";

/// Table holding the daily records.
pub const RECORD_TABLE: &str = "covid19";

/// Column with the precomputed 14-day incidence.
pub const INCIDENCE_COLUMN: &str = "incidence14";

/// Names of all columns of a table, in declaration order.
///
/// Returns an empty list if the table does not exist.
pub fn column_names(conn: &Connection, table: &str) -> rusqlite::Result<Vec<String>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({});", table))?;
    let names = stmt.query_map([], |row| row.get::<_, String>(1))?;
    names.collect()
}

/// Whether `table` has a column named `column`.
pub fn has_column(conn: &Connection, table: &str, column: &str) -> rusqlite::Result<bool> {
    Ok(column_names(conn, table)?.iter().any(|c| c == column))
}
