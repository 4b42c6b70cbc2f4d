//! SQLite-backed aggregation store.
//!
//! All series are returned ordered by date ascending. World series sum every
//! record of a date, including entities that get no page of their own. The
//! world running total is built from the daily sums, so an entity without a
//! row on some date still counts with everything it reported before.

use crate::error::{Result, StoreError};
use crate::migration::{
    plan_migration, CumulativePolicy, DerivedColumn, MigrationReport, MigrationStep, SchemaState,
};
use crate::schema::{self, ENTITY_TABLE, INCIDENCE_COLUMN, RECORD_TABLE};
use cs_common::{Entity, IncidencePoint, SeriesPoint, OTHER_GROUP_TAG};
use once_cell::unsync::OnceCell;
use rusqlite::{params, Connection, OpenFlags, Params, Row};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Aggregation store over one SQLite database.
pub struct Store {
    conn: Option<Connection>,
    path: PathBuf,
    has_incidence: OnceCell<bool>,
}

impl Store {
    /// Open an existing database file.
    ///
    /// The file is never created. If it is read-only on disk, reads still work
    /// and only a migration with pending steps fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if !path.is_file() {
            return Err(StoreError::Open {
                path,
                reason: "file does not exist or is not a regular file".to_string(),
            });
        }
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_URI
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(&path, flags).map_err(|e| StoreError::Open {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        debug!(path = %path.display(), "Opened database");
        Ok(Self {
            conn: Some(conn),
            path,
            has_incidence: OnceCell::new(),
        })
    }

    /// Wrap an already open connection.
    pub fn from_connection(conn: Connection) -> Self {
        let path = conn
            .path()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(":memory:"));
        Self {
            conn: Some(conn),
            path,
            has_incidence: OnceCell::new(),
        }
    }

    /// Path of the database file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether a live connection exists.
    pub fn is_connected(&self) -> bool {
        self.conn.is_some()
    }

    /// Close the connection. Every later operation fails with `NotConnected`.
    pub fn close(&mut self) -> Result<()> {
        if let Some(conn) = self.conn.take() {
            conn.close().map_err(|(_, e)| StoreError::Query(e.to_string()))?;
        }
        Ok(())
    }

    fn conn(&self) -> Result<&Connection> {
        self.conn.as_ref().ok_or(StoreError::NotConnected)
    }

    /// Current state of the derived columns.
    pub fn schema_state(&self) -> Result<SchemaState> {
        let columns = schema::column_names(self.conn()?, RECORD_TABLE)?;
        Ok(SchemaState::from_columns(&columns))
    }

    /// Make sure `totalCases` and `totalDeaths` exist and hold running totals.
    ///
    /// All steps run in one transaction; on failure nothing is changed.
    /// Calling it again under [`CumulativePolicy::AddIfMissing`] is a no-op.
    pub fn ensure_cumulative_columns(
        &mut self,
        policy: CumulativePolicy,
    ) -> Result<MigrationReport> {
        let state = self.schema_state()?;
        let steps = plan_migration(&state, policy);
        if steps.is_empty() {
            debug!("Accumulated numbers are present, nothing to do");
            return Ok(MigrationReport::default());
        }
        self.apply_migration(&steps)
    }

    /// Execute planned migration steps inside one transaction.
    pub fn apply_migration(&mut self, steps: &[MigrationStep]) -> Result<MigrationReport> {
        let mut report = MigrationReport::default();
        let conn = self.conn.as_mut().ok_or(StoreError::NotConnected)?;
        let tx = conn.transaction().map_err(|e| write_error("start transaction", e))?;
        for step in steps {
            match step {
                MigrationStep::AddColumn(column) => {
                    let sql = format!(
                        "ALTER TABLE {} ADD COLUMN {} INTEGER;",
                        RECORD_TABLE,
                        column.column()
                    );
                    tx.execute_batch(&sql)
                        .map_err(|e| write_error(&step.to_string(), e))?;
                    info!(column = %column, "Added column to table {}", RECORD_TABLE);
                }
                MigrationStep::Populate(column) => {
                    info!(
                        column = %column,
                        "Calculating accumulated numbers for each day and entity. This may take a while..."
                    );
                    let updated = tx
                        .execute(&populate_sql(*column), [])
                        .map_err(|e| write_error(&step.to_string(), e))?;
                    info!(column = %column, rows = updated, "Rows have been updated");
                    report.rows_updated += updated;
                }
            }
            report.steps.push(*step);
        }
        tx.commit().map_err(|e| write_error("commit migration", e))?;
        Ok(report)
    }

    /// All entities that get a page, ordered by name.
    pub fn list_entities(&self) -> Result<Vec<Entity>> {
        let sql = format!(
            "SELECT countryId, name, population, geoId, continent FROM {} \
             WHERE IFNULL(geoId, '') <> '' AND IFNULL(continent, '') <> '' AND continent <> ?1 \
             ORDER BY name ASC;",
            ENTITY_TABLE
        );
        self.query_rows(&sql, params![OTHER_GROUP_TAG], entity_from_row)
    }

    /// Entities of one group, ordered by name.
    pub fn entities_in_group(&self, group_tag: &str) -> Result<Vec<Entity>> {
        let sql = format!(
            "SELECT countryId, name, population, geoId, continent FROM {} \
             WHERE IFNULL(geoId, '') <> '' AND continent = ?1 \
             ORDER BY name ASC;",
            ENTITY_TABLE
        );
        self.query_rows(&sql, params![group_tag], entity_from_row)
    }

    /// Distinct group tags that have at least one entity with a page.
    pub fn list_groups(&self) -> Result<Vec<String>> {
        let sql = format!(
            "SELECT DISTINCT continent FROM {} \
             WHERE IFNULL(geoId, '') <> '' AND IFNULL(continent, '') <> '' AND continent <> ?1 \
             ORDER BY continent ASC;",
            ENTITY_TABLE
        );
        self.query_rows(&sql, params![OTHER_GROUP_TAG], |row| row.get(0))
    }

    /// Raw daily numbers of one entity.
    pub fn daily_series(&self, entity_id: i64) -> Result<Vec<SeriesPoint>> {
        let sql = format!(
            "SELECT date, cases, deaths FROM {} WHERE countryId = ?1 ORDER BY date ASC;",
            RECORD_TABLE
        );
        self.query_rows(&sql, params![entity_id], series_from_row)
    }

    /// Accumulated numbers of one entity.
    pub fn cumulative_series(&self, entity_id: i64) -> Result<Vec<SeriesPoint>> {
        let sql = format!(
            "SELECT date, {}, {} FROM {} WHERE countryId = ?1 ORDER BY date ASC;",
            DerivedColumn::TotalCases.column(),
            DerivedColumn::TotalDeaths.column(),
            RECORD_TABLE
        );
        self.query_rows(&sql, params![entity_id], series_from_row)
    }

    /// Raw daily numbers summed over all entities.
    pub fn world_daily_series(&self) -> Result<Vec<SeriesPoint>> {
        let sql = format!(
            "SELECT date, SUM(cases), SUM(deaths) FROM {} GROUP BY date ORDER BY date ASC;",
            RECORD_TABLE
        );
        self.query_rows(&sql, params![], series_from_row)
    }

    /// Running totals of the world daily numbers.
    ///
    /// Computed from the raw counts, so it does not depend on the derived
    /// columns and never decreases.
    pub fn world_cumulative_series(&self) -> Result<Vec<SeriesPoint>> {
        let sql = format!(
            "SELECT date, SUM(SUM(cases)) OVER (ORDER BY date), \
                    SUM(SUM(deaths)) OVER (ORDER BY date) \
             FROM {} GROUP BY date ORDER BY date ASC;",
            RECORD_TABLE
        );
        self.query_rows(&sql, params![], series_from_row)
    }

    /// Precomputed 14-day incidence of one entity, rounded to two decimals.
    ///
    /// Days without a known (non-negative) value are skipped. An empty result
    /// means there is no incidence data, which is not an error.
    ///
    /// The column lookup happens on the first call only.
    pub fn incidence_series(&self, entity_id: i64) -> Result<Vec<IncidencePoint>> {
        if !self.has_incidence_column()? {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT date, ROUND({col}, 2) FROM {table} \
             WHERE countryId = ?1 AND IFNULL({col}, -1.0) >= 0.0 \
             ORDER BY date ASC;",
            col = INCIDENCE_COLUMN,
            table = RECORD_TABLE
        );
        self.query_rows(&sql, params![entity_id], |row| {
            Ok(IncidencePoint {
                date: row.get(0)?,
                incidence: row.get(1)?,
            })
        })
    }

    fn has_incidence_column(&self) -> Result<bool> {
        let conn = self.conn()?;
        self.has_incidence
            .get_or_try_init(|| -> Result<bool> {
                let present = schema::has_column(conn, RECORD_TABLE, INCIDENCE_COLUMN)?;
                if !present {
                    warn!(
                        "Table {} has no column {}, incidence graphs are skipped",
                        RECORD_TABLE, INCIDENCE_COLUMN
                    );
                }
                Ok(present)
            })
            .copied()
    }

    fn query_rows<T, P, F>(&self, sql: &str, params: P, map: F) -> Result<Vec<T>>
    where
        P: Params,
        F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
    {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map(params, map)?;
        let data = rows.collect::<rusqlite::Result<Vec<T>>>()?;
        Ok(data)
    }
}

/// Prefix sum over dates per entity, written into the derived column.
///
/// The default RANGE frame includes peers, so every record gets the sum over
/// all records of its entity dated on or before it, duplicates included.
fn populate_sql(column: DerivedColumn) -> String {
    format!(
        "UPDATE {table} SET {target} = running.total \
         FROM (SELECT DISTINCT countryId, date, \
                      SUM({source}) OVER (PARTITION BY countryId ORDER BY date) AS total \
               FROM {table}) AS running \
         WHERE {table}.countryId = running.countryId AND {table}.date = running.date;",
        table = RECORD_TABLE,
        target = column.column(),
        source = column.source_column()
    )
}

fn write_error(step: &str, err: rusqlite::Error) -> StoreError {
    StoreError::StorageWrite {
        step: step.to_string(),
        message: err.to_string(),
    }
}

fn entity_from_row(row: &Row<'_>) -> rusqlite::Result<Entity> {
    Ok(Entity {
        id: row.get(0)?,
        name: row.get(1)?,
        population: row.get::<_, Option<i64>>(2)?.unwrap_or(0),
        short_code: row.get(3)?,
        group_tag: row.get(4)?,
    })
}

fn series_from_row(row: &Row<'_>) -> rusqlite::Result<SeriesPoint> {
    Ok(SeriesPoint {
        date: row.get(0)?,
        cases: row.get::<_, Option<i64>>(1)?.unwrap_or(0),
        deaths: row.get::<_, Option<i64>>(2)?.unwrap_or(0),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use chrono::NaiveDate;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn store_with(records: &[(i64, &str, i64, i64)]) -> Store {
        let conn = Connection::open_in_memory().unwrap();
        fixtures::create_schema(&conn).unwrap();
        fixtures::insert_entity(&conn, 1, "Xland", 1000, "XX", "Europe").unwrap();
        fixtures::insert_entity(&conn, 2, "Yland", 2000, "YY", "Europe").unwrap();
        for (id, date, cases, deaths) in records {
            fixtures::insert_record(&conn, *id, date, *cases, *deaths, None).unwrap();
        }
        Store::from_connection(conn)
    }

    #[test]
    fn test_prefix_sum_for_single_entity() {
        let mut store = store_with(&[(1, "2020-01-01", 5, 0), (1, "2020-01-02", 3, 1)]);
        let report = store
            .ensure_cumulative_columns(CumulativePolicy::AddIfMissing)
            .unwrap();
        assert_eq!(report.steps.len(), 4);
        assert_eq!(report.rows_updated, 4);

        let totals = store.cumulative_series(1).unwrap();
        assert_eq!(
            totals,
            vec![
                SeriesPoint::new(d("2020-01-01"), 5, 0),
                SeriesPoint::new(d("2020-01-02"), 8, 1),
            ]
        );
    }

    #[test]
    fn test_prefix_sum_is_per_entity() {
        let mut store = store_with(&[
            (1, "2020-01-01", 1, 0),
            (2, "2020-01-01", 10, 0),
            (1, "2020-01-02", 2, 0),
            (2, "2020-01-02", 20, 0),
        ]);
        store
            .ensure_cumulative_columns(CumulativePolicy::AddIfMissing)
            .unwrap();
        let x: Vec<i64> = store.cumulative_series(1).unwrap().iter().map(|p| p.cases).collect();
        let y: Vec<i64> = store.cumulative_series(2).unwrap().iter().map(|p| p.cases).collect();
        assert_eq!(x, vec![1, 3]);
        assert_eq!(y, vec![10, 30]);
    }

    #[test]
    fn test_world_sums_per_date() {
        let store = store_with(&[
            (1, "2020-01-02", 2, 1),
            (2, "2020-01-01", 10, 0),
            (1, "2020-01-01", 1, 0),
        ]);
        let world = store.world_daily_series().unwrap();
        assert_eq!(
            world,
            vec![
                SeriesPoint::new(d("2020-01-01"), 11, 0),
                SeriesPoint::new(d("2020-01-02"), 2, 1),
            ]
        );
    }

    #[test]
    fn test_world_running_total_keeps_entities_without_a_record() {
        let store = store_with(&[
            (1, "2020-01-01", 5, 1),
            (2, "2020-01-01", 10, 0),
            (1, "2020-01-02", 3, 0),
            (2, "2020-01-03", 1, 2),
        ]);
        let world = store.world_cumulative_series().unwrap();
        assert_eq!(
            world,
            vec![
                SeriesPoint::new(d("2020-01-01"), 15, 1),
                SeriesPoint::new(d("2020-01-02"), 18, 1),
                SeriesPoint::new(d("2020-01-03"), 19, 3),
            ]
        );
    }

    #[test]
    fn test_duplicate_dates_share_one_running_total() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE covid19 (countryId INTEGER, date TEXT, cases INTEGER, deaths INTEGER);
             INSERT INTO covid19 VALUES (1, '2020-01-01', 2, 0);
             INSERT INTO covid19 VALUES (1, '2020-01-02', 3, 1);
             INSERT INTO covid19 VALUES (1, '2020-01-02', 4, 1);
             INSERT INTO covid19 VALUES (1, '2020-01-03', 1, 0);",
        )
        .unwrap();
        let mut store = Store::from_connection(conn);
        store
            .ensure_cumulative_columns(CumulativePolicy::AddIfMissing)
            .unwrap();
        let totals = store.cumulative_series(1).unwrap();
        let cases: Vec<i64> = totals.iter().map(|p| p.cases).collect();
        let deaths: Vec<i64> = totals.iter().map(|p| p.deaths).collect();
        assert_eq!(cases, vec![2, 9, 9, 10]);
        assert_eq!(deaths, vec![0, 2, 2, 2]);
    }

    #[test]
    fn test_second_migration_is_noop() {
        let mut store = store_with(&[(1, "2020-01-01", 5, 0)]);
        store
            .ensure_cumulative_columns(CumulativePolicy::AddIfMissing)
            .unwrap();
        let report = store
            .ensure_cumulative_columns(CumulativePolicy::AddIfMissing)
            .unwrap();
        assert!(report.is_noop());
        assert_eq!(report.rows_updated, 0);
    }

    #[test]
    fn test_closed_store_is_not_connected() {
        let mut store = store_with(&[]);
        store.close().unwrap();
        assert!(!store.is_connected());
        assert!(matches!(store.list_entities(), Err(StoreError::NotConnected)));
        assert!(matches!(store.daily_series(1), Err(StoreError::NotConnected)));
        assert!(matches!(
            store.ensure_cumulative_columns(CumulativePolicy::AddIfMissing),
            Err(StoreError::NotConnected)
        ));
    }

    #[test]
    fn test_cumulative_series_before_migration_is_query_error() {
        let store = store_with(&[(1, "2020-01-01", 5, 0)]);
        assert!(matches!(store.cumulative_series(1), Err(StoreError::Query(_))));
    }

    #[test]
    fn test_incidence_without_column_is_empty() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE covid19 (countryId INTEGER, date TEXT, cases INTEGER, deaths INTEGER);",
        )
        .unwrap();
        let store = Store::from_connection(conn);
        assert!(store.incidence_series(1).unwrap().is_empty());
    }

    #[test]
    fn test_incidence_column_checked_once() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE covid19 (countryId INTEGER, date TEXT, cases INTEGER, deaths INTEGER);
             INSERT INTO covid19 VALUES (1, '2020-01-01', 2, 0);",
        )
        .unwrap();
        let store = Store::from_connection(conn);
        assert!(store.incidence_series(1).unwrap().is_empty());

        // A column added later is not seen by this store.
        store
            .conn()
            .unwrap()
            .execute_batch(
                "ALTER TABLE covid19 ADD COLUMN incidence14 REAL;
                 UPDATE covid19 SET incidence14 = 1.5;",
            )
            .unwrap();
        assert!(store.incidence_series(1).unwrap().is_empty());

        let fresh = Store::from_connection(Connection::open_in_memory().unwrap());
        fixtures::populate_sample(fresh.conn().unwrap()).unwrap();
        assert_eq!(fresh.incidence_series(1).unwrap().len(), 2);
        assert_eq!(fresh.incidence_series(2).unwrap().len(), 0);
    }

    #[test]
    fn test_open_missing_file_fails() {
        let err = Store::open("/definitely/not/here.db").err().unwrap();
        assert!(matches!(err, StoreError::Open { .. }));
        assert_eq!(err.kind(), cs_common::ErrorKind::NotConnected);
    }
}
