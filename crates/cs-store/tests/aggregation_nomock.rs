//! No-mock aggregation store tests against real SQLite files.
//!
//! Covers:
//! - Running-total migration on disk, idempotence and recompute
//! - Entity and group filtering
//! - World sums including entities without a page
//! - Incidence rounding and filtering
//! - Connection lifecycle and open failures

use chrono::NaiveDate;
use cs_common::{ErrorKind, SeriesPoint};
use cs_store::fixtures;
use cs_store::{CumulativePolicy, DerivedColumn, MigrationStep, Store, StoreError};
use rusqlite::Connection;
use std::path::PathBuf;
use tempfile::TempDir;

fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("valid date")
}

fn sample_db(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("corona.db");
    fixtures::create_sample_db(&path).expect("create sample db");
    path
}

#[test]
fn migration_persists_running_totals() {
    let dir = TempDir::new().unwrap();
    let path = sample_db(&dir);

    let mut store = Store::open(&path).unwrap();
    let report = store
        .ensure_cumulative_columns(CumulativePolicy::AddIfMissing)
        .unwrap();
    assert_eq!(report.steps.first(), Some(&MigrationStep::AddColumn(DerivedColumn::TotalCases)));
    store.close().unwrap();

    // Reopen: columns and values survive.
    let store = Store::open(&path).unwrap();
    let state = store.schema_state().unwrap();
    assert!(state.has_total_cases && state.has_total_deaths);
    assert_eq!(
        store.cumulative_series(1).unwrap(),
        vec![
            SeriesPoint::new(d("2020-03-01"), 5, 0),
            SeriesPoint::new(d("2020-03-02"), 8, 1),
            SeriesPoint::new(d("2020-03-03"), 8, 1),
        ]
    );
}

#[test]
fn second_run_is_noop_and_keeps_values() {
    let dir = TempDir::new().unwrap();
    let path = sample_db(&dir);
    let mut store = Store::open(&path).unwrap();
    store
        .ensure_cumulative_columns(CumulativePolicy::AddIfMissing)
        .unwrap();
    let before = store.cumulative_series(2).unwrap();

    let report = store
        .ensure_cumulative_columns(CumulativePolicy::AddIfMissing)
        .unwrap();
    assert!(report.is_noop());
    assert_eq!(store.cumulative_series(2).unwrap(), before);
}

#[test]
fn add_if_missing_leaves_late_rows_null() {
    let dir = TempDir::new().unwrap();
    let path = sample_db(&dir);
    let mut store = Store::open(&path).unwrap();
    store
        .ensure_cumulative_columns(CumulativePolicy::AddIfMissing)
        .unwrap();
    store.close().unwrap();

    let conn = Connection::open(&path).unwrap();
    fixtures::insert_record(&conn, 1, "2020-03-04", 4, 0, None).unwrap();
    drop(conn);

    let mut store = Store::open(&path).unwrap();
    store
        .ensure_cumulative_columns(CumulativePolicy::AddIfMissing)
        .unwrap();
    let last = *store.cumulative_series(1).unwrap().last().unwrap();
    assert_eq!(last, SeriesPoint::new(d("2020-03-04"), 0, 0));

    let report = store
        .ensure_cumulative_columns(CumulativePolicy::Recompute)
        .unwrap();
    assert_eq!(report.steps.len(), 2);
    let last = *store.cumulative_series(1).unwrap().last().unwrap();
    assert_eq!(last, SeriesPoint::new(d("2020-03-04"), 12, 1));
}

#[test]
fn entities_exclude_other_and_sort_by_name() {
    let dir = TempDir::new().unwrap();
    let store = Store::open(sample_db(&dir)).unwrap();

    let names: Vec<String> = store
        .list_entities()
        .unwrap()
        .into_iter()
        .map(|e| e.name)
        .collect();
    assert_eq!(names, vec!["Xland", "Yland", "Zland"]);

    assert_eq!(store.list_groups().unwrap(), vec!["Asia", "Europe"]);

    let europe: Vec<String> = store
        .entities_in_group("Europe")
        .unwrap()
        .into_iter()
        .map(|e| e.short_code)
        .collect();
    assert_eq!(europe, vec!["XX", "YY"]);
}

#[test]
fn entities_without_code_or_group_get_no_page() {
    let dir = TempDir::new().unwrap();
    let path = sample_db(&dir);
    let conn = Connection::open(&path).unwrap();
    fixtures::insert_entity(&conn, 5, "Nocode", 10, "", "Europe").unwrap();
    conn.execute(
        "INSERT INTO country (countryId, name, population, geoId, continent) \
         VALUES (6, 'Nogroup', 10, 'NG', NULL);",
        [],
    )
    .unwrap();
    drop(conn);

    let store = Store::open(&path).unwrap();
    let codes: Vec<String> = store
        .list_entities()
        .unwrap()
        .into_iter()
        .map(|e| e.short_code)
        .collect();
    assert_eq!(codes, vec!["XX", "YY", "ZZ"]);
    assert_eq!(store.entities_in_group("Europe").unwrap().len(), 2);
    assert_eq!(store.list_groups().unwrap(), vec!["Asia", "Europe"]);
}

#[test]
fn world_series_includes_every_entity() {
    let dir = TempDir::new().unwrap();
    let mut store = Store::open(sample_db(&dir)).unwrap();
    store
        .ensure_cumulative_columns(CumulativePolicy::AddIfMissing)
        .unwrap();

    assert_eq!(
        store.world_daily_series().unwrap(),
        vec![
            SeriesPoint::new(d("2020-03-01"), 115, 1),
            SeriesPoint::new(d("2020-03-02"), 30, 3),
            SeriesPoint::new(d("2020-03-03"), 31, 4),
        ]
    );
    assert_eq!(
        store.world_cumulative_series().unwrap(),
        vec![
            SeriesPoint::new(d("2020-03-01"), 115, 1),
            SeriesPoint::new(d("2020-03-02"), 145, 4),
            SeriesPoint::new(d("2020-03-03"), 176, 8),
        ]
    );
}

#[test]
fn incidence_is_rounded_and_skips_unknown_days() {
    let dir = TempDir::new().unwrap();
    let store = Store::open(sample_db(&dir)).unwrap();

    let points = store.incidence_series(1).unwrap();
    assert_eq!(points.len(), 2);
    assert_eq!(points[0].date, d("2020-03-02"));
    assert!((points[0].incidence - 1.23).abs() < 1e-9);
    assert!((points[1].incidence - 2.5).abs() < 1e-9);

    assert!(store.incidence_series(2).unwrap().is_empty());
}

#[test]
fn closed_store_reports_not_connected() {
    let dir = TempDir::new().unwrap();
    let mut store = Store::open(sample_db(&dir)).unwrap();
    store.close().unwrap();
    store.close().unwrap();

    let err = store.world_daily_series().unwrap_err();
    assert!(matches!(err, StoreError::NotConnected));
    assert_eq!(err.kind(), ErrorKind::NotConnected);
}

#[test]
fn missing_file_is_not_created() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("missing.db");
    let err = Store::open(&path).err().expect("open must fail");
    assert!(matches!(err, StoreError::Open { .. }));
    assert!(!path.exists());
}

#[test]
fn database_without_tables_is_query_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("empty.db");
    Connection::open(&path)
        .unwrap()
        .execute_batch("CREATE TABLE unrelated (x INTEGER);")
        .unwrap();

    let store = Store::open(&path).unwrap();
    let err = store.list_entities().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Query);
}

#[cfg(unix)]
#[test]
fn read_only_database_fails_migration_but_allows_reads() {
    use std::fs;
    use std::os::unix::fs::PermissionsExt;

    let dir = TempDir::new().unwrap();
    let path = sample_db(&dir);
    fs::set_permissions(&path, fs::Permissions::from_mode(0o444)).unwrap();

    // Root ignores file permissions; nothing to check then.
    if fs::OpenOptions::new().write(true).open(&path).is_ok() {
        return;
    }

    let mut store = Store::open(&path).unwrap();
    assert_eq!(store.list_entities().unwrap().len(), 3);

    let err = store
        .ensure_cumulative_columns(CumulativePolicy::AddIfMissing)
        .unwrap_err();
    assert!(matches!(err, StoreError::StorageWrite { .. }));
    assert_eq!(err.kind(), ErrorKind::StorageWrite);
    assert!(!store.schema_state().unwrap().has_total_cases);
}
