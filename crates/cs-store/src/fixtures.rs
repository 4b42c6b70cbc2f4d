//! Database fixtures for tests.
//!
//! Builds the `country` / `covid19` layout the importer produces, without the
//! derived running-total columns.

use rusqlite::{params, Connection};
use std::path::Path;

/// Create both tables, including the optional incidence column.
pub fn create_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "CREATE TABLE country (
             countryId INTEGER PRIMARY KEY,
             name TEXT NOT NULL,
             population INTEGER,
             geoId TEXT,
             countryCode TEXT,
             continent TEXT
         );
         CREATE TABLE covid19 (
             countryId INTEGER NOT NULL,
             date TEXT NOT NULL,
             cases INTEGER NOT NULL,
             deaths INTEGER NOT NULL,
             incidence14 REAL,
             PRIMARY KEY (countryId, date)
         );",
    )
}

pub fn insert_entity(
    conn: &Connection,
    id: i64,
    name: &str,
    population: i64,
    short_code: &str,
    group_tag: &str,
) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO country (countryId, name, population, geoId, countryCode, continent) \
         VALUES (?1, ?2, ?3, ?4, ?4, ?5);",
        params![id, name, population, short_code, group_tag],
    )?;
    Ok(())
}

pub fn insert_record(
    conn: &Connection,
    entity_id: i64,
    date: &str,
    cases: i64,
    deaths: i64,
    incidence: Option<f64>,
) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO covid19 (countryId, date, cases, deaths, incidence14) \
         VALUES (?1, ?2, ?3, ?4, ?5);",
        params![entity_id, date, cases, deaths, incidence],
    )?;
    Ok(())
}

/// Small data set: two European entities, one Asian and one "Other" entry.
///
/// | id | name    | code | group  |
/// |----|---------|------|--------|
/// | 1  | Xland   | XX   | Europe |
/// | 2  | Yland   | YY   | Europe |
/// | 3  | Zland   | ZZ   | Asia   |
/// | 4  | Cruise  | JPG11668 | Other |
///
/// Records cover 2020-03-01 to 2020-03-03. Only Xland has incidence values,
/// and its first day is unknown (-1 in the source data).
pub fn populate_sample(conn: &Connection) -> rusqlite::Result<()> {
    create_schema(conn)?;
    insert_entity(conn, 1, "Xland", 1_000_000, "XX", "Europe")?;
    insert_entity(conn, 2, "Yland", 2_000_000, "YY", "Europe")?;
    insert_entity(conn, 3, "Zland", 500_000, "ZZ", "Asia")?;
    insert_entity(conn, 4, "Cruise ship", 3_711, "JPG11668", "Other")?;

    insert_record(conn, 1, "2020-03-01", 5, 0, Some(-1.0))?;
    insert_record(conn, 1, "2020-03-02", 3, 1, Some(1.234))?;
    insert_record(conn, 1, "2020-03-03", 0, 0, Some(2.5))?;
    insert_record(conn, 2, "2020-03-01", 10, 0, None)?;
    insert_record(conn, 2, "2020-03-02", 20, 2, None)?;
    insert_record(conn, 2, "2020-03-03", 30, 3, None)?;
    insert_record(conn, 3, "2020-03-02", 7, 0, None)?;
    insert_record(conn, 3, "2020-03-03", 1, 1, None)?;
    insert_record(conn, 4, "2020-03-01", 100, 1, None)?;
    Ok(())
}

/// Write the sample data set to a new database file.
pub fn create_sample_db(path: &Path) -> rusqlite::Result<()> {
    let conn = Connection::open(path)?;
    populate_sample(&conn)
}
