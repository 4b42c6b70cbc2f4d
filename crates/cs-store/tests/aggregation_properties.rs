//! Property-based tests for running totals and world sums.

use chrono::{Duration, NaiveDate};
use cs_store::fixtures;
use cs_store::{CumulativePolicy, Store};
use proptest::prelude::*;
use rusqlite::Connection;

fn day(offset: usize) -> String {
    let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
    (start + Duration::days(offset as i64)).format("%Y-%m-%d").to_string()
}

/// Store with one entity per inner vector, one record per day.
fn build_store(series: &[Vec<(i64, i64)>]) -> Store {
    let shifted: Vec<(usize, Vec<(i64, i64)>)> =
        series.iter().map(|records| (0, records.clone())).collect();
    build_shifted_store(&shifted)
}

/// Like [`build_store`], but each entity starts reporting `start` days late.
fn build_shifted_store(series: &[(usize, Vec<(i64, i64)>)]) -> Store {
    let conn = Connection::open_in_memory().unwrap();
    fixtures::create_schema(&conn).unwrap();
    for (idx, (start, records)) in series.iter().enumerate() {
        let id = idx as i64 + 1;
        let code = format!("E{id}");
        fixtures::insert_entity(&conn, id, &format!("Entity {id}"), 100, &code, "Europe").unwrap();
        // Insert in reverse to make sure ordering does not depend on rowid.
        for (offset, (cases, deaths)) in records.iter().enumerate().rev() {
            fixtures::insert_record(&conn, id, &day(start + offset), *cases, *deaths, None)
                .unwrap();
        }
    }
    Store::from_connection(conn)
}

fn counts() -> impl Strategy<Value = Vec<(i64, i64)>> {
    prop::collection::vec((0i64..10_000, 0i64..500), 1..20)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn running_total_is_prefix_sum(records in counts()) {
        let mut store = build_store(std::slice::from_ref(&records));
        store.ensure_cumulative_columns(CumulativePolicy::AddIfMissing).unwrap();

        let totals = store.cumulative_series(1).unwrap();
        prop_assert_eq!(totals.len(), records.len());
        let (mut cases, mut deaths) = (0, 0);
        for (point, (c, d)) in totals.iter().zip(records.iter()) {
            cases += c;
            deaths += d;
            prop_assert_eq!(point.cases, cases);
            prop_assert_eq!(point.deaths, deaths);
        }
    }

    #[test]
    fn world_daily_is_sum_over_entities(series in prop::collection::vec(counts(), 1..5)) {
        let store = build_store(&series);
        let world = store.world_daily_series().unwrap();

        let days = series.iter().map(Vec::len).max().unwrap_or(0);
        prop_assert_eq!(world.len(), days);
        for (offset, point) in world.iter().enumerate() {
            let expected: i64 = series
                .iter()
                .filter_map(|records| records.get(offset))
                .map(|(c, _)| c)
                .sum();
            prop_assert_eq!(point.cases, expected);
        }
    }

    #[test]
    fn world_cumulative_is_running_sum_of_world_daily(
        series in prop::collection::vec((0usize..10, counts()), 1..5)
    ) {
        let mut store = build_shifted_store(&series);
        store.ensure_cumulative_columns(CumulativePolicy::AddIfMissing).unwrap();
        let daily = store.world_daily_series().unwrap();
        let totals = store.world_cumulative_series().unwrap();

        prop_assert_eq!(totals.len(), daily.len());
        let (mut cases, mut deaths) = (0, 0);
        let mut previous: Option<(i64, i64)> = None;
        for (point, day_point) in totals.iter().zip(daily.iter()) {
            prop_assert_eq!(point.date, day_point.date);
            cases += day_point.cases;
            deaths += day_point.deaths;
            prop_assert_eq!(point.cases, cases);
            prop_assert_eq!(point.deaths, deaths);
            if let Some((c, d)) = previous {
                prop_assert!(point.cases >= c && point.deaths >= d);
            }
            previous = Some((point.cases, point.deaths));
        }
    }

    #[test]
    fn recompute_matches_first_migration(records in counts()) {
        let mut store = build_store(std::slice::from_ref(&records));
        store.ensure_cumulative_columns(CumulativePolicy::AddIfMissing).unwrap();
        let first = store.cumulative_series(1).unwrap();
        store.ensure_cumulative_columns(CumulativePolicy::Recompute).unwrap();
        prop_assert_eq!(store.cumulative_series(1).unwrap(), first);
    }
}
