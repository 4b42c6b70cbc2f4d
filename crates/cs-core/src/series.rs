//! JSON literals for chart data.
//!
//! Charts take parallel arrays: dates as strings, values as numbers.

use chrono::NaiveDate;
use cs_common::{IncidencePoint, SeriesPoint};
use serde_json::Result;

/// Chart arrays of a case/death series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesJson {
    /// e.g. `["2020-03-01","2020-03-02"]`
    pub dates: String,
    pub cases: String,
    pub deaths: String,
}

/// Chart arrays of an incidence series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncidenceJson {
    pub dates: String,
    pub incidence: String,
}

pub fn encode_series(points: &[SeriesPoint]) -> Result<SeriesJson> {
    let dates: Vec<NaiveDate> = points.iter().map(|p| p.date).collect();
    let cases: Vec<i64> = points.iter().map(|p| p.cases).collect();
    let deaths: Vec<i64> = points.iter().map(|p| p.deaths).collect();
    Ok(SeriesJson {
        dates: serde_json::to_string(&dates)?,
        cases: serde_json::to_string(&cases)?,
        deaths: serde_json::to_string(&deaths)?,
    })
}

pub fn encode_incidence(points: &[IncidencePoint]) -> Result<IncidenceJson> {
    let dates: Vec<NaiveDate> = points.iter().map(|p| p.date).collect();
    let values: Vec<f64> = points.iter().map(|p| p.incidence).collect();
    Ok(IncidenceJson {
        dates: serde_json::to_string(&dates)?,
        incidence: serde_json::to_string(&values)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_series_arrays() {
        let json = encode_series(&[
            SeriesPoint::new(d("2020-01-01"), 5, 0),
            SeriesPoint::new(d("2020-01-02"), 8, 1),
        ])
        .unwrap();
        assert_eq!(json.dates, r#"["2020-01-01","2020-01-02"]"#);
        assert_eq!(json.cases, "[5,8]");
        assert_eq!(json.deaths, "[0,1]");
    }

    #[test]
    fn test_empty_series() {
        let json = encode_series(&[]).unwrap();
        assert_eq!(json.dates, "[]");
        assert_eq!(json.cases, "[]");
    }

    #[test]
    fn test_incidence_arrays() {
        let json = encode_incidence(&[
            IncidencePoint { date: d("2020-03-02"), incidence: 1.23 },
            IncidencePoint { date: d("2020-03-03"), incidence: 2.5 },
        ])
        .unwrap();
        assert_eq!(json.dates, r#"["2020-03-02","2020-03-03"]"#);
        assert_eq!(json.incidence, "[1.23,2.5]");
    }

    proptest! {
        #[test]
        fn arrays_stay_parallel(values in prop::collection::vec((0i64..1_000_000, 0i64..10_000), 0..50)) {
            let start = d("2020-01-01");
            let points: Vec<SeriesPoint> = values
                .iter()
                .enumerate()
                .map(|(i, (c, x))| SeriesPoint::new(start + chrono::Duration::days(i as i64), *c, *x))
                .collect();
            let json = encode_series(&points).unwrap();
            let dates: Vec<String> = serde_json::from_str(&json.dates).unwrap();
            let cases: Vec<i64> = serde_json::from_str(&json.cases).unwrap();
            prop_assert_eq!(dates.len(), points.len());
            prop_assert_eq!(cases, values.iter().map(|(c, _)| *c).collect::<Vec<_>>());
        }
    }
}
