use crate::error::{ReconcileError, Result};
use crate::schema::SpocRosterEntry;
use chrono::{Datelike, Days, Month, NaiveDate, Weekday};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// One 7-day (or truncated final) span of a month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekSpan {
    pub label: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Parses a full or abbreviated English month name (any case) to 1-12.
/// Unlike the lexical normalizer, an unparseable name here is an error.
pub fn month_number(name: &str) -> Result<u32> {
    name.trim()
        .parse::<Month>()
        .map(|m| m.number_from_month())
        .map_err(|_| ReconcileError::InvalidMonth(name.to_string()))
}

pub fn last_day_of_month(year: i32, month: u32) -> Result<NaiveDate> {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|d| d.checked_sub_days(Days::new(1)))
        .ok_or(ReconcileError::InvalidDate { year, month })
}

/// Partitions a month into consecutive 7-day spans starting on the 1st, the
/// final span truncated to the month's last day.
pub fn weeks_in_month(year: i32, month_name: &str) -> Result<Vec<WeekSpan>> {
    let month = month_number(month_name)?;
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or(ReconcileError::InvalidDate { year, month })?;
    let last = last_day_of_month(year, month)?;

    let mut weeks = Vec::new();
    let mut current = first;
    let mut week_num = 1;
    while current <= last {
        let week_end = (current + Days::new(6)).min(last);
        weeks.push(WeekSpan {
            label: format!("Week {week_num}"),
            start: current,
            end: week_end,
        });
        current = week_end + Days::new(1);
        week_num += 1;
    }
    Ok(weeks)
}

/// The trailing `n` spans of the month (all of them when fewer exist).
pub fn last_n_weeks(year: i32, month_name: &str, n: usize) -> Result<Vec<WeekSpan>> {
    let weeks = weeks_in_month(year, month_name)?;
    let skip = weeks.len().saturating_sub(n);
    Ok(weeks.into_iter().skip(skip).collect())
}

/// Every date in the month falling on the given weekday. `None` or "Vacant"
/// yields the empty set; an unrecognized weekday name is logged and yields
/// the empty set; an invalid month name is an error.
pub fn weekoffs(
    year: i32,
    month_name: &str,
    weekoff_day: Option<&str>,
) -> Result<BTreeSet<NaiveDate>> {
    let month = month_number(month_name)?;

    let Some(day_name) = weekoff_day.map(str::trim).filter(|d| !d.is_empty()) else {
        return Ok(BTreeSet::new());
    };
    if day_name.eq_ignore_ascii_case("vacant") {
        return Ok(BTreeSet::new());
    }
    let Ok(weekday) = day_name.parse::<Weekday>() else {
        warn!("unrecognized weekoff day '{day_name}'; treating as no weekoff");
        return Ok(BTreeSet::new());
    };

    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or(ReconcileError::InvalidDate { year, month })?;
    let last = last_day_of_month(year, month)?;

    Ok(first
        .iter_days()
        .take_while(|d| *d <= last)
        .filter(|d| d.weekday() == weekday)
        .collect())
}

/// The `n` months ending at the given month, oldest first, crossing year
/// boundaries as needed.
pub fn last_n_months(month_name: &str, year: i32, n: u32) -> Result<Vec<(String, i32)>> {
    let current = month_number(month_name)?;
    let mut months = Vec::new();
    for i in 0..n as i32 {
        let mut m = current as i32 - i;
        let mut y = year;
        while m <= 0 {
            m += 12;
            y -= 1;
        }
        let name = Month::try_from(m as u8)
            .map(|mo| mo.name().to_string())
            .map_err(|_| ReconcileError::InvalidMonth(m.to_string()))?;
        months.push((name, y));
    }
    months.reverse();
    Ok(months)
}

/// Weekoff date sets for every rostered representative with a non-vacant
/// weekoff day, keyed by SPOC name.
pub fn spoc_weekoffs(
    roster: &[SpocRosterEntry],
    year: i32,
    month_name: &str,
) -> Result<BTreeMap<String, BTreeSet<NaiveDate>>> {
    let mut out = BTreeMap::new();
    for entry in roster {
        let dates = weekoffs(year, month_name, entry.weekoff_day.as_deref())?;
        if !dates.is_empty() {
            out.insert(entry.spoc_name.clone(), dates);
        }
    }
    info!("processed weekoffs for {} SPOCs", out.len());
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_month_number() {
        assert_eq!(month_number("January").unwrap(), 1);
        assert_eq!(month_number("december").unwrap(), 12);
        assert_eq!(month_number("Feb").unwrap(), 2);
        assert!(matches!(
            month_number("Smarch"),
            Err(ReconcileError::InvalidMonth(_))
        ));
    }

    #[test]
    fn test_last_day_of_month() {
        assert_eq!(last_day_of_month(2025, 2).unwrap(), ymd(2025, 2, 28));
        assert_eq!(last_day_of_month(2024, 2).unwrap(), ymd(2024, 2, 29));
        assert_eq!(last_day_of_month(2025, 12).unwrap(), ymd(2025, 12, 31));
    }

    #[test]
    fn test_weeks_in_february_2025() {
        let weeks = weeks_in_month(2025, "February").unwrap();
        assert_eq!(weeks.len(), 4);
        assert_eq!(weeks[0].label, "Week 1");
        assert_eq!(weeks[0].start, ymd(2025, 2, 1));
        assert_eq!(weeks[0].end, ymd(2025, 2, 7));
        assert_eq!(weeks[3].end, ymd(2025, 2, 28));

        // Consecutive spans: no gaps, no overlaps.
        for pair in weeks.windows(2) {
            assert_eq!(pair[0].end + Days::new(1), pair[1].start);
        }
    }

    #[test]
    fn test_weeks_truncate_final_span() {
        let weeks = weeks_in_month(2025, "March").unwrap();
        assert_eq!(weeks.len(), 5);
        assert_eq!(weeks[4].start, ymd(2025, 3, 29));
        assert_eq!(weeks[4].end, ymd(2025, 3, 31));
    }

    #[test]
    fn test_last_n_weeks() {
        let weeks = last_n_weeks(2025, "March", 2).unwrap();
        assert_eq!(weeks.len(), 2);
        assert_eq!(weeks[0].label, "Week 4");
        assert_eq!(weeks[1].label, "Week 5");

        let all = last_n_weeks(2025, "February", 10).unwrap();
        assert_eq!(all.len(), 4);
    }

    #[test]
    fn test_weekoffs_sundays_feb_2025() {
        let dates = weekoffs(2025, "February", Some("Sunday")).unwrap();
        let expected: BTreeSet<NaiveDate> = [2, 9, 16, 23].iter().map(|d| ymd(2025, 2, *d)).collect();
        assert_eq!(dates, expected);
    }

    #[test]
    fn test_weekoffs_vacant_and_none() {
        assert!(weekoffs(2025, "February", Some("Vacant")).unwrap().is_empty());
        assert!(weekoffs(2025, "February", None).unwrap().is_empty());
        assert!(weekoffs(2025, "February", Some("Someday")).unwrap().is_empty());
    }

    #[test]
    fn test_weekoffs_invalid_month_errors() {
        assert!(weekoffs(2025, "Februember", Some("Sunday")).is_err());
    }

    #[test]
    fn test_last_n_months_crosses_year_boundary() {
        let months = last_n_months("January", 2025, 3).unwrap();
        assert_eq!(
            months,
            vec![
                ("November".to_string(), 2024),
                ("December".to_string(), 2024),
                ("January".to_string(), 2025),
            ]
        );
    }

    #[test]
    fn test_spoc_weekoffs_skips_vacant() {
        use std::collections::BTreeMap;
        let roster = vec![
            SpocRosterEntry {
                spoc_name: "Asha".to_string(),
                store_name: "Indiranagar".to_string(),
                store_state: "Karnataka".to_string(),
                zone: "South".to_string(),
                weekoff_day: Some("Sunday".to_string()),
                monthly_targets: BTreeMap::new(),
                spoc_id: None,
            },
            SpocRosterEntry {
                spoc_name: "Ravi".to_string(),
                store_name: "Adyar".to_string(),
                store_state: "Tamil Nadu".to_string(),
                zone: "South".to_string(),
                weekoff_day: Some("Vacant".to_string()),
                monthly_targets: BTreeMap::new(),
                spoc_id: None,
            },
        ];
        let map = spoc_weekoffs(&roster, 2025, "February").unwrap();
        assert_eq!(map.len(), 1);
        assert!(map.contains_key("Asha"));
    }
}
