//! Month view helpers: day comparisons, month navigation and per-day cells.

use chrono::{Datelike, Months, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;

use crate::error::{Error, Result};
use crate::task::{Holiday, Task};

/// Calendar-day equality, ignoring the time of day.
pub fn same_day(left: NaiveDateTime, right: NaiveDateTime) -> bool {
    left.date() == right.date()
}

/// Move `date` by whole months, clamping the day to the target month.
pub fn shift_month(date: NaiveDate, delta: i32) -> NaiveDate {
    let months = Months::new(delta.unsigned_abs());
    let shifted = if delta >= 0 {
        date.checked_add_months(months)
    } else {
        date.checked_sub_months(months)
    };
    shifted.unwrap_or(date)
}

/// First and last day of a month.
pub fn month_bounds(year: i32, month: u32) -> Result<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| Error::InvalidArgument(format!("invalid month {year}-{month:02}")))?;
    let last = shift_month(first, 1)
        .pred_opt()
        .ok_or_else(|| Error::InvalidArgument(format!("invalid month {year}-{month:02}")))?;
    Ok((first, last))
}

/// Parse `YYYY-MM`.
pub fn parse_month(raw: &str) -> Result<(i32, u32)> {
    let invalid = || Error::InvalidArgument(format!("invalid month '{raw}' (expected YYYY-MM)"));
    let (year, month) = raw.trim().split_once('-').ok_or_else(invalid)?;
    let year: i32 = year.parse().map_err(|_| invalid())?;
    let month: u32 = month.parse().map_err(|_| invalid())?;
    if !(1..=12).contains(&month) {
        return Err(invalid());
    }
    Ok((year, month))
}

pub fn is_holiday(date: NaiveDate, holidays: &[Holiday]) -> bool {
    holidays.iter().any(|holiday| holiday.date == date)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayCell {
    pub date: NaiveDate,
    pub total: usize,
    pub completed: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub holidays: Vec<String>,
}

/// One cell per day of the month with task counts and holiday names.
pub fn month_overview(
    year: i32,
    month: u32,
    tasks: &[Task],
    holidays: &[Holiday],
) -> Result<Vec<DayCell>> {
    let (first, last) = month_bounds(year, month)?;
    let cells = first
        .iter_days()
        .take_while(|date| *date <= last)
        .map(|date| {
            let midnight = date.and_time(NaiveTime::MIN);
            let day_tasks = tasks.iter().filter(|task| same_day(task.due, midnight));
            let (total, completed) = day_tasks.fold((0, 0), |(total, done), task| {
                (total + 1, done + usize::from(task.completed))
            });
            DayCell {
                date,
                total,
                completed,
                holidays: holidays
                    .iter()
                    .filter(|holiday| holiday.date == date)
                    .map(|holiday| holiday.name.clone())
                    .collect(),
            }
        })
        .collect();
    Ok(cells)
}

/// Year and month of a date, for labels.
pub fn year_month(date: NaiveDate) -> (i32, u32) {
    (date.year(), date.month())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::NewTask;
    use chrono::Utc;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn same_day_ignores_time() {
        let morning = day(2024, 4, 2).and_hms_opt(8, 0, 0).unwrap();
        let night = day(2024, 4, 2).and_hms_opt(23, 59, 59).unwrap();
        let next = day(2024, 4, 3).and_hms_opt(0, 0, 0).unwrap();
        assert!(same_day(morning, night));
        assert!(!same_day(night, next));
    }

    #[test]
    fn shift_month_clamps_day() {
        assert_eq!(shift_month(day(2024, 1, 31), 1), day(2024, 2, 29));
        assert_eq!(shift_month(day(2024, 3, 31), -1), day(2024, 2, 29));
        assert_eq!(shift_month(day(2024, 12, 15), 1), day(2025, 1, 15));
    }

    #[test]
    fn month_bounds_handles_leap_years() {
        assert_eq!(month_bounds(2023, 2).unwrap(), (day(2023, 2, 1), day(2023, 2, 28)));
        assert_eq!(month_bounds(2024, 2).unwrap().1, day(2024, 2, 29));
        assert!(month_bounds(2024, 13).is_err());
    }

    #[test]
    fn parse_month_accepts_year_month() {
        assert_eq!(parse_month("2024-07").unwrap(), (2024, 7));
        assert!(parse_month("2024-00").is_err());
        assert!(parse_month("July").is_err());
    }

    #[test]
    fn overview_counts_and_marks_holidays() {
        let mut done = NewTask::on_day("done", day(2024, 4, 2)).into_task(0, Utc::now());
        done.completed = true;
        let open = NewTask::on_day("open", day(2024, 4, 2)).into_task(1, Utc::now());
        let holidays = vec![Holiday::custom("Spring break", day(2024, 4, 3))];

        let cells = month_overview(2024, 4, &[done, open], &holidays).unwrap();
        assert_eq!(cells.len(), 30);
        assert_eq!((cells[1].total, cells[1].completed), (2, 1));
        assert_eq!(cells[2].holidays, vec!["Spring break".to_string()]);
        assert!(is_holiday(day(2024, 4, 3), &holidays));
        assert!(!is_holiday(day(2024, 4, 4), &holidays));
    }
}
