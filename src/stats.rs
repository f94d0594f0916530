//! Completion statistics over a task list.
//!
//! Rates are percentages in `0.0..=100.0`; an empty period has rate 0.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::calendar::{shift_month, year_month};
use crate::task::Task;

pub const MONTHS_SHOWN: i32 = 6;
pub const YEARS_SHOWN: i32 = 5;

const MONTH_ABBREVIATIONS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodCompletion {
    pub label: String,
    pub total: usize,
    pub completed: usize,
    pub rate: f32,
}

impl PeriodCompletion {
    fn from_tasks<'a>(label: String, tasks: impl Iterator<Item = &'a Task>) -> Self {
        let (total, completed) = tasks.fold((0, 0), |(total, done), task| {
            (total + 1, done + usize::from(task.completed))
        });
        Self {
            label,
            total,
            completed,
            rate: rate(completed, total),
        }
    }
}

fn rate(completed: usize, total: usize) -> f32 {
    if total == 0 {
        0.0
    } else {
        completed as f32 / total as f32 * 100.0
    }
}

pub fn completion_rate(tasks: &[Task]) -> f32 {
    let completed = tasks.iter().filter(|task| task.completed).count();
    rate(completed, tasks.len())
}

pub fn month_label(month: u32) -> &'static str {
    MONTH_ABBREVIATIONS
        .get(month.saturating_sub(1) as usize)
        .copied()
        .unwrap_or("")
}

/// Tasks due in the same month as `date`.
pub fn in_month<'a>(tasks: &'a [Task], date: NaiveDate) -> impl Iterator<Item = &'a Task> {
    let target = year_month(date);
    tasks
        .iter()
        .filter(move |task| year_month(task.scope_date()) == target)
}

/// The last six months up to and including `today`'s month, oldest first.
pub fn monthly_completion(tasks: &[Task], today: NaiveDate) -> Vec<PeriodCompletion> {
    (0..MONTHS_SHOWN)
        .rev()
        .map(|back| {
            let month = shift_month(today, -back);
            let label = format!("{} {}", month_label(month.month()), month.year());
            PeriodCompletion::from_tasks(label, in_month(tasks, month))
        })
        .collect()
}

/// The last five years up to and including `today`'s year, oldest first.
pub fn yearly_completion(tasks: &[Task], today: NaiveDate) -> Vec<PeriodCompletion> {
    (0..YEARS_SHOWN)
        .rev()
        .map(|back| {
            let year = today.year() - back;
            PeriodCompletion::from_tasks(
                year.to_string(),
                tasks.iter().filter(|task| task.scope_date().year() == year),
            )
        })
        .collect()
}

/// Share of completed tasks per category, in percent.
///
/// Empty when no task is completed.
pub fn category_breakdown(tasks: &[Task]) -> BTreeMap<String, f32> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for task in tasks.iter().filter(|task| task.completed) {
        *counts.entry(task.category.clone()).or_insert(0) += 1;
    }
    let completed: usize = counts.values().sum();
    counts
        .into_iter()
        .map(|(category, count)| (category, rate(count, completed)))
        .collect()
}

/// Days in a row, ending today, with at least one completed task.
///
/// The most recent completed day must be today; a completed day after
/// today also ends the streak at zero.
pub fn consecutive_days(tasks: &[Task], today: NaiveDate) -> usize {
    let days: BTreeSet<NaiveDate> = tasks
        .iter()
        .filter(|task| task.completed)
        .map(Task::scope_date)
        .collect();

    let mut streak = 0;
    let mut expected = today;
    for day in days.iter().rev() {
        if *day != expected {
            break;
        }
        streak += 1;
        match expected.pred_opt() {
            Some(previous) => expected = previous,
            None => break,
        }
    }
    streak
}

#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub total: usize,
    pub completed: usize,
    pub rate: f32,
    pub streak: usize,
    pub periods: Vec<PeriodCompletion>,
    pub categories: BTreeMap<String, f32>,
}

pub fn summarize(tasks: &[Task], today: NaiveDate, yearly: bool) -> Summary {
    let completed = tasks.iter().filter(|task| task.completed).count();
    Summary {
        total: tasks.len(),
        completed,
        rate: rate(completed, tasks.len()),
        streak: consecutive_days(tasks, today),
        periods: if yearly {
            yearly_completion(tasks, today)
        } else {
            monthly_completion(tasks, today)
        },
        categories: category_breakdown(tasks),
    }
}
