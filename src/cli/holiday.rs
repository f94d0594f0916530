//! daybook holiday and month command implementations.

use chrono::NaiveDate;
use serde::Serialize;

use crate::calendar::{self, DayCell};
use crate::cli::{parse_date, today, Context, HolidayCommands};
use crate::error::{Error, Result, StoreError};
use crate::events::EventKind;
use crate::output::{emit_success, HumanOutput};
use crate::store::{HolidayStore, TaskStore};
use crate::task::{Holiday, HolidayId};

#[derive(Serialize)]
struct HolidayOutput {
    holiday: Holiday,
}

#[derive(Serialize)]
struct HolidayListOutput {
    total: usize,
    holidays: Vec<Holiday>,
}

#[derive(Serialize)]
struct HolidayRemovedOutput {
    id: HolidayId,
}

#[derive(Serialize)]
struct MonthOutput {
    year: i32,
    month: u32,
    total: usize,
    completed: usize,
    days: Vec<DayCell>,
}

pub(crate) async fn run(ctx: &mut Context, command: HolidayCommands) -> Result<()> {
    match command {
        HolidayCommands::Add { name, date } => run_add(ctx, &name, &date).await,
        HolidayCommands::List { month } => run_list(ctx, month.as_deref()).await,
        HolidayCommands::Rm { id } => run_rm(ctx, &id).await,
    }
}

async fn run_add(ctx: &mut Context, name: &str, date: &str) -> Result<()> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::InvalidArgument("holiday name cannot be empty".to_string()));
    }
    let date = parse_date("date", date)?;
    let store = ctx.store();

    let mut holiday = Holiday::custom(name, date);
    let id = store.insert_holiday(&holiday).await?;
    holiday.id = Some(id);
    tracing::info!(holiday_id = %id, %date, "holiday added");

    let mut human = HumanOutput::new("Holiday added");
    if let Some(warning) = ctx.emit(EventKind::HolidayAdded, &holiday) {
        human.push_warning(warning);
    }
    human.push_summary("ID", id.to_string());
    human.push_summary("Name", holiday.name.clone());
    human.push_summary("Date", date.to_string());
    human.push_next_step(format!("daybook month --month {}", date.format("%Y-%m")));

    emit_success(ctx.output(), "holiday add", &HolidayOutput { holiday }, Some(&human))
}

async fn run_list(ctx: &mut Context, month: Option<&str>) -> Result<()> {
    let bounds = month
        .map(|raw| {
            let (year, month) = calendar::parse_month(raw)?;
            calendar::month_bounds(year, month)
        })
        .transpose()?;

    let mut holidays = ctx.store().holidays().await?;
    if let Some((first, last)) = bounds {
        holidays.retain(|holiday| first <= holiday.date && holiday.date <= last);
    }

    let mut human = HumanOutput::new("Holidays");
    human.push_summary("Total", holidays.len().to_string());
    for holiday in &holidays {
        let id = holiday.id.map(|id| id.to_string()).unwrap_or_default();
        human.push_detail(format!("#{id} {} {}", holiday.date, holiday.name));
    }

    let output = HolidayListOutput {
        total: holidays.len(),
        holidays,
    };
    emit_success(ctx.output(), "holiday list", &output, Some(&human))
}

async fn run_rm(ctx: &mut Context, id: &str) -> Result<()> {
    let id: HolidayId = id.parse()?;
    let store = ctx.store();
    let holiday = store
        .holidays()
        .await?
        .into_iter()
        .find(|holiday| holiday.id == Some(id))
        .ok_or(Error::Store(StoreError::HolidayNotFound(id)))?;
    store.delete_holiday(id).await?;

    let mut human = HumanOutput::new("Holiday removed");
    if let Some(warning) = ctx.emit(EventKind::HolidayRemoved, &holiday) {
        human.push_warning(warning);
    }
    human.push_summary("ID", id.to_string());
    human.push_summary("Name", holiday.name);
    human.push_summary("Date", holiday.date.to_string());

    emit_success(ctx.output(), "holiday rm", &HolidayRemovedOutput { id }, Some(&human))
}

pub(crate) async fn run_month(ctx: &mut Context, month: Option<String>) -> Result<()> {
    let (year, month) = match month.as_deref() {
        Some(raw) => calendar::parse_month(raw)?,
        None => calendar::year_month(today()),
    };
    let (first, last) = calendar::month_bounds(year, month)?;

    let store = ctx.store();
    let tasks = store.query_range(first, last).await?;
    let holidays: Vec<Holiday> = store
        .holidays()
        .await?
        .into_iter()
        .filter(|holiday| first <= holiday.date && holiday.date <= last)
        .collect();
    let days = calendar::month_overview(year, month, &tasks, &holidays)?;

    let completed: usize = days.iter().map(|cell| cell.completed).sum();
    let mut human = HumanOutput::new(format!("{} {year}", crate::stats::month_label(month)));
    human.push_summary("Tasks", tasks.len().to_string());
    human.push_summary("Completed", completed.to_string());
    for cell in days.iter().filter(|cell| cell.total > 0 || !cell.holidays.is_empty()) {
        human.push_detail(format_day(cell));
    }

    let output = MonthOutput {
        year,
        month,
        total: tasks.len(),
        completed,
        days,
    };
    emit_success(ctx.output(), "month", &output, Some(&human))
}

fn format_day(cell: &DayCell) -> String {
    let mut line = format!("{} {}", weekday_date(cell.date), progress(cell));
    if !cell.holidays.is_empty() {
        line.push_str(&format!(" [{}]", cell.holidays.join(", ")));
    }
    line
}

fn weekday_date(date: NaiveDate) -> String {
    date.format("%a %d").to_string()
}

fn progress(cell: &DayCell) -> String {
    if cell.total == 0 {
        "-".to_string()
    } else {
        format!("{}/{} done", cell.completed, cell.total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_line_lists_holidays() {
        let cell = DayCell {
            date: NaiveDate::from_ymd_opt(2024, 12, 25).unwrap(),
            total: 2,
            completed: 1,
            holidays: vec!["Christmas".to_string()],
        };
        assert_eq!(format_day(&cell), "Wed 25 1/2 done [Christmas]");

        let empty = DayCell {
            holidays: Vec::new(),
            total: 0,
            completed: 0,
            ..cell
        };
        assert_eq!(format_day(&empty), "Wed 25 -");
    }
}
