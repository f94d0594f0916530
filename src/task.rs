//! Task and holiday records.
//!
//! A task belongs to the calendar day of its due date. That day is the scope
//! in which its `order` is meaningful; order values of different days are not
//! comparable.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const DEFAULT_CATEGORY: &str = "General";
pub const STOCK_CATEGORIES: [&str; 5] = ["General", "Work", "Personal", "Health", "Education"];

/// Store-assigned task identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub i64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TaskId {
    type Err = Error;

    fn from_str(raw: &str) -> Result<Self> {
        raw.trim()
            .parse::<i64>()
            .ok()
            .filter(|id| *id > 0)
            .map(TaskId)
            .ok_or_else(|| Error::InvalidArgument(format!("invalid task id '{raw}'")))
    }
}

/// Store-assigned holiday identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HolidayId(pub i64);

impl fmt::Display for HolidayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for HolidayId {
    type Err = Error;

    fn from_str(raw: &str) -> Result<Self> {
        raw.trim()
            .parse::<i64>()
            .ok()
            .filter(|id| *id > 0)
            .map(HolidayId)
            .ok_or_else(|| Error::InvalidArgument(format!("invalid holiday id '{raw}'")))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = Error;

    fn from_str(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            _ => Err(Error::InvalidArgument(format!(
                "invalid priority '{raw}' (expected low|medium|high)"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<TaskId>,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default = "default_category")]
    pub category: String,
    pub due: NaiveDateTime,
    #[serde(default)]
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub order: u32,
}

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

impl Task {
    /// The day this task is scheduled on; tasks sharing it share an order scope.
    pub fn scope_date(&self) -> NaiveDate {
        self.due.date()
    }

    /// Date-only tasks carry a midnight due time.
    pub fn is_all_day(&self) -> bool {
        self.due.time() == NaiveTime::MIN
    }

    /// Identifier of a persisted task, or `Validation` for a draft.
    pub fn require_id(&self) -> Result<TaskId> {
        self.id.ok_or_else(|| {
            Error::Validation(format!("task '{}' has not been persisted", self.title))
        })
    }

    pub fn with_order(mut self, order: u32) -> Self {
        self.order = order;
        self
    }
}

/// Request to create a task. The store assigns the id, the controller the order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTask {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default = "default_category")]
    pub category: String,
    pub due: NaiveDateTime,
}

impl NewTask {
    pub fn new(title: impl Into<String>, due: NaiveDateTime) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            priority: Priority::default(),
            category: default_category(),
            due,
        }
    }

    /// All-day task on `date`.
    pub fn on_day(title: impl Into<String>, date: NaiveDate) -> Self {
        Self::new(title, date.and_time(NaiveTime::MIN))
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn validate(&self) -> Result<()> {
        validate_title(&self.title)?;
        if self.category.trim().is_empty() {
            return Err(Error::Validation("category cannot be empty".to_string()));
        }
        Ok(())
    }

    /// Draft task with the given order, not yet persisted.
    pub fn into_task(self, order: u32, created_at: DateTime<Utc>) -> Task {
        Task {
            id: None,
            title: self.title.trim().to_string(),
            description: self.description,
            priority: self.priority,
            category: self.category.trim().to_string(),
            due: self.due,
            completed: false,
            created_at,
            order,
        }
    }
}

pub fn validate_title(title: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(Error::Validation("title cannot be empty".to_string()));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holiday {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<HolidayId>,
    pub name: String,
    pub date: NaiveDate,
    /// User-defined, as opposed to a built-in holiday.
    #[serde(default)]
    pub custom: bool,
}

impl Holiday {
    pub fn custom(name: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            id: None,
            name: name.into(),
            date,
            custom: true,
        }
    }
}

/// Range of days a task list covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    Day(NaiveDate),
    Range { start: NaiveDate, end: NaiveDate },
    All,
}

impl Scope {
    pub fn contains(&self, date: NaiveDate) -> bool {
        match self {
            Scope::Day(day) => *day == date,
            Scope::Range { start, end } => *start <= date && date <= *end,
            Scope::All => true,
        }
    }

    pub fn range(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if end < start {
            return Err(Error::InvalidArgument(format!(
                "range end {end} is before start {start}"
            )));
        }
        Ok(Scope::Range { start, end })
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Day(day) => write!(f, "{day}"),
            Scope::Range { start, end } => write!(f, "{start}..={end}"),
            Scope::All => f.write_str("all"),
        }
    }
}

/// Sort key used by stores and controllers: day, then order, then id.
pub fn display_key(task: &Task) -> (NaiveDate, u32, Option<TaskId>) {
    (task.scope_date(), task.order, task.id)
}
