//! Persistence contract for tasks and holidays.
//!
//! The controller only talks to these traits. Two implementations ship:
//!
//! - [`MemoryStore`]: process-local, for tests and embedding
//! - [`FileStore`]: one locked JSON document in the data directory
//!
//! Contract details every implementation follows:
//!
//! - `insert` assigns a fresh id and refuses tasks that already have one
//! - `update` replaces the whole record; unknown ids are `NotFound`
//! - `delete` of an absent id succeeds (no-op)
//! - day queries return tasks sorted by `(order, id)`; wider queries by
//!   `(day, order, id)`

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::StoreResult;
use crate::task::{display_key, Holiday, HolidayId, Scope, Task, TaskId};

mod document;
mod file;
mod memory;

pub use document::{StoreDocument, STORE_SCHEMA_VERSION};
pub use file::FileStore;
pub use memory::MemoryStore;

#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Persist a new task and return its assigned id.
    async fn insert(&self, task: &Task) -> StoreResult<TaskId>;

    /// Replace the record with the task's id.
    async fn update(&self, task: &Task) -> StoreResult<()>;

    /// Remove a task; absent ids are ignored.
    async fn delete(&self, id: TaskId) -> StoreResult<()>;

    async fn query_by_date(&self, date: NaiveDate) -> StoreResult<Vec<Task>>;

    /// Tasks due between `start` and `end`, both inclusive.
    async fn query_range(&self, start: NaiveDate, end: NaiveDate) -> StoreResult<Vec<Task>>;

    async fn query_all(&self) -> StoreResult<Vec<Task>>;

    async fn count_for_date(&self, date: NaiveDate) -> StoreResult<usize> {
        Ok(self.query_by_date(date).await?.len())
    }

    /// Dispatch a scope to the matching query.
    async fn query_scope(&self, scope: Scope) -> StoreResult<Vec<Task>> {
        match scope {
            Scope::Day(date) => self.query_by_date(date).await,
            Scope::Range { start, end } => self.query_range(start, end).await,
            Scope::All => self.query_all().await,
        }
    }
}

#[async_trait]
pub trait HolidayStore: Send + Sync {
    async fn holidays(&self) -> StoreResult<Vec<Holiday>>;

    async fn holidays_for_date(&self, date: NaiveDate) -> StoreResult<Vec<Holiday>>;

    /// Insert, or replace when the holiday carries an existing id.
    async fn insert_holiday(&self, holiday: &Holiday) -> StoreResult<HolidayId>;

    /// Remove a holiday; absent ids are ignored.
    async fn delete_holiday(&self, id: HolidayId) -> StoreResult<()>;
}

pub(crate) fn sort_for_display(tasks: &mut [Task]) {
    tasks.sort_by_key(display_key);
}

pub(crate) fn sort_holidays(holidays: &mut [Holiday]) {
    holidays.sort_by(|left, right| left.date.cmp(&right.date).then(left.id.cmp(&right.id)));
}
