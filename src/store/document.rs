//! In-memory form of the persisted store, shared by both backends.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{sort_for_display, sort_holidays};
use crate::error::{StoreError, StoreResult};
use crate::task::{Holiday, HolidayId, Task, TaskId};

pub const STORE_SCHEMA_VERSION: &str = "daybook.store.v1";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreDocument {
    pub schema_version: String,
    pub next_task_id: i64,
    pub next_holiday_id: i64,
    #[serde(default)]
    pub tasks: BTreeMap<TaskId, Task>,
    #[serde(default)]
    pub holidays: BTreeMap<HolidayId, Holiday>,
}

impl Default for StoreDocument {
    fn default() -> Self {
        Self {
            schema_version: STORE_SCHEMA_VERSION.to_string(),
            next_task_id: 1,
            next_holiday_id: 1,
            tasks: BTreeMap::new(),
            holidays: BTreeMap::new(),
        }
    }
}

impl StoreDocument {
    pub fn check_schema(&self) -> StoreResult<()> {
        if self.schema_version != STORE_SCHEMA_VERSION {
            return Err(StoreError::Schema {
                expected: STORE_SCHEMA_VERSION.to_string(),
                found: self.schema_version.clone(),
            });
        }
        Ok(())
    }

    pub fn insert_task(&mut self, task: &Task) -> StoreResult<TaskId> {
        if let Some(id) = task.id {
            return Err(StoreError::AlreadyPersisted(id));
        }
        let id = TaskId(self.next_task_id);
        self.next_task_id += 1;
        let mut stored = task.clone();
        stored.id = Some(id);
        self.tasks.insert(id, stored);
        Ok(id)
    }

    pub fn update_task(&mut self, task: &Task) -> StoreResult<()> {
        let id = task.id.ok_or(StoreError::MissingId)?;
        let slot = self.tasks.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        *slot = task.clone();
        Ok(())
    }

    pub fn delete_task(&mut self, id: TaskId) -> bool {
        self.tasks.remove(&id).is_some()
    }

    pub fn tasks_where(&self, keep: impl Fn(NaiveDate) -> bool) -> Vec<Task> {
        let mut tasks: Vec<Task> = self
            .tasks
            .values()
            .filter(|task| keep(task.scope_date()))
            .cloned()
            .collect();
        sort_for_display(&mut tasks);
        tasks
    }

    pub fn count_for_date(&self, date: NaiveDate) -> usize {
        self.tasks
            .values()
            .filter(|task| task.scope_date() == date)
            .count()
    }

    pub fn holidays_where(&self, keep: impl Fn(NaiveDate) -> bool) -> Vec<Holiday> {
        let mut holidays: Vec<Holiday> = self
            .holidays
            .values()
            .filter(|holiday| keep(holiday.date))
            .cloned()
            .collect();
        sort_holidays(&mut holidays);
        holidays
    }

    pub fn upsert_holiday(&mut self, holiday: &Holiday) -> HolidayId {
        let id = match holiday.id {
            Some(id) => {
                self.next_holiday_id = self.next_holiday_id.max(id.0 + 1);
                id
            }
            None => {
                let id = HolidayId(self.next_holiday_id);
                self.next_holiday_id += 1;
                id
            }
        };
        let mut stored = holiday.clone();
        stored.id = Some(id);
        self.holidays.insert(id, stored);
        id
    }

    pub fn delete_holiday(&mut self, id: HolidayId) -> bool {
        self.holidays.remove(&id).is_some()
    }
}
