use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::Mutex;

use super::document::StoreDocument;
use super::{HolidayStore, TaskStore};
use crate::error::StoreResult;
use crate::task::{Holiday, HolidayId, Task, TaskId};

/// Process-local store. Clones share the same records.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<StoreDocument>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TaskStore for MemoryStore {
    async fn insert(&self, task: &Task) -> StoreResult<TaskId> {
        self.inner.lock().await.insert_task(task)
    }

    async fn update(&self, task: &Task) -> StoreResult<()> {
        self.inner.lock().await.update_task(task)
    }

    async fn delete(&self, id: TaskId) -> StoreResult<()> {
        self.inner.lock().await.delete_task(id);
        Ok(())
    }

    async fn query_by_date(&self, date: NaiveDate) -> StoreResult<Vec<Task>> {
        Ok(self.inner.lock().await.tasks_where(|day| day == date))
    }

    async fn query_range(&self, start: NaiveDate, end: NaiveDate) -> StoreResult<Vec<Task>> {
        Ok(self
            .inner
            .lock()
            .await
            .tasks_where(|day| start <= day && day <= end))
    }

    async fn query_all(&self) -> StoreResult<Vec<Task>> {
        Ok(self.inner.lock().await.tasks_where(|_| true))
    }

    async fn count_for_date(&self, date: NaiveDate) -> StoreResult<usize> {
        Ok(self.inner.lock().await.count_for_date(date))
    }
}

#[async_trait]
impl HolidayStore for MemoryStore {
    async fn holidays(&self) -> StoreResult<Vec<Holiday>> {
        Ok(self.inner.lock().await.holidays_where(|_| true))
    }

    async fn holidays_for_date(&self, date: NaiveDate) -> StoreResult<Vec<Holiday>> {
        Ok(self.inner.lock().await.holidays_where(|day| day == date))
    }

    async fn insert_holiday(&self, holiday: &Holiday) -> StoreResult<HolidayId> {
        Ok(self.inner.lock().await.upsert_holiday(holiday))
    }

    async fn delete_holiday(&self, id: HolidayId) -> StoreResult<()> {
        self.inner.lock().await.delete_holiday(id);
        Ok(())
    }
}
