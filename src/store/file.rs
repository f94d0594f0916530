//! JSON document store in the data directory.
//!
//! ```text
//! <data_dir>/
//!   store.json        # StoreDocument (tasks, holidays, id counters)
//!   store.json.lock   # advisory lock held for every read and write
//! ```
//!
//! Each call locks, reads the whole document, applies its change and
//! rewrites it atomically. The blocking file work runs on tokio's blocking
//! pool so controller futures stay responsive.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::NaiveDate;

use super::document::StoreDocument;
use super::{HolidayStore, TaskStore};
use crate::error::{StoreError, StoreResult};
use crate::lock::{lock_path_for, write_atomic, FileLock, DEFAULT_LOCK_TIMEOUT_MS};
use crate::task::{Holiday, HolidayId, Task, TaskId};

#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
    lock_timeout_ms: u64,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock_timeout_ms: DEFAULT_LOCK_TIMEOUT_MS,
        }
    }

    pub fn with_lock_timeout(mut self, timeout_ms: u64) -> Self {
        self.lock_timeout_ms = timeout_ms;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Snapshot of the whole document.
    pub async fn document(&self) -> StoreResult<StoreDocument> {
        self.read(|doc| Ok(doc.clone())).await
    }

    async fn read<T, F>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&StoreDocument) -> StoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let path = self.path.clone();
        let timeout_ms = self.lock_timeout_ms;
        run_blocking(move || {
            let _lock = FileLock::acquire(lock_path_for(&path), timeout_ms)?;
            let doc = load_document(&path)?;
            f(&doc)
        })
        .await
    }

    async fn mutate<T, F>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&mut StoreDocument) -> StoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let path = self.path.clone();
        let timeout_ms = self.lock_timeout_ms;
        run_blocking(move || {
            let _lock = FileLock::acquire(lock_path_for(&path), timeout_ms)?;
            let mut doc = load_document(&path)?;
            let result = f(&mut doc)?;
            let json = serde_json::to_vec_pretty(&doc)?;
            write_atomic(&path, &json)?;
            Ok(result)
        })
        .await
    }
}

async fn run_blocking<T, F>(work: F) -> StoreResult<T>
where
    F: FnOnce() -> StoreResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|err| StoreError::Unavailable(format!("store worker failed: {err}")))?
}

/// Read the document; a missing file is an empty store.
fn load_document(path: &Path) -> StoreResult<StoreDocument> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(StoreDocument::default()),
        Err(err) => return Err(err.into()),
    };
    if content.trim().is_empty() {
        return Ok(StoreDocument::default());
    }
    let doc: StoreDocument = serde_json::from_str(&content)?;
    doc.check_schema()?;
    Ok(doc)
}

#[async_trait]
impl TaskStore for FileStore {
    async fn insert(&self, task: &Task) -> StoreResult<TaskId> {
        let task = task.clone();
        let id = self.mutate(move |doc| doc.insert_task(&task)).await?;
        tracing::debug!(task_id = %id, "task inserted");
        Ok(id)
    }

    async fn update(&self, task: &Task) -> StoreResult<()> {
        let task = task.clone();
        self.mutate(move |doc| doc.update_task(&task)).await
    }

    async fn delete(&self, id: TaskId) -> StoreResult<()> {
        let removed = self.mutate(move |doc| Ok(doc.delete_task(id))).await?;
        if !removed {
            tracing::debug!(task_id = %id, "delete of absent task ignored");
        }
        Ok(())
    }

    async fn query_by_date(&self, date: NaiveDate) -> StoreResult<Vec<Task>> {
        self.read(move |doc| Ok(doc.tasks_where(|day| day == date)))
            .await
    }

    async fn query_range(&self, start: NaiveDate, end: NaiveDate) -> StoreResult<Vec<Task>> {
        self.read(move |doc| Ok(doc.tasks_where(|day| start <= day && day <= end)))
            .await
    }

    async fn query_all(&self) -> StoreResult<Vec<Task>> {
        self.read(|doc| Ok(doc.tasks_where(|_| true))).await
    }

    async fn count_for_date(&self, date: NaiveDate) -> StoreResult<usize> {
        self.read(move |doc| Ok(doc.count_for_date(date))).await
    }
}

#[async_trait]
impl HolidayStore for FileStore {
    async fn holidays(&self) -> StoreResult<Vec<Holiday>> {
        self.read(|doc| Ok(doc.holidays_where(|_| true))).await
    }

    async fn holidays_for_date(&self, date: NaiveDate) -> StoreResult<Vec<Holiday>> {
        self.read(move |doc| Ok(doc.holidays_where(|day| day == date)))
            .await
    }

    async fn insert_holiday(&self, holiday: &Holiday) -> StoreResult<HolidayId> {
        let holiday = holiday.clone();
        self.mutate(move |doc| Ok(doc.upsert_holiday(&holiday)))
            .await
    }

    async fn delete_holiday(&self, id: HolidayId) -> StoreResult<()> {
        self.mutate(move |doc| Ok(doc.delete_holiday(id)))
            .await
            .map(|_| ())
    }
}
