#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use assert_cmd::Command;
use async_trait::async_trait;
use chrono::NaiveDate;
use daybook::error::{StoreError, StoreResult};
use daybook::store::{MemoryStore, TaskStore};
use daybook::task::{Task, TaskId};
use serde_json::Value;
use tempfile::TempDir;

/// Throwaway data directory for CLI tests.
pub struct TestDir {
    dir: TempDir,
}

impl TestDir {
    pub fn new() -> std::io::Result<Self> {
        Ok(Self {
            dir: tempfile::tempdir()?,
        })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn write_file(&self, rel_path: &str, contents: &str) -> std::io::Result<PathBuf> {
        let path = self.dir.path().join(rel_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, contents)?;
        Ok(path)
    }

    pub fn write_config(&self, contents: &str) -> std::io::Result<PathBuf> {
        self.write_file(".daybook.toml", contents)
    }

    pub fn store_path(&self) -> PathBuf {
        self.dir.path().join("store.json")
    }

    /// Every JSONL line of an events file.
    pub fn read_events(&self, rel_path: &str) -> Result<Vec<Value>, Box<dyn std::error::Error>> {
        let contents = fs::read_to_string(self.dir.path().join(rel_path))?;
        let mut events = Vec::new();
        for line in contents.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            events.push(serde_json::from_str(trimmed)?);
        }
        Ok(events)
    }
}

/// `daybook` binary pointed at the test directory, with logging off.
pub fn daybook_cmd(dir: &TestDir) -> Command {
    let mut cmd = Command::cargo_bin("daybook").expect("binary");
    cmd.env("DAYBOOK_DIR", dir.path());
    cmd.env_remove("RUST_LOG");
    cmd
}

/// Parse the JSON envelope printed by a `--json` command.
pub fn json_output(stdout: &[u8]) -> Result<Value, Box<dyn std::error::Error>> {
    Ok(serde_json::from_slice(stdout)?)
}

pub fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

const NEVER: usize = usize::MAX;

/// Task store that fails on demand, wrapping a [`MemoryStore`].
pub struct FlakyStore {
    inner: MemoryStore,
    fail_writes: AtomicBool,
    fail_queries: AtomicBool,
    fail_update_at: AtomicUsize,
    update_calls: AtomicUsize,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self {
            inner: MemoryStore::new(),
            fail_writes: AtomicBool::new(false),
            fail_queries: AtomicBool::new(false),
            fail_update_at: AtomicUsize::new(NEVER),
            update_calls: AtomicUsize::new(0),
        }
    }

    pub fn inner(&self) -> &MemoryStore {
        &self.inner
    }

    /// Make every insert, update and delete fail.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Make every query fail.
    pub fn fail_queries(&self, fail: bool) {
        self.fail_queries.store(fail, Ordering::SeqCst);
    }

    /// Fail only the `n`th update from now (zero-based).
    pub fn fail_update_at(&self, n: usize) {
        self.update_calls.store(0, Ordering::SeqCst);
        self.fail_update_at.store(n, Ordering::SeqCst);
    }

    /// Updates attempted since the last `fail_update_at` call.
    pub fn update_calls(&self) -> usize {
        self.update_calls.load(Ordering::SeqCst)
    }

    fn check_write(&self) -> StoreResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("injected write failure".to_string()));
        }
        Ok(())
    }

    fn check_query(&self) -> StoreResult<()> {
        if self.fail_queries.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("injected query failure".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl TaskStore for FlakyStore {
    async fn insert(&self, task: &Task) -> StoreResult<TaskId> {
        self.check_write()?;
        self.inner.insert(task).await
    }

    async fn update(&self, task: &Task) -> StoreResult<()> {
        let call = self.update_calls.fetch_add(1, Ordering::SeqCst);
        self.check_write()?;
        if call == self.fail_update_at.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(format!("injected failure on update {call}")));
        }
        self.inner.update(task).await
    }

    async fn delete(&self, id: TaskId) -> StoreResult<()> {
        self.check_write()?;
        self.inner.delete(id).await
    }

    async fn query_by_date(&self, date: NaiveDate) -> StoreResult<Vec<Task>> {
        self.check_query()?;
        self.inner.query_by_date(date).await
    }

    async fn query_range(&self, start: NaiveDate, end: NaiveDate) -> StoreResult<Vec<Task>> {
        self.check_query()?;
        self.inner.query_range(start, end).await
    }

    async fn query_all(&self) -> StoreResult<Vec<Task>> {
        self.check_query()?;
        self.inner.query_all().await
    }
}
