//! Task list controller: optimistic in-memory list over a [`TaskStore`].
//!
//! Every mutation walks the same small state machine:
//!
//! ```text
//! Requested -> AppliedLocally -> PersistedConfirmed
//!                             -> PersistenceFailed -> Reconciled
//! ```
//!
//! The in-memory list changes before the store is called, so subscribers see
//! the new state immediately. When the store rejects a write the controller
//! throws away its list and reloads the scope from the store. If that reload
//! fails too the outcome stays `PersistenceFailed`, the controller is marked
//! stale, and the next [`TaskListController::load`] reconciles.
//!
//! Store errors never surface as `Err`; they are reported in the returned
//! [`MutationOutcome`]. Only rejected requests (blank title, bad indices,
//! unpersisted tasks) are errors, and those are raised before anything is
//! applied.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use tokio::sync::watch;

use crate::error::{Error, Result, StoreError};
use crate::reorder;
use crate::store::TaskStore;
use crate::task::{NewTask, Scope, Task, TaskId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationState {
    Requested,
    AppliedLocally,
    PersistedConfirmed,
    PersistenceFailed,
    Reconciled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationKind {
    Add,
    Update,
    Delete,
    Reorder,
}

#[derive(Debug, Clone, Serialize)]
pub struct MutationOutcome {
    pub kind: MutationKind,
    pub state: MutationState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_id: Option<TaskId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl MutationOutcome {
    fn new(kind: MutationKind, task_id: Option<TaskId>) -> Self {
        Self {
            kind,
            state: MutationState::Requested,
            task_id,
            error: None,
        }
    }

    fn advance(&mut self, state: MutationState) {
        tracing::debug!(kind = ?self.kind, task_id = ?self.task_id, from = ?self.state, to = ?state, "mutation state");
        self.state = state;
    }

    pub fn is_persisted(&self) -> bool {
        self.state == MutationState::PersistedConfirmed
    }
}

pub struct TaskListController<S: TaskStore + ?Sized> {
    store: Arc<S>,
    scope: Scope,
    tasks: Vec<Task>,
    stale: bool,
    updates: watch::Sender<Vec<Task>>,
}

impl<S: TaskStore + ?Sized> TaskListController<S> {
    /// Empty controller for `scope`; call [`Self::load`] to populate it.
    pub fn new(store: Arc<S>, scope: Scope) -> Self {
        let (updates, _) = watch::channel(Vec::new());
        Self {
            store,
            scope,
            tasks: Vec::new(),
            stale: true,
            updates,
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    /// The current in-memory list, optimistic changes included.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// True after a reconciliation reload failed.
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    /// Receiver that observes every change of the in-memory list.
    pub fn subscribe(&self) -> watch::Receiver<Vec<Task>> {
        self.updates.subscribe()
    }

    pub fn tasks_for_date(&self, date: NaiveDate) -> Vec<Task> {
        reorder::day_sequence(&self.tasks, date)
    }

    pub fn task_count_for_date(&self, date: NaiveDate) -> usize {
        self.tasks
            .iter()
            .filter(|task| task.scope_date() == date)
            .count()
    }

    /// Replace the in-memory list with the store's view of `scope`.
    ///
    /// On failure the previous list and scope are kept.
    pub async fn load(&mut self, scope: Scope) -> Result<()> {
        let tasks = self.store.query_scope(scope).await.map_err(|err| {
            tracing::warn!(%scope, error = %err, "loading task list failed");
            Error::Store(err)
        })?;
        tracing::debug!(%scope, count = tasks.len(), "task list loaded");
        self.scope = scope;
        self.stale = false;
        self.publish(tasks);
        Ok(())
    }

    /// Reload the current scope.
    pub async fn reload(&mut self) -> Result<()> {
        self.load(self.scope).await
    }

    /// Insert a new task at the end of its day.
    ///
    /// The insert is not optimistic: the task appears in the list only once
    /// the store has assigned its id.
    pub async fn add(&mut self, draft: NewTask) -> Result<MutationOutcome> {
        draft.validate()?;
        let date = draft.due.date();
        let mut outcome = MutationOutcome::new(MutationKind::Add, None);

        let order = if self.scope.contains(date) {
            self.task_count_for_date(date)
        } else {
            match self.store.count_for_date(date).await {
                Ok(count) => count,
                Err(err) => return Ok(self.fail_without_change(outcome, err)),
            }
        };
        let task = draft.into_task(order as u32, Utc::now());

        match self.store.insert(&task).await {
            Ok(id) => {
                outcome.task_id = Some(id);
                if self.scope.contains(date) {
                    let mut tasks = self.tasks.clone();
                    tasks.push(Task {
                        id: Some(id),
                        ..task
                    });
                    self.publish(tasks);
                }
                outcome.advance(MutationState::AppliedLocally);
                outcome.advance(MutationState::PersistedConfirmed);
                tracing::info!(task_id = %id, %date, order, "task added");
                Ok(outcome)
            }
            Err(err) => Ok(self.fail_without_change(outcome, err)),
        }
    }

    /// Replace a task wholesale, optimistically.
    pub async fn update(&mut self, task: Task) -> Result<MutationOutcome> {
        let id = task.require_id()?;
        crate::task::validate_title(&task.title)?;
        let mut outcome = MutationOutcome::new(MutationKind::Update, Some(id));

        let mut tasks = self.tasks.clone();
        let position = tasks.iter().position(|existing| existing.id == Some(id));
        let in_scope = self.scope.contains(task.scope_date());
        match (position, in_scope) {
            (Some(index), true) => tasks[index] = task.clone(),
            (Some(index), false) => {
                tasks.remove(index);
            }
            (None, true) => tasks.push(task.clone()),
            (None, false) => {}
        }
        self.publish(tasks);
        outcome.advance(MutationState::AppliedLocally);

        match self.store.update(&task).await {
            Ok(()) => {
                outcome.advance(MutationState::PersistedConfirmed);
                Ok(outcome)
            }
            Err(err) => Ok(self.reconcile(outcome, err).await),
        }
    }

    /// Remove a task, optimistically. Siblings keep their order values.
    pub async fn delete(&mut self, id: TaskId) -> Result<MutationOutcome> {
        let mut outcome = MutationOutcome::new(MutationKind::Delete, Some(id));

        let mut tasks = self.tasks.clone();
        tasks.retain(|task| task.id != Some(id));
        self.publish(tasks);
        outcome.advance(MutationState::AppliedLocally);

        match self.store.delete(id).await {
            Ok(()) => {
                outcome.advance(MutationState::PersistedConfirmed);
                tracing::info!(task_id = %id, "task deleted");
                Ok(outcome)
            }
            Err(err) => Ok(self.reconcile(outcome, err).await),
        }
    }

    /// Apply a complete new ordering of one day and persist every task.
    ///
    /// When the loaded scope covers the day, the sequence must hold exactly
    /// the day's tasks. Writes go out one at a time; the first failure stops
    /// the rest and reconciles the whole list from the store.
    pub async fn reorder(&mut self, sequence: Vec<Task>) -> Result<MutationOutcome> {
        let date = sequence_date(&sequence)?;
        if self.scope.contains(date) {
            require_full_ordering(&self.tasks_for_date(date), &sequence, date)?;
        }
        let sequence = reorder::renumber(sequence);
        let mut outcome = MutationOutcome::new(MutationKind::Reorder, None);

        if self.scope.contains(date) {
            self.publish(splice_day(&self.tasks, date, &sequence));
        }
        outcome.advance(MutationState::AppliedLocally);

        for task in &sequence {
            if let Err(err) = self.store.update(task).await {
                outcome.task_id = task.id;
                return Ok(self.reconcile(outcome, err).await);
            }
        }
        outcome.advance(MutationState::PersistedConfirmed);
        tracing::info!(%date, count = sequence.len(), "tasks reordered");
        Ok(outcome)
    }

    /// Move one task within a day's list and persist the new order.
    pub async fn move_task(
        &mut self,
        date: NaiveDate,
        from: usize,
        to: usize,
    ) -> Result<MutationOutcome> {
        if !self.scope.contains(date) {
            return Err(Error::InvalidArgument(format!(
                "{date} is outside the loaded scope {}",
                self.scope
            )));
        }
        let day = self.tasks_for_date(date);
        if from >= day.len() || to >= day.len() {
            return Err(Error::InvalidArgument(format!(
                "cannot move {from} -> {to}: {date} has {} tasks",
                day.len()
            )));
        }
        self.reorder(reorder::move_task(&day, from, to)).await
    }

    fn publish(&mut self, tasks: Vec<Task>) {
        self.tasks = tasks;
        self.updates.send_replace(self.tasks.clone());
    }

    fn fail_without_change(&self, mut outcome: MutationOutcome, err: StoreError) -> MutationOutcome {
        tracing::warn!(kind = ?outcome.kind, error = %err, "store rejected request");
        outcome.advance(MutationState::PersistenceFailed);
        outcome.error = Some(err.to_string());
        outcome
    }

    async fn reconcile(&mut self, mut outcome: MutationOutcome, err: StoreError) -> MutationOutcome {
        tracing::warn!(kind = ?outcome.kind, task_id = ?outcome.task_id, error = %err, "persistence failed; reloading");
        outcome.advance(MutationState::PersistenceFailed);
        outcome.error = Some(err.to_string());

        match self.store.query_scope(self.scope).await {
            Ok(tasks) => {
                self.stale = false;
                self.publish(tasks);
                outcome.advance(MutationState::Reconciled);
            }
            Err(reload_err) => {
                tracing::error!(scope = %self.scope, error = %reload_err, "reconciliation reload failed");
                self.stale = true;
            }
        }
        outcome
    }
}

/// The single day a reorder sequence belongs to. Ids must be unique.
fn sequence_date(sequence: &[Task]) -> Result<NaiveDate> {
    let first = sequence
        .first()
        .ok_or_else(|| Error::InvalidArgument("reorder sequence is empty".to_string()))?;
    let date = first.scope_date();
    let mut seen = BTreeSet::new();
    for task in sequence {
        let id = task.require_id()?;
        if !seen.insert(id) {
            return Err(Error::InvalidArgument(format!(
                "reorder sequence lists task {id} more than once"
            )));
        }
        if task.scope_date() != date {
            return Err(Error::InvalidArgument(format!(
                "reorder sequence mixes {date} and {}",
                task.scope_date()
            )));
        }
    }
    Ok(date)
}

/// The sequence must be a permutation of the day's loaded tasks.
fn require_full_ordering(day: &[Task], sequence: &[Task], date: NaiveDate) -> Result<()> {
    let loaded: BTreeSet<TaskId> = day.iter().filter_map(|task| task.id).collect();
    let requested: BTreeSet<TaskId> = sequence.iter().filter_map(|task| task.id).collect();
    if loaded != requested || sequence.len() != day.len() {
        return Err(Error::InvalidArgument(format!(
            "reorder of {date} must list all {} of its tasks, got {}",
            day.len(),
            sequence.len()
        )));
    }
    Ok(())
}

/// Replace the tasks of `date` with `sequence`, keeping other days in place.
fn splice_day(tasks: &[Task], date: NaiveDate, sequence: &[Task]) -> Vec<Task> {
    let insert_at = tasks
        .iter()
        .position(|task| task.scope_date() == date)
        .unwrap_or(tasks.len());
    let mut spliced: Vec<Task> = Vec::with_capacity(tasks.len());
    for (index, task) in tasks.iter().enumerate() {
        if index == insert_at {
            spliced.extend(sequence.iter().cloned());
        }
        if task.scope_date() != date {
            spliced.push(task.clone());
        }
    }
    if insert_at == tasks.len() {
        spliced.extend(sequence.iter().cloned());
    }
    spliced
}
