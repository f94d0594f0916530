//! daybook task command implementations.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;

use crate::cli::{parse_date, parse_date_or_today, parse_time, Context, TaskCommands};
use crate::controller::{MutationKind, MutationOutcome, TaskListController};
use crate::error::{Error, Result, StoreError};
use crate::events::EventKind;
use crate::output::{emit_success, HumanOutput};
use crate::service::{self, TaskListHandle};
use crate::task::{NewTask, Priority, Scope, Task, TaskId};

#[derive(Serialize)]
struct TaskOutput {
    task: Task,
}

#[derive(Serialize)]
struct TaskListOutput {
    scope: Scope,
    total: usize,
    tasks: Vec<Task>,
}

#[derive(Serialize)]
struct TaskDeletedOutput {
    id: TaskId,
}

#[derive(Serialize)]
struct TaskMovedOutput {
    date: NaiveDate,
    from: usize,
    to: usize,
    tasks: Vec<Task>,
}

pub(crate) async fn run(ctx: &mut Context, command: TaskCommands) -> Result<()> {
    match command {
        TaskCommands::Add {
            title,
            date,
            time,
            description,
            priority,
            category,
        } => run_add(ctx, title, date, time, description, priority, category).await,
        TaskCommands::List {
            date,
            from,
            to,
            all,
        } => run_list(ctx, date, from, to, all).await,
        TaskCommands::Edit {
            id,
            title,
            description,
            priority,
            category,
            date,
            time,
            all_day,
        } => {
            let edit = Edit {
                title,
                description,
                priority,
                category,
                date,
                time,
                all_day,
            };
            run_edit(ctx, &id, edit).await
        }
        TaskCommands::Done { id, undo } => run_done(ctx, &id, !undo).await,
        TaskCommands::Rm { id } => run_rm(ctx, &id).await,
        TaskCommands::Mv { from, to, date } => run_mv(ctx, from, to, date).await,
    }
}

/// Start the task list service for `scope` and load it.
async fn open_list(ctx: &Context, scope: Scope) -> Result<TaskListHandle> {
    let controller = TaskListController::new(Arc::new(ctx.store()), scope);
    let (handle, _worker) = service::spawn(controller);
    handle.load(scope).await?;
    Ok(handle)
}

async fn find_task(handle: &TaskListHandle, id: TaskId) -> Result<Task> {
    handle
        .snapshot()
        .await?
        .into_iter()
        .find(|task| task.id == Some(id))
        .ok_or(Error::Store(StoreError::NotFound(id)))
}

/// Emit the outcome's event and turn an unpersisted outcome into an error.
fn settle<T: Serialize>(
    ctx: &mut Context,
    outcome: &MutationOutcome,
    data: T,
) -> Result<Vec<String>> {
    let mut warnings = Vec::new();
    if let Some(kind) = EventKind::for_outcome(outcome) {
        let warning = if outcome.is_persisted() {
            ctx.emit(kind, data)
        } else {
            ctx.emit(kind, outcome)
        };
        warnings.extend(warning);
    }

    if outcome.is_persisted() {
        return Ok(warnings);
    }
    Err(Error::OperationFailed(format!(
        "{} was not saved: {}",
        mutation_label(outcome.kind),
        outcome.error.as_deref().unwrap_or("store unavailable")
    )))
}

fn mutation_label(kind: MutationKind) -> &'static str {
    match kind {
        MutationKind::Add => "new task",
        MutationKind::Update => "task change",
        MutationKind::Delete => "task deletion",
        MutationKind::Reorder => "new order",
    }
}

async fn run_add(
    ctx: &mut Context,
    title: String,
    date: Option<String>,
    time: Option<String>,
    description: Option<String>,
    priority: Option<String>,
    category: Option<String>,
) -> Result<()> {
    let date = parse_date_or_today("date", date.as_deref())?;
    let time = match time.as_deref() {
        Some(raw) => parse_time(raw)?,
        None => NaiveTime::MIN,
    };
    let priority = match priority.as_deref() {
        Some(raw) => raw.parse::<Priority>()?,
        None => ctx.config().tasks.priority()?,
    };
    let category = category.unwrap_or_else(|| ctx.config().tasks.default_category.clone());

    let mut human = HumanOutput::new("Task added");
    if !is_known_category(ctx, &category) {
        human.push_warning(format!("category '{category}' is not in tasks.categories"));
    }

    let mut draft = NewTask::new(title, date.and_time(time))
        .priority(priority)
        .category(category);
    if let Some(description) = description {
        draft = draft.description(description);
    }

    let handle = open_list(ctx, Scope::Day(date)).await?;
    let outcome = handle.add(draft).await?;
    let created = match outcome.task_id {
        Some(id) => find_task(&handle, id).await.ok(),
        None => None,
    };
    for warning in settle(ctx, &outcome, &created)? {
        human.push_warning(warning);
    }
    let task = created.ok_or_else(|| {
        Error::OperationFailed("new task missing from the reloaded list".to_string())
    })?;

    push_task_summary(&mut human, &task);
    human.push_next_step(format!("daybook task list --date {date}"));

    emit_success(ctx.output(), "task add", &TaskOutput { task }, Some(&human))
}

async fn run_list(
    ctx: &mut Context,
    date: Option<String>,
    from: Option<String>,
    to: Option<String>,
    all: bool,
) -> Result<()> {
    let scope = match (from.as_deref(), to.as_deref()) {
        _ if all => Scope::All,
        (Some(from), Some(to)) => Scope::range(parse_date("from", from)?, parse_date("to", to)?)?,
        _ => Scope::Day(parse_date_or_today("date", date.as_deref())?),
    };

    let handle = open_list(ctx, scope).await?;
    let tasks = handle.snapshot().await?;

    let mut human = HumanOutput::new(format!("Tasks ({scope})"));
    human.push_summary("Total", tasks.len().to_string());
    human.push_summary(
        "Completed",
        tasks.iter().filter(|task| task.completed).count().to_string(),
    );
    match scope {
        Scope::Day(_) => {
            for (position, task) in tasks.iter().enumerate() {
                human.push_detail(format!("{position}. {}", format_task_line(task)));
            }
        }
        _ => {
            for task in &tasks {
                human.push_detail(format!("{} {}", task.scope_date(), format_task_line(task)));
            }
        }
    }
    if tasks.is_empty() {
        human.push_next_step("daybook task add <title>");
    }

    let output = TaskListOutput {
        scope,
        total: tasks.len(),
        tasks,
    };
    emit_success(ctx.output(), "task list", &output, Some(&human))
}

struct Edit {
    title: Option<String>,
    description: Option<String>,
    priority: Option<String>,
    category: Option<String>,
    date: Option<String>,
    time: Option<String>,
    all_day: bool,
}

impl Edit {
    fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.priority.is_none()
            && self.category.is_none()
            && self.date.is_none()
            && self.time.is_none()
            && !self.all_day
    }
}

async fn run_edit(ctx: &mut Context, id: &str, edit: Edit) -> Result<()> {
    let id: TaskId = id.parse()?;
    if edit.is_empty() {
        return Err(Error::InvalidArgument(
            "nothing to change; pass at least one field".to_string(),
        ));
    }

    let handle = open_list(ctx, Scope::All).await?;
    let mut task = find_task(&handle, id).await?;
    let previous_day = task.scope_date();

    if let Some(title) = edit.title {
        task.title = title.trim().to_string();
    }
    if let Some(description) = edit.description {
        task.description = description;
    }
    if let Some(priority) = edit.priority.as_deref() {
        task.priority = priority.parse()?;
    }
    if let Some(category) = edit.category {
        task.category = category.trim().to_string();
    }
    let day = match edit.date.as_deref() {
        Some(raw) => parse_date("date", raw)?,
        None => previous_day,
    };
    let time = if edit.all_day {
        NaiveTime::MIN
    } else {
        match edit.time.as_deref() {
            Some(raw) => parse_time(raw)?,
            None => task.due.time(),
        }
    };
    task.due = day.and_time(time);

    let mut human = HumanOutput::new("Task updated");
    if day != previous_day {
        // a task changing days goes to the end of the new day
        let siblings = handle
            .snapshot()
            .await?
            .iter()
            .filter(|other| other.scope_date() == day)
            .count();
        task.order = siblings as u32;
        human.push_warning(format!(
            "positions on {previous_day} are not compacted; run daybook task mv to tidy them"
        ));
    }
    if !is_known_category(ctx, &task.category) {
        human.push_warning(format!("category '{}' is not in tasks.categories", task.category));
    }

    let outcome = handle.update(task.clone()).await?;
    for warning in settle(ctx, &outcome, &task)? {
        human.push_warning(warning);
    }
    push_task_summary(&mut human, &task);

    emit_success(ctx.output(), "task edit", &TaskOutput { task }, Some(&human))
}

async fn run_done(ctx: &mut Context, id: &str, completed: bool) -> Result<()> {
    let id: TaskId = id.parse()?;
    let handle = open_list(ctx, Scope::All).await?;
    let mut task = find_task(&handle, id).await?;
    task.completed = completed;

    let header = if completed { "Task completed" } else { "Task reopened" };
    let mut human = HumanOutput::new(header);
    let outcome = handle.update(task.clone()).await?;
    for warning in settle(ctx, &outcome, &task)? {
        human.push_warning(warning);
    }
    push_task_summary(&mut human, &task);

    emit_success(ctx.output(), "task done", &TaskOutput { task }, Some(&human))
}

async fn run_rm(ctx: &mut Context, id: &str) -> Result<()> {
    let id: TaskId = id.parse()?;
    let handle = open_list(ctx, Scope::All).await?;
    let task = find_task(&handle, id).await?;

    let mut human = HumanOutput::new("Task deleted");
    let outcome = handle.delete(id).await?;
    for warning in settle(ctx, &outcome, TaskDeletedOutput { id })? {
        human.push_warning(warning);
    }
    human.push_summary("ID", id.to_string());
    human.push_summary("Title", task.title);

    emit_success(ctx.output(), "task rm", &TaskDeletedOutput { id }, Some(&human))
}

async fn run_mv(ctx: &mut Context, from: usize, to: usize, date: Option<String>) -> Result<()> {
    let date = parse_date_or_today("date", date.as_deref())?;
    let handle = open_list(ctx, Scope::Day(date)).await?;

    let outcome = handle.move_task(date, from, to).await?;
    let tasks = handle.snapshot().await?;
    let output = TaskMovedOutput {
        date,
        from,
        to,
        tasks,
    };

    let mut human = HumanOutput::new(format!("Moved task {from} -> {to} on {date}"));
    for warning in settle(ctx, &outcome, &output)? {
        human.push_warning(warning);
    }
    for (position, task) in output.tasks.iter().enumerate() {
        human.push_detail(format!("{position}. {}", format_task_line(task)));
    }

    emit_success(ctx.output(), "task mv", &output, Some(&human))
}

fn is_known_category(ctx: &Context, category: &str) -> bool {
    let categories = &ctx.config().tasks.categories;
    categories.is_empty() || categories.iter().any(|known| known.eq_ignore_ascii_case(category))
}

fn push_task_summary(human: &mut HumanOutput, task: &Task) {
    if let Some(id) = task.id {
        human.push_summary("ID", id.to_string());
    }
    human.push_summary("Title", task.title.clone());
    human.push_summary("Due", format_due(task));
    human.push_summary("Priority", task.priority.to_string());
    human.push_summary("Category", task.category.clone());
    human.push_summary("Position", task.order.to_string());
    if task.completed {
        human.push_summary("Completed", "yes");
    }
}

fn format_due(task: &Task) -> String {
    if task.is_all_day() {
        format!("{} (all day)", task.scope_date())
    } else {
        task.due.format("%Y-%m-%d %H:%M").to_string()
    }
}

fn format_task_line(task: &Task) -> String {
    let id = task
        .id
        .map(|id| format!("#{id}"))
        .unwrap_or_else(|| "#?".to_string());
    let check = if task.completed { "[x]" } else { "[ ]" };
    let time = if task.is_all_day() {
        "all day".to_string()
    } else {
        task.due.format("%H:%M").to_string()
    };
    format!(
        "{id} {check} {time} {} ({}, {})",
        task.title, task.priority, task.category
    )
}
