//! Single-writer command queue in front of a [`TaskListController`].
//!
//! The controller is moved into one tokio task that handles commands in
//! arrival order, so mutations of the list never interleave. Callers hold
//! a cheap, cloneable [`TaskListHandle`] and await each reply.

use chrono::NaiveDate;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;

use crate::controller::{MutationOutcome, TaskListController};
use crate::error::{Error, Result};
use crate::store::TaskStore;
use crate::task::{NewTask, Scope, Task, TaskId};

/// Pending commands beyond this block the sender.
const QUEUE_DEPTH: usize = 64;

type Reply<T> = oneshot::Sender<Result<T>>;

enum Command {
    Load(Scope, Reply<()>),
    Add(NewTask, Reply<MutationOutcome>),
    Update(Task, Reply<MutationOutcome>),
    Delete(TaskId, Reply<MutationOutcome>),
    Reorder(Vec<Task>, Reply<MutationOutcome>),
    Move {
        date: NaiveDate,
        from: usize,
        to: usize,
        reply: Reply<MutationOutcome>,
    },
    Snapshot(oneshot::Sender<Vec<Task>>),
}

#[derive(Clone)]
pub struct TaskListHandle {
    commands: mpsc::Sender<Command>,
    updates: watch::Receiver<Vec<Task>>,
}

/// Move `controller` onto its own task and return a handle to it.
///
/// The task ends once every handle is dropped.
pub fn spawn<S>(controller: TaskListController<S>) -> (TaskListHandle, JoinHandle<()>)
where
    S: TaskStore + ?Sized + 'static,
{
    let (commands, receiver) = mpsc::channel(QUEUE_DEPTH);
    let updates = controller.subscribe();
    let worker = tokio::spawn(run(controller, receiver));
    (TaskListHandle { commands, updates }, worker)
}

async fn run<S>(mut controller: TaskListController<S>, mut receiver: mpsc::Receiver<Command>)
where
    S: TaskStore + ?Sized,
{
    while let Some(command) = receiver.recv().await {
        match command {
            Command::Load(scope, reply) => {
                let _ = reply.send(controller.load(scope).await);
            }
            Command::Add(draft, reply) => {
                let _ = reply.send(controller.add(draft).await);
            }
            Command::Update(task, reply) => {
                let _ = reply.send(controller.update(task).await);
            }
            Command::Delete(id, reply) => {
                let _ = reply.send(controller.delete(id).await);
            }
            Command::Reorder(sequence, reply) => {
                let _ = reply.send(controller.reorder(sequence).await);
            }
            Command::Move {
                date,
                from,
                to,
                reply,
            } => {
                let _ = reply.send(controller.move_task(date, from, to).await);
            }
            Command::Snapshot(reply) => {
                let _ = reply.send(controller.tasks().to_vec());
            }
        }
    }
    tracing::debug!("task list service stopped");
}

impl TaskListHandle {
    pub async fn load(&self, scope: Scope) -> Result<()> {
        self.request(|reply| Command::Load(scope, reply)).await
    }

    pub async fn add(&self, draft: NewTask) -> Result<MutationOutcome> {
        self.request(|reply| Command::Add(draft, reply)).await
    }

    pub async fn update(&self, task: Task) -> Result<MutationOutcome> {
        self.request(|reply| Command::Update(task, reply)).await
    }

    pub async fn delete(&self, id: TaskId) -> Result<MutationOutcome> {
        self.request(|reply| Command::Delete(id, reply)).await
    }

    pub async fn reorder(&self, sequence: Vec<Task>) -> Result<MutationOutcome> {
        self.request(|reply| Command::Reorder(sequence, reply)).await
    }

    pub async fn move_task(&self, date: NaiveDate, from: usize, to: usize) -> Result<MutationOutcome> {
        self.request(|reply| Command::Move {
            date,
            from,
            to,
            reply,
        })
        .await
    }

    /// The list after every command queued before this call has run.
    pub async fn snapshot(&self) -> Result<Vec<Task>> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(Command::Snapshot(reply))
            .await
            .map_err(|_| Error::ServiceClosed)?;
        response.await.map_err(|_| Error::ServiceClosed)
    }

    /// Latest published list, without queueing behind pending commands.
    pub fn current(&self) -> Vec<Task> {
        self.updates.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<Task>> {
        self.updates.clone()
    }

    async fn request<T>(&self, build: impl FnOnce(Reply<T>) -> Command) -> Result<T> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(build(reply))
            .await
            .map_err(|_| Error::ServiceClosed)?;
        response.await.map_err(|_| Error::ServiceClosed)?
    }
}
