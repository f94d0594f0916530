//! Event output for external integrations.
//!
//! Every mutation the CLI performs can be mirrored as one JSON line to stdout
//! or an append-only file (`--events <path|->`).

use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::controller::{MutationKind, MutationOutcome, MutationState};
use crate::error::{Error, Result};

pub const EVENT_SCHEMA_VERSION: &str = "daybook.event.v1";

#[derive(Debug, Clone)]
pub enum EventDestination {
    Stdout,
    File(PathBuf),
}

impl EventDestination {
    pub fn parse(raw: Option<&str>) -> Option<Self> {
        raw.and_then(|value| {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                return None;
            }
            if trimmed == "-" {
                return Some(EventDestination::Stdout);
            }
            Some(EventDestination::File(PathBuf::from(trimmed)))
        })
    }

    pub fn open(&self) -> Result<EventSink> {
        match self {
            EventDestination::Stdout => Ok(EventSink::stdout()),
            EventDestination::File(path) => EventSink::file(path),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    TaskCreated,
    TaskUpdated,
    TaskDeleted,
    TasksReordered,
    ListReconciled,
    HolidayAdded,
    HolidayRemoved,
    PreferencesChanged,
}

impl EventKind {
    /// Event for a finished mutation; `None` when nothing was persisted or
    /// reconciled (a rejected insert, or a failed reload).
    pub fn for_outcome(outcome: &MutationOutcome) -> Option<Self> {
        match outcome.state {
            MutationState::Reconciled => Some(EventKind::ListReconciled),
            MutationState::PersistedConfirmed => Some(match outcome.kind {
                MutationKind::Add => EventKind::TaskCreated,
                MutationKind::Update => EventKind::TaskUpdated,
                MutationKind::Delete => EventKind::TaskDeleted,
                MutationKind::Reorder => EventKind::TasksReordered,
            }),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Event {
    pub schema_version: &'static str,
    pub event: EventKind,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl Event {
    pub fn new(event: EventKind) -> Self {
        Self {
            schema_version: EVENT_SCHEMA_VERSION,
            event,
            timestamp: Utc::now(),
            data: None,
        }
    }

    /// Attach a serializable payload to the event.
    pub fn with_data<T: Serialize>(mut self, data: T) -> Result<Self> {
        self.data = Some(serde_json::to_value(data)?);
        Ok(self)
    }
}

/// Event sink that writes JSONL output to a destination.
pub struct EventSink {
    writer: Box<dyn Write + Send>,
}

impl EventSink {
    pub fn stdout() -> Self {
        Self {
            writer: Box::new(std::io::stdout()),
        }
    }

    /// Append to a file, creating it if necessary.
    pub fn file(path: &Path) -> Result<Self> {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;
        Ok(Self {
            writer: Box::new(file),
        })
    }

    pub fn emit(&mut self, event: &Event) -> Result<()> {
        let serialized = serde_json::to_vec(event)?;
        self.writer.write_all(&serialized)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush().map_err(Error::Io)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(kind: MutationKind, state: MutationState) -> MutationOutcome {
        MutationOutcome {
            kind,
            state,
            task_id: None,
            error: None,
        }
    }

    #[test]
    fn outcome_mapping() {
        assert_eq!(
            EventKind::for_outcome(&outcome(MutationKind::Reorder, MutationState::PersistedConfirmed)),
            Some(EventKind::TasksReordered)
        );
        assert_eq!(
            EventKind::for_outcome(&outcome(MutationKind::Delete, MutationState::Reconciled)),
            Some(EventKind::ListReconciled)
        );
        assert_eq!(
            EventKind::for_outcome(&outcome(MutationKind::Add, MutationState::PersistenceFailed)),
            None
        );
    }

    #[test]
    fn file_sink_appends_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.jsonl");
        let mut sink = EventDestination::parse(Some(path.to_str().unwrap()))
            .unwrap()
            .open()
            .unwrap();
        sink.emit(&Event::new(EventKind::TaskCreated)).unwrap();
        sink.emit(&Event::new(EventKind::TaskDeleted)).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("\"event\":\"task_created\""));
        assert!(lines[1].contains(EVENT_SCHEMA_VERSION));
    }

    #[test]
    fn blank_destination_disables_events() {
        assert!(EventDestination::parse(Some("  ")).is_none());
        assert!(matches!(EventDestination::parse(Some("-")), Some(EventDestination::Stdout)));
    }
}
