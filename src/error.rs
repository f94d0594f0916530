//! Error types for daybook
//!
//! Exit codes:
//! - 0: Success
//! - 2: User error (bad args, invalid task, unknown id, bad config)
//! - 4: Operation failed (store I/O, lock contention)

use std::path::PathBuf;
use thiserror::Error;

use crate::task::{HolidayId, TaskId};

/// Exit codes for the daybook CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const USER_ERROR: i32 = 2;
    pub const OPERATION_FAILED: i32 = 4;
}

/// Failures reported by a task or holiday store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Task not found: {0}")]
    NotFound(TaskId),

    #[error("Holiday not found: {0}")]
    HolidayNotFound(HolidayId),

    #[error("Task has no identifier; it was never persisted")]
    MissingId,

    #[error("Task {0} is already persisted")]
    AlreadyPersisted(TaskId),

    #[error("Store lock acquisition failed: {0}")]
    LockFailed(PathBuf),

    #[error("Store schema mismatch: expected {expected}, found {found}")]
    Schema { expected: String, found: String },

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Main error type for daybook operations
#[derive(Error, Debug)]
pub enum Error {
    // User errors (exit code 2)
    #[error("Invalid task: {0}")]
    Validation(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // Operation failures (exit code 4)
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Task list service has shut down")]
    ServiceClosed,

    #[error("Operation failed: {0}")]
    OperationFailed(String),
}

impl Error {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Validation(_)
            | Error::InvalidArgument(_)
            | Error::InvalidConfig(_)
            | Error::Store(StoreError::NotFound(_))
            | Error::Store(StoreError::HolidayNotFound(_)) => exit_codes::USER_ERROR,

            Error::Store(_)
            | Error::Io(_)
            | Error::Json(_)
            | Error::TomlParse(_)
            | Error::TomlSerialize(_)
            | Error::ServiceClosed
            | Error::OperationFailed(_) => exit_codes::OPERATION_FAILED,
        }
    }

    /// Structured details for JSON error output
    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            Error::Validation(message)
            | Error::InvalidArgument(message)
            | Error::InvalidConfig(message) => Some(serde_json::json!({ "message": message })),
            Error::Store(StoreError::NotFound(id)) => Some(serde_json::json!({ "task_id": id.0 })),
            Error::Store(StoreError::HolidayNotFound(id)) => {
                Some(serde_json::json!({ "holiday_id": id.0 }))
            }
            Error::Store(StoreError::LockFailed(path)) => {
                Some(serde_json::json!({ "lock": path.display().to_string() }))
            }
            _ => None,
        }
    }
}

/// Result type alias for daybook operations
pub type Result<T> = std::result::Result<T, Error>;

/// Wrapper for displaying errors in JSON format
#[derive(serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub code: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl From<&Error> for JsonError {
    fn from(err: &Error) -> Self {
        JsonError {
            error: err.to_string(),
            code: err.exit_code(),
            details: err.details(),
        }
    }
}
