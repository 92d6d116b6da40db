// SPDX-FileCopyrightText: 2026 Stowage Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Stowage export pipeline.

use std::sync::Arc;

use strum::{Display, IntoStaticStr};
use thiserror::Error;

/// Boxed error returned by database collaborators (connections, statement factories).
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Shared error handle. Executor failures are stored once and handed out on
/// every later check, so their cause must be cheaply cloneable.
pub type SharedError = Arc<dyn std::error::Error + Send + Sync>;

/// The step inside the background executor that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ExecutionStage {
    /// Running a statement against the connection.
    Execute,
    /// Releasing a statement after execution.
    Release,
    /// Committing the current transaction.
    Commit,
}

/// The primary error type used across the export pipeline.
#[derive(Debug, Error)]
pub enum StowageError {
    /// A record could not be duplicated for safe buffering.
    #[error("could not buffer record: {message}")]
    RecordCopy {
        message: String,
        source: Option<BoxError>,
    },

    /// Binding buffered records into a statement failed. The writer keeps
    /// reporting this error, so the cause is shared.
    #[error("statement build failed: {source}")]
    StatementBuild { source: SharedError },

    /// Statement execution, release or commit failed inside the executor.
    #[error("{stage} failed in executor: {source}")]
    Execution {
        stage: ExecutionStage,
        source: SharedError,
    },

    /// The executor did not terminate cleanly or the connection could not be closed.
    #[error("shutdown failed: {message}")]
    Shutdown {
        message: String,
        source: Option<BoxError>,
    },

    /// The connection factory could not open a connection.
    #[error("connection failed: {source}")]
    Connect { source: BoxError },

    /// Invalid writer configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl StowageError {
    /// Shorthand for a [`StowageError::RecordCopy`] without an underlying cause.
    pub fn record_copy(message: impl Into<String>) -> Self {
        Self::RecordCopy {
            message: message.into(),
            source: None,
        }
    }

    /// Shorthand for a [`StowageError::Shutdown`] with an optional cause.
    pub fn shutdown(message: impl Into<String>, source: Option<BoxError>) -> Self {
        Self::Shutdown {
            message: message.into(),
            source,
        }
    }
}

/// The generic task-level failure reported to the calling framework.
///
/// Every failure of `write` or `close` is wrapped in this type, with the
/// original [`StowageError`] kept as the cause for diagnostics.
#[derive(Debug, Error)]
#[error("export task failed: {cause}")]
pub struct TaskError {
    #[source]
    cause: StowageError,
}

impl TaskError {
    /// The error that caused the task to fail.
    pub fn cause(&self) -> &StowageError {
        &self.cause
    }

    /// Consume the wrapper and return the underlying error.
    pub fn into_cause(self) -> StowageError {
        self.cause
    }
}

impl From<StowageError> for TaskError {
    fn from(cause: StowageError) -> Self {
        Self { cause }
    }
}

impl From<TaskError> for std::io::Error {
    fn from(err: TaskError) -> Self {
        std::io::Error::other(err)
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use super::*;

    #[test]
    fn task_error_keeps_cause_chain() {
        let db_err = std::io::Error::other("disk full");
        let err = TaskError::from(StowageError::Execution {
            stage: ExecutionStage::Commit,
            source: Arc::new(db_err),
        });

        assert_eq!(
            err.to_string(),
            "export task failed: commit failed in executor: disk full"
        );
        let cause = err.source().expect("task error should expose its cause");
        let root = cause.source().expect("execution error should expose the database error");
        assert_eq!(root.to_string(), "disk full");
    }

    #[test]
    fn task_error_converts_into_io_error() {
        let err = TaskError::from(StowageError::record_copy("clone unsupported"));
        let io: std::io::Error = err.into();
        assert_eq!(io.kind(), std::io::ErrorKind::Other);
        assert!(io.to_string().contains("could not buffer record"));
    }

    #[test]
    fn execution_stage_labels_are_snake_case() {
        let label: &'static str = ExecutionStage::Execute.into();
        assert_eq!(label, "execute");
        assert_eq!(ExecutionStage::Commit.to_string(), "commit");
    }
}
