// SPDX-FileCopyrightText: 2026 Stowage Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The unit of work passed from the producer to the executor.

/// One executor instruction: an optional statement plus control flags.
///
/// An operation without a statement carries only flags, as the final
/// operation of an empty buffer does.
#[derive(Debug)]
pub struct Operation<S> {
    statement: Option<S>,
    batched: bool,
    commit: bool,
    stop: bool,
}

impl<S> Operation<S> {
    pub fn new(statement: Option<S>, batched: bool, commit: bool, stop: bool) -> Self {
        Self {
            statement,
            batched,
            commit,
            stop,
        }
    }

    /// The statement to execute, if any.
    pub fn statement(&self) -> Option<&S> {
        self.statement.as_ref()
    }

    /// Execute the statement in batched mode.
    pub fn is_batched(&self) -> bool {
        self.batched
    }

    /// Commit after this operation regardless of the transaction counter.
    pub fn requires_commit(&self) -> bool {
        self.commit
    }

    /// Terminate the executor after this operation.
    pub fn stops_executor(&self) -> bool {
        self.stop
    }

    /// Take ownership of the statement, discarding the flags.
    pub fn into_statement(self) -> Option<S> {
        self.statement
    }
}
