// SPDX-FileCopyrightText: 2026 Stowage Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Background executor: runs statements against the shared connection.
//!
//! The executor owns the transaction counter. It commits when an operation
//! asks for it or when the number of statements executed since the last
//! commit reaches `statements_per_transaction`. After the first failure it
//! keeps taking operations so the producer never blocks, but releases their
//! statements without executing them and never commits again.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use stowage_core::{BoxError, Connection, ExecutionStage, StowageError};
use tracing::{debug, error, warn};

use crate::connection::SharedConnection;
use crate::error_slot::ErrorSlot;
use crate::handoff::{self, HandoffReceiver, HandoffSender};
use crate::metrics;
use crate::operation::Operation;

/// Name of every executor thread.
pub const EXECUTOR_THREAD_NAME: &str = "stowage-executor";

/// Counters kept by an executor over its lifetime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecutorStats {
    /// Operations taken from the handoff.
    pub operations: u64,
    /// Statements executed successfully.
    pub statements_executed: u64,
    /// Statements released without execution after a failure.
    pub statements_skipped: u64,
    /// Rows reported affected by executed statements.
    pub rows_written: u64,
    /// Successful commits.
    pub commits: u64,
}

struct Executor<C: Connection> {
    connection: SharedConnection<C>,
    receiver: HandoffReceiver<C::Statement>,
    errors: Arc<ErrorSlot>,
    statements_per_transaction: usize,
    uncommitted: usize,
    stats: ExecutorStats,
}

impl<C: Connection> Executor<C> {
    fn run(mut self) -> ExecutorStats {
        debug!(
            statements_per_transaction = self.statements_per_transaction,
            "executor started"
        );
        while let Some(op) = self.receiver.take() {
            self.stats.operations += 1;
            let stop = op.stops_executor();
            self.process(op);
            if stop {
                break;
            }
        }
        debug!(
            operations = self.stats.operations,
            statements = self.stats.statements_executed,
            commits = self.stats.commits,
            "executor stopped"
        );
        self.stats
    }

    fn process(&mut self, op: Operation<C::Statement>) {
        let batched = op.is_batched();
        let commit = op.requires_commit();
        let statement = op.into_statement();

        let connection = self.connection.clone();
        let mut conn = match connection.lock() {
            Ok(conn) => conn,
            Err(err) => {
                self.fail(ExecutionStage::Execute, Box::new(err));
                return;
            }
        };

        if self.errors.is_set() {
            if let Some(statement) = statement {
                self.stats.statements_skipped += 1;
                warn!(
                    skipped = self.stats.statements_skipped,
                    "executor draining; statement released without execution"
                );
                if let Err(err) = conn.release(statement) {
                    warn!(error = %err, "failed to release skipped statement");
                }
            }
            return;
        }

        if let Some(mut statement) = statement {
            let executed = conn.execute(&mut statement, batched);
            let released = conn.release(statement);
            match executed {
                Ok(rows) => {
                    self.stats.statements_executed += 1;
                    self.stats.rows_written += rows;
                    metrics::record_statement(batched, rows);
                }
                Err(err) => self.fail(ExecutionStage::Execute, err),
            }
            if let Err(err) = released {
                self.fail(ExecutionStage::Release, err);
            }
            if self.errors.is_set() {
                return;
            }
            self.uncommitted += 1;
        }

        if commit || self.uncommitted >= self.statements_per_transaction {
            if let Err(err) = conn.commit() {
                self.fail(ExecutionStage::Commit, err);
                return;
            }
            debug!(statements = self.uncommitted, "committed transaction");
            self.uncommitted = 0;
            self.stats.commits += 1;
            metrics::record_commit();
        }
    }

    fn fail(&self, stage: ExecutionStage, err: BoxError) {
        metrics::record_failure(stage);
        let message = err.to_string();
        if self.errors.record(stage, err) {
            error!(%stage, error = %message, "executor failed; draining remaining operations");
        } else {
            warn!(%stage, error = %message, "executor failure after an earlier error; ignored");
        }
    }
}

/// Producer-side handle on a running executor thread.
pub(crate) struct ExecutorHandle<S> {
    sender: HandoffSender<S>,
    thread: JoinHandle<ExecutorStats>,
    errors: Arc<ErrorSlot>,
}

/// Start an executor thread bound to `connection`.
pub(crate) fn spawn<C: Connection>(
    connection: SharedConnection<C>,
    statements_per_transaction: usize,
) -> Result<ExecutorHandle<C::Statement>, StowageError> {
    let (sender, receiver) = handoff::channel();
    let errors = Arc::new(ErrorSlot::default());
    let executor = Executor {
        connection,
        receiver,
        errors: Arc::clone(&errors),
        statements_per_transaction,
        uncommitted: 0,
        stats: ExecutorStats::default(),
    };

    let thread = thread::Builder::new()
        .name(EXECUTOR_THREAD_NAME.to_string())
        .spawn(move || executor.run())
        .map_err(|e| StowageError::Internal(format!("failed to spawn executor thread: {e}")))?;

    Ok(ExecutorHandle {
        sender,
        thread,
        errors,
    })
}

impl<S> ExecutorHandle<S> {
    /// Hand `op` to the executor, blocking until it is taken.
    ///
    /// Returns the operation back if the executor has exited.
    pub(crate) fn submit(&self, op: Operation<S>) -> Result<(), Operation<S>> {
        self.sender.put(op)
    }

    /// The first error recorded by the executor, if any.
    pub(crate) fn first_error(&self) -> Option<StowageError> {
        self.errors.get()
    }

    /// Disconnect the handoff and wait for the thread to exit.
    ///
    /// Returns the executor's counters and the first recorded error.
    pub(crate) fn join(self) -> Result<(ExecutorStats, Option<StowageError>), StowageError> {
        let ExecutorHandle {
            sender,
            thread,
            errors,
        } = self;
        drop(sender);
        let stats = thread
            .join()
            .map_err(|_| StowageError::shutdown("executor thread panicked", None))?;
        Ok((stats, errors.get()))
    }
}
