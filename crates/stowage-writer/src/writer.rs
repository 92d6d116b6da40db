// SPDX-FileCopyrightText: 2026 Stowage Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Producer-side record writer.

use std::error::Error as _;
use std::sync::Arc;
use std::time::Instant;

use stowage_core::{
    Connection, ConnectionFactory, ExportRecord, SharedError, StatementFactory, StowageError,
    TaskError,
};
use tracing::{debug, error, warn};

use crate::config::WriterConfig;
use crate::connection::SharedConnection;
use crate::executor::{self, ExecutorHandle, ExecutorStats};
use crate::metrics;
use crate::operation::Operation;

/// Producer-side counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriterStats {
    /// Records copied into the buffer.
    pub records_buffered: u64,
    /// Statements built and handed to the executor.
    pub statements_submitted: u64,
}

/// Final counters of a closed writer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriterSummary {
    pub records_buffered: u64,
    pub statements_submitted: u64,
    pub statements_executed: u64,
    pub rows_written: u64,
    pub commits: u64,
}

impl WriterSummary {
    fn new(writer: WriterStats, executor: ExecutorStats) -> Self {
        Self {
            records_buffered: writer.records_buffered,
            statements_submitted: writer.statements_submitted,
            statements_executed: executor.statements_executed,
            rows_written: executor.rows_written,
            commits: executor.commits,
        }
    }
}

/// Buffers records and writes them in batches on a background executor.
///
/// Every `rows_per_statement` records are bound into one statement and
/// handed to the executor; `write` blocks while the executor is still busy
/// with the previous statement. `close` flushes the remainder, commits,
/// stops the executor and closes the connection. It must be called once
/// the producer is done; later calls are no-ops.
pub struct AsyncRecordWriter<C, F, R>
where
    C: Connection,
    F: StatementFactory<C, R>,
    R: ExportRecord,
{
    config: WriterConfig,
    connection: SharedConnection<C>,
    factory: F,
    records: Vec<R>,
    executor: Option<ExecutorHandle<C::Statement>>,
    started: bool,
    closed: bool,
    stats: WriterStats,
    summary: Option<WriterSummary>,
    // A failed build discards its batch; every later write and close
    // reports the same failure.
    build_failure: Option<SharedError>,
}

impl<C, F, R> AsyncRecordWriter<C, F, R>
where
    C: Connection,
    F: StatementFactory<C, R>,
    R: ExportRecord,
{
    /// Wrap an open connection. The executor thread starts on the first flush.
    pub fn new(config: WriterConfig, connection: C, factory: F) -> Self {
        Self {
            config,
            connection: SharedConnection::new(connection),
            factory,
            records: Vec::with_capacity(config.rows_per_statement()),
            executor: None,
            started: false,
            closed: false,
            stats: WriterStats::default(),
            summary: None,
            build_failure: None,
        }
    }

    /// Open a connection through `connections` and wrap it.
    pub fn connect<CF>(config: WriterConfig, connections: &CF, factory: F) -> Result<Self, TaskError>
    where
        CF: ConnectionFactory<Connection = C>,
    {
        let connection = connections
            .connect()
            .map_err(|source| StowageError::Connect { source })?;
        Ok(Self::new(config, connection, factory))
    }

    /// Buffer a copy of `record`, flushing once `rows_per_statement` records
    /// are buffered.
    ///
    /// The caller may reuse `record` as soon as this returns. A copy failure
    /// leaves the buffer unchanged. After a statement build failure every
    /// write fails with that error and nothing more is buffered.
    pub fn write(&mut self, record: &R) -> Result<(), TaskError> {
        if self.closed {
            return Err(StowageError::shutdown("writer is already closed", None).into());
        }
        if let Some(err) = self.stored_build_failure() {
            return Err(err.into());
        }
        let copy = record.duplicate()?;
        self.records.push(copy);
        self.stats.records_buffered += 1;
        metrics::record_buffered();

        if self.records.len() >= self.config.rows_per_statement() {
            self.flush(false, false)?;
        }
        Ok(())
    }

    /// Flush remaining records, commit, stop the executor and close the
    /// connection.
    ///
    /// The connection is closed even when the flush or the executor failed;
    /// the earlier failure is reported in that case. Only the first call
    /// does anything.
    pub fn close(&mut self) -> Result<(), TaskError> {
        if self.closed {
            debug!("writer already closed; ignoring close");
            return Ok(());
        }
        self.closed = true;

        let finished = self.finish();
        let closed = self.close_connection();
        match (finished, closed) {
            (Err(err), Err(close_err)) => {
                warn!(error = %close_err, "connection close failed after an earlier error");
                Err(err.into())
            }
            (Err(err), Ok(())) => Err(err.into()),
            (Ok(()), closed) => closed.map_err(TaskError::from),
        }
    }

    /// Number of records currently buffered.
    pub fn buffered(&self) -> usize {
        self.records.len()
    }

    /// Whether the executor thread has been started.
    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn stats(&self) -> WriterStats {
        self.stats
    }

    /// Final counters, available once `close` has joined the executor.
    pub fn summary(&self) -> Option<WriterSummary> {
        self.summary
    }

    fn stored_build_failure(&self) -> Option<StowageError> {
        self.build_failure
            .as_ref()
            .map(|source| StowageError::StatementBuild {
                source: Arc::clone(source),
            })
    }

    fn flush(&mut self, commit: bool, stop: bool) -> Result<(), StowageError> {
        if let Some(err) = self.stored_build_failure() {
            return Err(err);
        }
        if !self.started {
            let handle = executor::spawn(
                self.connection.clone(),
                self.config.statements_per_transaction(),
            )?;
            self.executor = Some(handle);
            self.started = true;
        }
        let Some(executor) = self.executor.as_ref() else {
            return Err(StowageError::shutdown("executor has already stopped", None));
        };

        let statement = if self.records.is_empty() {
            None
        } else {
            let built = {
                let mut conn = self.connection.lock()?;
                self.factory.build_statement(&mut conn, &self.records)
            };
            let discarded = self.records.len();
            self.records.clear();
            match built {
                Ok(statement) => Some(statement),
                Err(source) => {
                    let source: SharedError = Arc::from(source);
                    warn!(discarded, error = %source, "statement build failed; batch discarded");
                    self.build_failure = Some(Arc::clone(&source));
                    return Err(StowageError::StatementBuild { source });
                }
            }
        };
        let has_statement = statement.is_some();

        let op = Operation::new(statement, self.factory.is_batched(), commit, stop);
        let waited = Instant::now();
        if let Err(orphan) = executor.submit(op) {
            if let Some(statement) = orphan.into_statement() {
                let mut conn = self.connection.lock_for_close();
                if let Err(err) = conn.release(statement) {
                    warn!(error = %err, "failed to release undelivered statement");
                }
            }
            return Err(StowageError::shutdown(
                "executor is no longer accepting operations",
                None,
            ));
        }
        metrics::record_handoff_wait(waited.elapsed());
        if has_statement {
            self.stats.statements_submitted += 1;
        }

        if let Some(err) = executor.first_error() {
            log_error_chain(&err);
            return Err(err);
        }
        Ok(())
    }

    /// Final flush and executor shutdown.
    fn finish(&mut self) -> Result<(), StowageError> {
        let flushed = self.flush(true, true);
        let Some(executor) = self.executor.take() else {
            return flushed;
        };

        let joined = executor.join();
        if let Ok((stats, _)) = &joined {
            self.summary = Some(WriterSummary::new(self.stats, *stats));
        }
        flushed?;
        let (_, first_error) = joined?;
        match first_error {
            Some(err) => {
                log_error_chain(&err);
                Err(err)
            }
            None => Ok(()),
        }
    }

    fn close_connection(&self) -> Result<(), StowageError> {
        let mut conn = self.connection.lock_for_close();
        conn.close()
            .map_err(|source| StowageError::shutdown("failed to close connection", Some(source)))
    }
}

impl<C, F, R> Drop for AsyncRecordWriter<C, F, R>
where
    C: Connection,
    F: StatementFactory<C, R>,
    R: ExportRecord,
{
    fn drop(&mut self) {
        if !self.closed {
            warn!(
                buffered = self.records.len(),
                "writer dropped without close; buffered records discarded"
            );
        }
    }
}

fn log_error_chain(err: &StowageError) {
    error!(error = %err, "export executor reported a failure");
    let mut cause = err.source();
    while let Some(current) = cause {
        error!(cause = %current, "caused by");
        cause = current.source();
    }
}
