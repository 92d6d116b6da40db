// SPDX-FileCopyrightText: 2026 Stowage Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection contract used by the export pipeline.

use crate::error::BoxError;

/// A single database connection with auto-commit disabled.
///
/// Implementations need not be safe for concurrent use. The writer wraps the
/// connection in a mutex and every caller, producer or executor, holds that
/// lock for the duration of each call.
pub trait Connection: Send + 'static {
    /// A prepared, fully bound statement produced by a statement factory.
    type Statement: Send + 'static;

    /// Execute a statement and return the number of affected rows.
    ///
    /// With `batched` set the statement is run once per bound parameter set;
    /// otherwise it is run once as a single statement.
    fn execute(&mut self, statement: &mut Self::Statement, batched: bool) -> Result<u64, BoxError>;

    /// Release driver resources held by a statement.
    fn release(&mut self, statement: Self::Statement) -> Result<(), BoxError>;

    /// Commit the current transaction and start the next one.
    fn commit(&mut self) -> Result<(), BoxError>;

    /// Close the connection. Called exactly once by the writer.
    fn close(&mut self) -> Result<(), BoxError>;
}

/// Opens connections for writers.
pub trait ConnectionFactory {
    type Connection: Connection;

    /// Open a connection with auto-commit disabled.
    fn connect(&self) -> Result<Self::Connection, BoxError>;
}
