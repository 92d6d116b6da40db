// SPDX-FileCopyrightText: 2026 Stowage Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Statement construction contract, implemented once per SQL dialect.

use crate::error::BoxError;
use crate::traits::connection::Connection;
use crate::traits::record::ExportRecord;

/// Converts buffered records into one parameterized statement.
///
/// The writer calls [`build_statement`](StatementFactory::build_statement)
/// on its own thread while holding the connection lock, so implementations
/// may prepare driver-level objects against `connection` freely.
pub trait StatementFactory<C: Connection, R: ExportRecord>: Send {
    /// Build a statement with every parameter bound from `records`.
    ///
    /// `records` is never empty. Implementations must not retain or modify
    /// the records.
    fn build_statement(&self, connection: &mut C, records: &[R]) -> Result<C::Statement, BoxError>;

    /// Whether built statements are executed in batched mode.
    fn is_batched(&self) -> bool {
        false
    }
}
