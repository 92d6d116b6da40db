// SPDX-FileCopyrightText: 2026 Stowage Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Writer thresholds.

use stowage_config::ExportConfig;
use stowage_config::model::{DEFAULT_ROWS_PER_STATEMENT, DEFAULT_STATEMENTS_PER_TRANSACTION};
use stowage_core::StowageError;

/// Flush and commit thresholds for an [`AsyncRecordWriter`](crate::AsyncRecordWriter).
///
/// Both thresholds are at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriterConfig {
    rows_per_statement: usize,
    statements_per_transaction: usize,
}

impl WriterConfig {
    /// Create a config, rejecting zero thresholds.
    pub fn new(
        rows_per_statement: usize,
        statements_per_transaction: usize,
    ) -> Result<Self, StowageError> {
        if rows_per_statement == 0 {
            return Err(StowageError::Config(
                "rows_per_statement must be at least 1".into(),
            ));
        }
        if statements_per_transaction == 0 {
            return Err(StowageError::Config(
                "statements_per_transaction must be at least 1".into(),
            ));
        }
        Ok(Self {
            rows_per_statement,
            statements_per_transaction,
        })
    }

    /// Records buffered before a statement is built and submitted.
    pub fn rows_per_statement(&self) -> usize {
        self.rows_per_statement
    }

    /// Statements executed before the executor commits.
    pub fn statements_per_transaction(&self) -> usize {
        self.statements_per_transaction
    }
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            rows_per_statement: DEFAULT_ROWS_PER_STATEMENT,
            statements_per_transaction: DEFAULT_STATEMENTS_PER_TRANSACTION,
        }
    }
}

impl TryFrom<&ExportConfig> for WriterConfig {
    type Error = StowageError;

    fn try_from(config: &ExportConfig) -> Result<Self, Self::Error> {
        Self::new(config.rows_per_statement, config.statements_per_transaction)
    }
}
