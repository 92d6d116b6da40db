// SPDX-FileCopyrightText: 2026 Stowage Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Stowage export pipeline.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Default number of records bound into one statement.
pub const DEFAULT_ROWS_PER_STATEMENT: usize = 100;

/// Default number of statements executed per transaction.
pub const DEFAULT_STATEMENTS_PER_TRANSACTION: usize = 100;

/// Top-level Stowage configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StowageConfig {
    /// Export writer tuning.
    #[serde(default)]
    pub export: ExportConfig,

    /// Destination database settings.
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Export writer configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ExportConfig {
    /// Records bound into each INSERT statement.
    #[serde(default = "default_rows_per_statement")]
    pub rows_per_statement: usize,

    /// Statements executed before the transaction is committed.
    #[serde(default = "default_statements_per_transaction")]
    pub statements_per_transaction: usize,

    /// Execute statements in batched mode (one bound row per repetition)
    /// instead of one multi-row statement.
    #[serde(default)]
    pub batched: bool,

    /// Default destination table when none is given on the command line.
    #[serde(default)]
    pub table: Option<String>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            rows_per_statement: default_rows_per_statement(),
            statements_per_transaction: default_statements_per_transaction(),
            batched: false,
            table: None,
        }
    }
}

fn default_rows_per_statement() -> usize {
    DEFAULT_ROWS_PER_STATEMENT
}

fn default_statements_per_transaction() -> usize {
    DEFAULT_STATEMENTS_PER_TRANSACTION
}

/// Destination database configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,

    /// How long a statement waits on a locked database, in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
            wal_mode: default_wal_mode(),
            busy_timeout_ms: default_busy_timeout_ms(),
        }
    }
}

fn default_database_path() -> String {
    "stowage.db".to_string()
}

fn default_wal_mode() -> bool {
    true
}

fn default_busy_timeout_ms() -> u64 {
    5000
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
