// SPDX-FileCopyrightText: 2026 Stowage Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite connection with PRAGMA setup and manual transactions.

use std::path::{Path, PathBuf};
use std::time::Duration;

use rusqlite::params_from_iter;
use rusqlite::types::Value;
use stowage_config::DatabaseConfig;
use stowage_core::{BoxError, Connection, ConnectionFactory};
use tracing::debug;

/// Connection settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqliteOptions {
    pub wal_mode: bool,
    pub busy_timeout: Duration,
}

impl Default for SqliteOptions {
    fn default() -> Self {
        Self {
            wal_mode: true,
            busy_timeout: Duration::from_millis(5000),
        }
    }
}

/// An INSERT with every parameter bound.
///
/// In batched mode `sql` holds one row of placeholders and is run once per
/// entry of `rows`; otherwise `sql` covers every row and runs once.
#[derive(Debug, Clone, PartialEq)]
pub struct SqliteStatement {
    pub sql: String,
    pub rows: Vec<Vec<Value>>,
}

/// A SQLite connection that is always inside a transaction.
pub struct SqliteConnection {
    conn: Option<rusqlite::Connection>,
}

impl SqliteConnection {
    /// Open `path`, apply `options` and begin the first transaction.
    pub fn open(path: impl AsRef<Path>, options: &SqliteOptions) -> Result<Self, rusqlite::Error> {
        let conn = rusqlite::Connection::open(path.as_ref())?;
        if options.wal_mode {
            conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        }
        conn.busy_timeout(options.busy_timeout)?;
        conn.execute_batch("BEGIN;")?;
        debug!(path = %path.as_ref().display(), wal = options.wal_mode, "SQLite connection opened");
        Ok(Self { conn: Some(conn) })
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> Result<Self, rusqlite::Error> {
        let conn = rusqlite::Connection::open_in_memory()?;
        conn.execute_batch("BEGIN;")?;
        Ok(Self { conn: Some(conn) })
    }

    /// The underlying handle, until the connection is closed.
    pub fn raw(&self) -> Option<&rusqlite::Connection> {
        self.conn.as_ref()
    }

    fn handle(&self) -> Result<&rusqlite::Connection, BoxError> {
        self.conn.as_ref().ok_or_else(|| "connection is closed".into())
    }

    /// Run one or more SQL statements inside the current transaction.
    pub fn run_batch(&mut self, sql: &str) -> Result<(), BoxError> {
        self.handle()?.execute_batch(sql)?;
        Ok(())
    }

    /// Compile `sql` into the statement cache, surfacing syntax and schema
    /// errors before execution.
    pub fn prepare_cached(&self, sql: &str) -> Result<(), BoxError> {
        self.handle()?.prepare_cached(sql)?;
        Ok(())
    }
}

impl Connection for SqliteConnection {
    type Statement = SqliteStatement;

    fn execute(&mut self, statement: &mut SqliteStatement, batched: bool) -> Result<u64, BoxError> {
        let conn = self.handle()?;
        let mut stmt = conn.prepare_cached(&statement.sql)?;
        if batched {
            let mut affected = 0u64;
            for row in &statement.rows {
                affected += stmt.execute(params_from_iter(row.iter()))? as u64;
            }
            Ok(affected)
        } else {
            let affected = stmt.execute(params_from_iter(statement.rows.iter().flatten()))?;
            Ok(affected as u64)
        }
    }

    fn release(&mut self, statement: SqliteStatement) -> Result<(), BoxError> {
        // Compiled statements stay in the connection cache; the bound values go.
        drop(statement);
        Ok(())
    }

    fn commit(&mut self) -> Result<(), BoxError> {
        self.handle()?.execute_batch("COMMIT; BEGIN;")?;
        Ok(())
    }

    fn close(&mut self) -> Result<(), BoxError> {
        let conn = self.conn.take().ok_or("connection is already closed")?;
        conn.close().map_err(|(_, e)| e)?;
        debug!("SQLite connection closed");
        Ok(())
    }
}

/// Opens [`SqliteConnection`]s for one database file.
#[derive(Debug, Clone)]
pub struct SqliteConnectionFactory {
    path: PathBuf,
    options: SqliteOptions,
}

impl SqliteConnectionFactory {
    pub fn new(path: impl Into<PathBuf>, options: SqliteOptions) -> Self {
        Self {
            path: path.into(),
            options,
        }
    }

    pub fn from_config(config: &DatabaseConfig) -> Self {
        Self::new(
            &config.path,
            SqliteOptions {
                wal_mode: config.wal_mode,
                busy_timeout: Duration::from_millis(config.busy_timeout_ms),
            },
        )
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConnectionFactory for SqliteConnectionFactory {
    type Connection = SqliteConnection;

    fn connect(&self) -> Result<SqliteConnection, BoxError> {
        Ok(SqliteConnection::open(&self.path, &self.options)?)
    }
}
