// SPDX-FileCopyrightText: 2026 Stowage Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `stowage export`: stream a CSV file into a SQLite table.

use std::path::PathBuf;

use clap::Args;
use stowage_config::{DatabaseConfig, ExportConfig, StowageConfig};
use stowage_core::{BoxError, ConnectionFactory, Row, StowageError, TaskError};
use stowage_sqlite::{SqliteConnection, SqliteConnectionFactory, SqliteInsertFactory};
use stowage_writer::{AsyncRecordWriter, WriterConfig, WriterSummary};
use thiserror::Error;
use tracing::{info, warn};

/// Arguments of the export subcommand. Unset options fall back to the
/// loaded configuration.
#[derive(Args, Debug, Clone, Default)]
pub struct ExportArgs {
    /// CSV file to read.
    #[arg(long, short)]
    pub input: PathBuf,

    /// Destination table (defaults to `export.table`).
    #[arg(long, short)]
    pub table: Option<String>,

    /// Column names, when the CSV has no header row.
    #[arg(long, value_delimiter = ',')]
    pub columns: Option<Vec<String>>,

    /// Destination database file (defaults to `database.path`).
    #[arg(long)]
    pub database: Option<PathBuf>,

    #[arg(long)]
    pub rows_per_statement: Option<usize>,

    #[arg(long)]
    pub statements_per_transaction: Option<usize>,

    /// Run each statement once per row instead of as one multi-row INSERT.
    #[arg(long)]
    pub batched: bool,

    /// Create the table with untyped columns if it does not exist.
    #[arg(long)]
    pub create_table: bool,
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("no destination table; pass --table or set export.table")]
    MissingTable,

    #[error("failed to read CSV input: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to create table: {0}")]
    Schema(BoxError),

    #[error(transparent)]
    Stowage(#[from] StowageError),

    #[error(transparent)]
    Task(#[from] TaskError),
}

/// Outcome of a successful export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportReport {
    pub rows_read: u64,
    pub summary: WriterSummary,
}

/// Merge command-line overrides over the configured export settings.
pub fn effective_settings(
    args: &ExportArgs,
    config: &StowageConfig,
) -> Result<(String, ExportConfig, DatabaseConfig), ExportError> {
    let mut export = config.export.clone();
    if let Some(rows) = args.rows_per_statement {
        export.rows_per_statement = rows;
    }
    if let Some(statements) = args.statements_per_transaction {
        export.statements_per_transaction = statements;
    }
    if args.batched {
        export.batched = true;
    }

    let table = args
        .table
        .clone()
        .or_else(|| export.table.clone())
        .ok_or(ExportError::MissingTable)?;

    let mut database = config.database.clone();
    if let Some(path) = &args.database {
        database.path = path.display().to_string();
    }
    Ok((table, export, database))
}

pub fn run_export(args: &ExportArgs, config: &StowageConfig) -> Result<ExportReport, ExportError> {
    let (table, export, database) = effective_settings(args, config)?;
    let writer_config = WriterConfig::try_from(&export)?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(args.columns.is_none())
        .from_path(&args.input)?;
    let columns = match &args.columns {
        Some(columns) => columns.clone(),
        None => reader.headers()?.iter().map(str::to_string).collect(),
    };

    let factory = SqliteInsertFactory::new(&table, columns, export.batched)?;
    let connections = SqliteConnectionFactory::from_config(&database);
    let mut connection = connections
        .connect()
        .map_err(|source| StowageError::Connect { source })?;
    if args.create_table {
        connection
            .run_batch(&factory.create_table_sql())
            .map_err(ExportError::Schema)?;
    }

    info!(
        input = %args.input.display(),
        database = %connections.path().display(),
        table = %table,
        rows_per_statement = writer_config.rows_per_statement(),
        statements_per_transaction = writer_config.statements_per_transaction(),
        batched = export.batched,
        "starting export"
    );

    let mut writer = AsyncRecordWriter::new(writer_config, connection, factory);
    let written = write_rows(&mut writer, &mut reader);
    let closed = writer.close();
    let rows_read = match (written, closed) {
        (Ok(rows), Ok(())) => rows,
        (Err(err), closed) => {
            if let Err(close_err) = closed {
                warn!(error = %close_err, "writer close failed after an earlier error");
            }
            return Err(err);
        }
        (Ok(_), Err(err)) => return Err(err.into()),
    };

    let summary = writer.summary().unwrap_or_default();
    info!(
        rows = rows_read,
        statements = summary.statements_executed,
        commits = summary.commits,
        "export complete"
    );
    Ok(ExportReport { rows_read, summary })
}

fn write_rows<R: std::io::Read>(
    writer: &mut AsyncRecordWriter<SqliteConnection, SqliteInsertFactory, Row>,
    reader: &mut csv::Reader<R>,
) -> Result<u64, ExportError> {
    let mut rows = 0u64;
    let mut record = csv::StringRecord::new();
    while reader.read_record(&mut record)? {
        writer.write(&Row::from_cells(record.iter()))?;
        rows += 1;
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(input: PathBuf) -> ExportArgs {
        ExportArgs {
            input,
            ..ExportArgs::default()
        }
    }

    #[test]
    fn command_line_overrides_config() {
        let mut config = StowageConfig::default();
        config.export.table = Some("from_config".into());

        let mut a = args("in.csv".into());
        a.rows_per_statement = Some(7);
        a.batched = true;
        a.database = Some("/tmp/out.db".into());

        let (table, export, database) = effective_settings(&a, &config).unwrap();
        assert_eq!(table, "from_config");
        assert_eq!(export.rows_per_statement, 7);
        assert_eq!(export.statements_per_transaction, 100);
        assert!(export.batched);
        assert_eq!(database.path, "/tmp/out.db");
    }

    #[test]
    fn missing_table_is_an_error() {
        let err = effective_settings(&args("in.csv".into()), &StowageConfig::default())
            .unwrap_err();
        assert!(matches!(err, ExportError::MissingTable));
    }

    #[test]
    fn exports_headed_csv() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("people.csv");
        std::fs::write(&input, "id,name,score\n1,ann,2.5\n2,bob,\n3,cy,7\n").unwrap();

        let mut a = args(input);
        a.table = Some("people".into());
        a.database = Some(dir.path().join("out.db"));
        a.rows_per_statement = Some(2);
        a.create_table = true;

        let report = run_export(&a, &StowageConfig::default()).unwrap();
        assert_eq!(report.rows_read, 3);
        assert_eq!(report.summary.statements_executed, 2);
        assert_eq!(report.summary.rows_written, 3);

        let conn = rusqlite::Connection::open(dir.path().join("out.db")).unwrap();
        let nulls: i64 = conn
            .query_row("SELECT COUNT(*) FROM people WHERE score IS NULL", [], |r| r.get(0))
            .unwrap();
        assert_eq!(nulls, 1);
    }

    #[test]
    fn explicit_columns_treat_first_line_as_data() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("raw.csv");
        std::fs::write(&input, "1,a\n2,b\n").unwrap();

        let mut a = args(input);
        a.table = Some("raw".into());
        a.columns = Some(vec!["id".into(), "tag".into()]);
        a.database = Some(dir.path().join("out.db"));
        a.create_table = true;

        let report = run_export(&a, &StowageConfig::default()).unwrap();
        assert_eq!(report.rows_read, 2);
    }

    #[test]
    fn missing_destination_table_fails() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("people.csv");
        std::fs::write(&input, "id\n1\n").unwrap();

        let mut a = args(input);
        a.table = Some("absent".into());
        a.database = Some(dir.path().join("out.db"));

        let err = run_export(&a, &StowageConfig::default()).unwrap_err();
        match err {
            ExportError::Task(task) => {
                assert!(matches!(task.cause(), StowageError::StatementBuild { .. }));
            }
            other => panic!("expected task error, got {other:?}"),
        }
    }
}
