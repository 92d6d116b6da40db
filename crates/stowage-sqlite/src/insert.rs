// SPDX-FileCopyrightText: 2026 Stowage Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! INSERT statement factory.

use rusqlite::types::Value;
use stowage_config::validation::is_valid_identifier;
use stowage_core::{BoxError, ExportRecord, FieldValue, StatementFactory, StowageError};

use crate::connection::{SqliteConnection, SqliteStatement};

/// Highest number of `?` parameters SQLite accepts in one statement.
pub const MAX_BOUND_PARAMETERS: usize = 32_766;

/// Builds INSERT statements for a fixed table and column list.
#[derive(Debug, Clone)]
pub struct SqliteInsertFactory {
    table: String,
    columns: Vec<String>,
    batched: bool,
}

impl SqliteInsertFactory {
    pub fn new(
        table: impl Into<String>,
        columns: Vec<String>,
        batched: bool,
    ) -> Result<Self, StowageError> {
        let table = table.into();
        if !is_valid_identifier(&table) {
            return Err(StowageError::Config(format!(
                "invalid table name `{table}`"
            )));
        }
        if columns.is_empty() {
            return Err(StowageError::Config(format!(
                "no columns given for table `{table}`"
            )));
        }
        if let Some(bad) = columns.iter().find(|c| !is_valid_identifier(c)) {
            return Err(StowageError::Config(format!("invalid column name `{bad}`")));
        }
        Ok(Self {
            table,
            columns,
            batched,
        })
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// `CREATE TABLE IF NOT EXISTS` for the target table with untyped columns.
    pub fn create_table_sql(&self) -> String {
        let columns: Vec<String> = self.columns.iter().map(|c| quote(c)).collect();
        format!(
            "CREATE TABLE IF NOT EXISTS {} ({});",
            quote(&self.table),
            columns.join(", ")
        )
    }

    /// INSERT covering `rows` rows of placeholders.
    pub fn insert_sql(&self, rows: usize) -> String {
        let columns: Vec<String> = self.columns.iter().map(|c| quote(c)).collect();
        let tuple = format!("({})", vec!["?"; self.columns.len()].join(", "));
        format!(
            "INSERT INTO {} ({}) VALUES {}",
            quote(&self.table),
            columns.join(", "),
            vec![tuple.as_str(); rows].join(", ")
        )
    }
}

impl<R: ExportRecord> StatementFactory<SqliteConnection, R> for SqliteInsertFactory {
    fn build_statement(
        &self,
        connection: &mut SqliteConnection,
        records: &[R],
    ) -> Result<SqliteStatement, BoxError> {
        let width = self.columns.len();
        if !self.batched && records.len() * width > MAX_BOUND_PARAMETERS {
            return Err(format!(
                "{} records of {width} fields exceed the {MAX_BOUND_PARAMETERS} parameter limit; \
                 lower rows_per_statement or use batched mode",
                records.len()
            )
            .into());
        }

        let mut rows = Vec::with_capacity(records.len());
        for (index, record) in records.iter().enumerate() {
            let values = record.field_values();
            if values.len() != width {
                return Err(format!(
                    "record {index} has {} fields but table `{}` has {width} columns",
                    values.len(),
                    self.table
                )
                .into());
            }
            rows.push(values.into_iter().map(to_value).collect());
        }

        let sql = self.insert_sql(if self.batched { 1 } else { records.len() });
        connection.prepare_cached(&sql)?;
        Ok(SqliteStatement { sql, rows })
    }

    fn is_batched(&self) -> bool {
        self.batched
    }
}

fn quote(identifier: &str) -> String {
    format!("\"{}\"", identifier.replace('"', "\"\""))
}

fn to_value(field: FieldValue) -> Value {
    match field {
        FieldValue::Null => Value::Null,
        FieldValue::Integer(i) => Value::Integer(i),
        FieldValue::Real(f) => Value::Real(f),
        FieldValue::Text(s) => Value::Text(s),
        FieldValue::Blob(b) => Value::Blob(b),
    }
}

#[cfg(test)]
mod tests {
    use stowage_core::Row;

    use super::*;

    fn factory(batched: bool) -> SqliteInsertFactory {
        SqliteInsertFactory::new("people", vec!["id".into(), "name".into()], batched).unwrap()
    }

    fn connection() -> SqliteConnection {
        let mut conn = SqliteConnection::open_in_memory().unwrap();
        conn.run_batch(&factory(false).create_table_sql()).unwrap();
        conn
    }

    fn row(id: &str, name: &str) -> Row {
        Row::from_cells([id, name])
    }

    #[test]
    fn insert_sql_repeats_placeholder_tuples() {
        assert_eq!(
            factory(false).insert_sql(2),
            r#"INSERT INTO "people" ("id", "name") VALUES (?, ?), (?, ?)"#
        );
    }

    #[test]
    fn rejects_invalid_identifiers() {
        assert!(SqliteInsertFactory::new("drop table", vec!["a".into()], false).is_err());
        assert!(SqliteInsertFactory::new("t", vec![], false).is_err());
        assert!(SqliteInsertFactory::new("t", vec!["a;b".into()], false).is_err());
    }

    #[test]
    fn single_mode_binds_all_rows_into_one_statement() {
        let mut conn = connection();
        let stmt = factory(false)
            .build_statement(&mut conn, &[row("1", "ann"), row("2", "")])
            .unwrap();

        assert_eq!(stmt.sql, factory(false).insert_sql(2));
        assert_eq!(
            stmt.rows,
            vec![
                vec![Value::Integer(1), Value::Text("ann".into())],
                vec![Value::Integer(2), Value::Null],
            ]
        );
    }

    #[test]
    fn batched_mode_uses_single_row_statement() {
        let mut conn = connection();
        let f = factory(true);
        let stmt = f
            .build_statement(&mut conn, &[row("1", "a"), row("2", "b"), row("3", "c")])
            .unwrap();

        assert_eq!(stmt.sql, f.insert_sql(1));
        assert_eq!(stmt.rows.len(), 3);
        assert!(StatementFactory::<SqliteConnection, Row>::is_batched(&f));
    }

    #[test]
    fn field_count_mismatch_is_rejected() {
        let mut conn = connection();
        let err = factory(false)
            .build_statement(&mut conn, &[Row::from_cells(["1"])])
            .unwrap_err();
        assert!(err.to_string().contains("has 1 fields"));
    }

    #[test]
    fn missing_table_fails_at_build_time() {
        let mut conn = SqliteConnection::open_in_memory().unwrap();
        assert!(factory(false).build_statement(&mut conn, &[row("1", "a")]).is_err());
    }

    #[test]
    fn single_mode_respects_parameter_limit() {
        let mut conn = connection();
        let records: Vec<Row> = (0..(MAX_BOUND_PARAMETERS / 2 + 1))
            .map(|i| row(&i.to_string(), "x"))
            .collect();
        let err = factory(false).build_statement(&mut conn, &records).unwrap_err();
        assert!(err.to_string().contains("parameter limit"));
    }
}
