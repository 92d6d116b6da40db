// SPDX-FileCopyrightText: 2026 Stowage Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Record values shared between record producers and statement factories.

use crate::error::StowageError;
use crate::traits::ExportRecord;

/// A single column value bound into a statement parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl FieldValue {
    /// Infer a typed value from a text cell.
    ///
    /// Empty cells become `Null`. A cell becomes an integer or a real only
    /// when the number prints back as exactly the same text, so `007`, `+5`,
    /// `1.50` and `1e3` stay text.
    pub fn infer(cell: &str) -> Self {
        if cell.is_empty() {
            return FieldValue::Null;
        }
        if let Ok(i) = cell.parse::<i64>() {
            if i.to_string() == cell {
                return FieldValue::Integer(i);
            }
            return FieldValue::Text(cell.to_string());
        }
        match cell.parse::<f64>() {
            Ok(f) if f.is_finite() && f.to_string() == cell => FieldValue::Real(f),
            _ => FieldValue::Text(cell.to_string()),
        }
    }
}

/// A plain row of column values in table column order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row(pub Vec<FieldValue>);

impl Row {
    /// Build a row from text cells, inferring each value's type.
    pub fn from_cells<'a>(cells: impl IntoIterator<Item = &'a str>) -> Self {
        Row(cells.into_iter().map(FieldValue::infer).collect())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl ExportRecord for Row {
    fn duplicate(&self) -> Result<Self, StowageError> {
        Ok(self.clone())
    }

    fn field_values(&self) -> Vec<FieldValue> {
        self.0.clone()
    }
}
