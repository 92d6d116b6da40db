// SPDX-FileCopyrightText: 2026 Stowage Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use stowage_core::{ExportRecord, FieldValue, StowageError};

/// A record carrying a single id.
///
/// Records built with [`TestRecord::uncopyable`] refuse to be duplicated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestRecord {
    pub id: u32,
    pub copyable: bool,
}

impl TestRecord {
    pub fn new(id: u32) -> Self {
        Self { id, copyable: true }
    }

    pub fn uncopyable(id: u32) -> Self {
        Self {
            id,
            copyable: false,
        }
    }
}

impl ExportRecord for TestRecord {
    fn duplicate(&self) -> Result<Self, StowageError> {
        if !self.copyable {
            return Err(StowageError::record_copy(format!(
                "record {} cannot be copied",
                self.id
            )));
        }
        Ok(self.clone())
    }

    fn field_values(&self) -> Vec<FieldValue> {
        vec![FieldValue::Integer(i64::from(self.id))]
    }
}
