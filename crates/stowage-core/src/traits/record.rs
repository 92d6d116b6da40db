// SPDX-FileCopyrightText: 2026 Stowage Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Record contract for values accepted by the export writer.

use crate::error::StowageError;
use crate::types::FieldValue;

/// A record that can be buffered by the writer and bound into statements.
///
/// The writer keeps its own duplicate of every record it accepts, so the
/// caller may reuse or mutate the original as soon as `write` returns.
pub trait ExportRecord: Send + Sized + 'static {
    /// Produce an independent copy for buffering.
    ///
    /// Record types that cannot be copied return
    /// [`StowageError::RecordCopy`].
    fn duplicate(&self) -> Result<Self, StowageError>;

    /// Column values in table column order.
    fn field_values(&self) -> Vec<FieldValue>;
}
