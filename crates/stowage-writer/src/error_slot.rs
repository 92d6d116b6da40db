// SPDX-FileCopyrightText: 2026 Stowage Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Write-once storage for the first executor failure.

use std::sync::{Arc, OnceLock};

use stowage_core::{BoxError, ExecutionStage, SharedError, StowageError};

/// Holds the first error raised by the executor. Later errors are dropped.
///
/// The stored error is never cleared: every check after a failure reports
/// the same error, so `close` still fails after a flush already surfaced it.
#[derive(Debug, Default)]
pub(crate) struct ErrorSlot {
    first: OnceLock<(ExecutionStage, SharedError)>,
}

impl ErrorSlot {
    /// Store `source` unless an error is already held. Returns whether it was stored.
    pub(crate) fn record(&self, stage: ExecutionStage, source: BoxError) -> bool {
        let shared: SharedError = Arc::from(source);
        self.first.set((stage, shared)).is_ok()
    }

    pub(crate) fn is_set(&self) -> bool {
        self.first.get().is_some()
    }

    /// The stored error, if any.
    pub(crate) fn get(&self) -> Option<StowageError> {
        self.first
            .get()
            .map(|(stage, source)| StowageError::Execution {
                stage: *stage,
                source: Arc::clone(source),
            })
    }
}
