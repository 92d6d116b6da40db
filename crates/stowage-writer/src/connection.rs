// SPDX-FileCopyrightText: 2026 Stowage Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use stowage_core::{Connection, StowageError};

/// Connection shared by the producer (statement building) and the executor
/// (execution and commit). All access is serialized by one mutex.
pub(crate) struct SharedConnection<C> {
    inner: Arc<Mutex<C>>,
}

impl<C: Connection> SharedConnection<C> {
    pub(crate) fn new(connection: C) -> Self {
        Self {
            inner: Arc::new(Mutex::new(connection)),
        }
    }

    /// Lock the connection. A poisoned lock means a panic happened mid-call,
    /// so the connection state is unknown.
    pub(crate) fn lock(&self) -> Result<MutexGuard<'_, C>, StowageError> {
        self.inner
            .lock()
            .map_err(|_| StowageError::Internal("connection lock poisoned".into()))
    }

    /// Lock the connection for closing, ignoring poisoning.
    pub(crate) fn lock_for_close(&self) -> MutexGuard<'_, C> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<C> Clone for SharedConnection<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}
