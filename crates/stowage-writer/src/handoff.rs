// SPDX-FileCopyrightText: 2026 Stowage Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Zero-capacity handoff between the producer and the executor.
//!
//! `put` returns only once the executor has taken the operation, so at most
//! one operation is ever in flight beyond the one being executed.

use std::sync::mpsc::{self, Receiver, SendError, SyncSender};

use crate::operation::Operation;

pub(crate) struct HandoffSender<S> {
    tx: SyncSender<Operation<S>>,
}

pub(crate) struct HandoffReceiver<S> {
    rx: Receiver<Operation<S>>,
}

/// Create a rendezvous handoff.
pub(crate) fn channel<S>() -> (HandoffSender<S>, HandoffReceiver<S>) {
    let (tx, rx) = mpsc::sync_channel(0);
    (HandoffSender { tx }, HandoffReceiver { rx })
}

impl<S> HandoffSender<S> {
    /// Block until the receiver takes `op`.
    ///
    /// Returns the operation back if the receiver is gone.
    pub(crate) fn put(&self, op: Operation<S>) -> Result<(), Operation<S>> {
        self.tx.send(op).map_err(|SendError(op)| op)
    }
}

impl<S> HandoffReceiver<S> {
    /// Block until an operation arrives. `None` once every sender is dropped.
    pub(crate) fn take(&self) -> Option<Operation<S>> {
        self.rx.recv().ok()
    }
}
