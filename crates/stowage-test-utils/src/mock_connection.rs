// SPDX-FileCopyrightText: 2026 Stowage Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock connection for deterministic pipeline testing.
//!
//! `MockConnection` implements `Connection` and records every call in a
//! shared event log that tests inspect through a [`MockProbe`].

use std::sync::mpsc::Receiver;
use std::sync::{Arc, Mutex, MutexGuard};

use stowage_core::{BoxError, Connection};

/// A statement built by [`RecordingFactory`](crate::RecordingFactory).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockStatement {
    /// Ids of the records bound into this statement, in order.
    pub ids: Vec<u32>,
}

/// One call observed by a [`MockConnection`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionEvent {
    /// A statement was built against the connection.
    Built { ids: Vec<u32> },
    /// A statement executed successfully.
    Executed {
        ids: Vec<u32>,
        batched: bool,
        thread: Option<String>,
    },
    /// A statement execution failed.
    ExecuteFailed { ids: Vec<u32> },
    /// A statement was released.
    Released { ids: Vec<u32> },
    /// The transaction was committed.
    Committed,
    /// A commit failed.
    CommitFailed,
    /// The connection was closed (successfully or not).
    Closed,
}

#[derive(Debug, Default)]
struct ProbeState {
    events: Vec<ConnectionEvent>,
}

/// Read-only view of the calls made to a [`MockConnection`].
#[derive(Debug, Clone, Default)]
pub struct MockProbe {
    state: Arc<Mutex<ProbeState>>,
}

impl MockProbe {
    fn state(&self) -> MutexGuard<'_, ProbeState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn push(&self, event: ConnectionEvent) {
        self.state().events.push(event);
    }

    /// Every recorded event, in call order.
    pub fn events(&self) -> Vec<ConnectionEvent> {
        self.state().events.clone()
    }

    /// Record ids of every successfully executed statement, in execution order.
    pub fn executed(&self) -> Vec<Vec<u32>> {
        self.state()
            .events
            .iter()
            .filter_map(|e| match e {
                ConnectionEvent::Executed { ids, .. } => Some(ids.clone()),
                _ => None,
            })
            .collect()
    }

    /// Names of the threads statements were executed on.
    pub fn execution_threads(&self) -> Vec<Option<String>> {
        self.state()
            .events
            .iter()
            .filter_map(|e| match e {
                ConnectionEvent::Executed { thread, .. } => Some(thread.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, matches: impl Fn(&ConnectionEvent) -> bool) -> usize {
        self.state().events.iter().filter(|e| matches(e)).count()
    }

    pub fn commit_count(&self) -> usize {
        self.count(|e| matches!(e, ConnectionEvent::Committed))
    }

    pub fn close_count(&self) -> usize {
        self.count(|e| matches!(e, ConnectionEvent::Closed))
    }

    pub fn release_count(&self) -> usize {
        self.count(|e| matches!(e, ConnectionEvent::Released { .. }))
    }
}

/// A mock database connection.
///
/// Failures are injected by statement or commit ordinal (1-based). A gated
/// connection waits for one permit on its gate before every execution,
/// letting tests hold the executor inside a database call.
#[derive(Debug, Default)]
pub struct MockConnection {
    probe: MockProbe,
    fail_execute_on: Vec<usize>,
    fail_commit_on: Vec<usize>,
    fail_release: bool,
    fail_close: bool,
    gate: Option<Receiver<()>>,
    executions: usize,
    commits: usize,
}

impl MockConnection {
    /// Create a connection and the probe observing it.
    pub fn new() -> (Self, MockProbe) {
        let connection = Self::default();
        let probe = connection.probe.clone();
        (connection, probe)
    }

    /// Fail the `n`th statement execution.
    pub fn fail_execute_on(mut self, n: usize) -> Self {
        self.fail_execute_on.push(n);
        self
    }

    /// Fail the `n`th commit.
    pub fn fail_commit_on(mut self, n: usize) -> Self {
        self.fail_commit_on.push(n);
        self
    }

    /// Fail every statement release.
    pub fn fail_release(mut self) -> Self {
        self.fail_release = true;
        self
    }

    /// Fail the connection close.
    pub fn fail_close(mut self) -> Self {
        self.fail_close = true;
        self
    }

    /// Wait for a permit on `gate` before each execution. A dropped sender
    /// opens the gate for good.
    pub fn gated(mut self, gate: Receiver<()>) -> Self {
        self.gate = Some(gate);
        self
    }

    /// Record a statement build. Called by the mock factory.
    pub fn note_build(&self, ids: &[u32]) {
        self.probe.push(ConnectionEvent::Built { ids: ids.to_vec() });
    }
}

impl Connection for MockConnection {
    type Statement = MockStatement;

    fn execute(&mut self, statement: &mut MockStatement, batched: bool) -> Result<u64, BoxError> {
        if let Some(gate) = &self.gate {
            let _ = gate.recv();
        }
        self.executions += 1;
        if self.fail_execute_on.contains(&self.executions) {
            self.probe.push(ConnectionEvent::ExecuteFailed {
                ids: statement.ids.clone(),
            });
            return Err(format!("execution {} rejected", self.executions).into());
        }
        self.probe.push(ConnectionEvent::Executed {
            ids: statement.ids.clone(),
            batched,
            thread: std::thread::current().name().map(str::to_string),
        });
        Ok(statement.ids.len() as u64)
    }

    fn release(&mut self, statement: MockStatement) -> Result<(), BoxError> {
        self.probe.push(ConnectionEvent::Released { ids: statement.ids });
        if self.fail_release {
            return Err("statement release rejected".into());
        }
        Ok(())
    }

    fn commit(&mut self) -> Result<(), BoxError> {
        self.commits += 1;
        if self.fail_commit_on.contains(&self.commits) {
            self.probe.push(ConnectionEvent::CommitFailed);
            return Err(format!("commit {} rejected", self.commits).into());
        }
        self.probe.push(ConnectionEvent::Committed);
        Ok(())
    }

    fn close(&mut self) -> Result<(), BoxError> {
        self.probe.push(ConnectionEvent::Closed);
        if self.fail_close {
            return Err("close rejected".into());
        }
        Ok(())
    }
}
