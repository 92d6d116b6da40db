// SPDX-FileCopyrightText: 2026 Stowage Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Statement factory that records every batch it is asked to build.

use std::sync::{Arc, Mutex, MutexGuard};

use stowage_core::{BoxError, StatementFactory};

use crate::mock_connection::{MockConnection, MockStatement};
use crate::record::TestRecord;

/// Shared view of the batches a [`RecordingFactory`] was handed.
#[derive(Debug, Clone, Default)]
pub struct FactoryProbe {
    builds: Arc<Mutex<Vec<Vec<u32>>>>,
}

impl FactoryProbe {
    fn builds_mut(&self) -> MutexGuard<'_, Vec<Vec<u32>>> {
        self.builds.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Record ids of every build request, in call order (including failed ones).
    pub fn builds(&self) -> Vec<Vec<u32>> {
        self.builds_mut().clone()
    }

    /// Size of every build request, in call order.
    pub fn batch_sizes(&self) -> Vec<usize> {
        self.builds_mut().iter().map(Vec::len).collect()
    }
}

/// Builds [`MockStatement`]s from [`TestRecord`]s.
#[derive(Debug, Default)]
pub struct RecordingFactory {
    probe: FactoryProbe,
    batched: bool,
    fail_on: Option<usize>,
}

impl RecordingFactory {
    pub fn new() -> (Self, FactoryProbe) {
        let factory = Self::default();
        let probe = factory.probe.clone();
        (factory, probe)
    }

    /// Report statements as batched.
    pub fn batched(mut self) -> Self {
        self.batched = true;
        self
    }

    /// Fail the `n`th build (1-based).
    pub fn fail_on_build(mut self, n: usize) -> Self {
        self.fail_on = Some(n);
        self
    }
}

impl StatementFactory<MockConnection, TestRecord> for RecordingFactory {
    fn build_statement(
        &self,
        connection: &mut MockConnection,
        records: &[TestRecord],
    ) -> Result<MockStatement, BoxError> {
        let ids: Vec<u32> = records.iter().map(|r| r.id).collect();
        let ordinal = {
            let mut builds = self.probe.builds_mut();
            builds.push(ids.clone());
            builds.len()
        };
        if self.fail_on == Some(ordinal) {
            return Err(format!("build {ordinal} rejected").into());
        }
        connection.note_build(&ids);
        Ok(MockStatement { ids })
    }

    fn is_batched(&self) -> bool {
        self.batched
    }
}
