// SPDX-FileCopyrightText: 2026 Stowage Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Metric registration and recording helpers.
//!
//! Uses the metrics-rs facade; without an installed recorder every call is
//! a no-op.

use std::time::Duration;

use metrics::{describe_counter, describe_histogram};
use stowage_core::ExecutionStage;

/// Register all writer metric descriptions.
///
/// Called once at startup after the recorder is installed.
pub fn register_metrics() {
    describe_counter!(
        "stowage_records_buffered_total",
        "Records copied into writer buffers"
    );
    describe_counter!(
        "stowage_statements_executed_total",
        "Statements executed by writer executors"
    );
    describe_counter!(
        "stowage_rows_written_total",
        "Rows reported affected by executed statements"
    );
    describe_counter!("stowage_commits_total", "Transactions committed");
    describe_counter!(
        "stowage_executor_failures_total",
        "Executor failures by stage"
    );
    describe_histogram!(
        "stowage_handoff_wait_seconds",
        "Time the producer waited for the executor to accept an operation"
    );
}

pub(crate) fn record_buffered() {
    metrics::counter!("stowage_records_buffered_total").increment(1);
}

pub(crate) fn record_statement(batched: bool, rows: u64) {
    let mode = if batched { "batched" } else { "single" };
    metrics::counter!("stowage_statements_executed_total", "mode" => mode).increment(1);
    metrics::counter!("stowage_rows_written_total").increment(rows);
}

pub(crate) fn record_commit() {
    metrics::counter!("stowage_commits_total").increment(1);
}

pub(crate) fn record_failure(stage: ExecutionStage) {
    let stage: &'static str = stage.into();
    metrics::counter!("stowage_executor_failures_total", "stage" => stage).increment(1);
}

pub(crate) fn record_handoff_wait(waited: Duration) {
    metrics::histogram!("stowage_handoff_wait_seconds").record(waited.as_secs_f64());
}
