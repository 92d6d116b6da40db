// SPDX-FileCopyrightText: 2026 Stowage Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Asynchronous batched record writer.
//!
//! Records are buffered on the producer thread, bound into statements by a
//! [`StatementFactory`](stowage_core::StatementFactory), and handed one at a
//! time to a dedicated executor thread that runs them against the shared
//! connection and commits every `statements_per_transaction` statements.
//!
//! The handoff has no slack: a producer that outpaces the database blocks
//! until the executor has taken the previous operation. An executor failure
//! is recorded once and surfaces on the producer's next flush or on close.

pub mod config;
mod connection;
mod error_slot;
mod executor;
mod handoff;
pub mod metrics;
pub mod operation;
pub mod writer;

pub use config::WriterConfig;
pub use executor::{EXECUTOR_THREAD_NAME, ExecutorStats};
pub use operation::Operation;
pub use writer::{AsyncRecordWriter, WriterStats, WriterSummary};
