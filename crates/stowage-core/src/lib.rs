// SPDX-FileCopyrightText: 2026 Stowage Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Stowage export pipeline.
//!
//! This crate provides the error types, record values and collaborator
//! traits shared by the writer, the dialect crates and the CLI.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::{BoxError, ExecutionStage, SharedError, StowageError, TaskError};
pub use traits::{Connection, ConnectionFactory, ExportRecord, StatementFactory};
pub use types::{FieldValue, Row};
