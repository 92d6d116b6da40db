// SPDX-FileCopyrightText: 2026 Stowage Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Collaborator traits for the export pipeline.
//!
//! The writer only reaches the database through these seams: a connection
//! factory, the connection itself, and a per-dialect statement factory.

pub mod connection;
pub mod record;
pub mod statement;

pub use connection::{Connection, ConnectionFactory};
pub use record::ExportRecord;
pub use statement::StatementFactory;
