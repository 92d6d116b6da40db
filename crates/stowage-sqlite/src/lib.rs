// SPDX-FileCopyrightText: 2026 Stowage Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite dialect for the Stowage export pipeline.
//!
//! [`SqliteConnection`] keeps an explicit transaction open at all times, so
//! rows only become durable when the writer's executor commits.
//! [`SqliteInsertFactory`] binds buffered records into INSERT statements.

pub mod connection;
pub mod insert;

pub use connection::{SqliteConnection, SqliteConnectionFactory, SqliteOptions, SqliteStatement};
pub use insert::{MAX_BOUND_PARAMETERS, SqliteInsertFactory};
