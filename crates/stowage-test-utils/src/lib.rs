// SPDX-FileCopyrightText: 2026 Stowage Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Stowage pipeline tests.
//!
//! Provides mock collaborators for fast, deterministic tests without a
//! real database.
//!
//! # Components
//!
//! - [`MockConnection`] - connection recording every call, with injectable failures
//! - [`RecordingFactory`] - statement factory recording the records of every build
//! - [`TestRecord`] - record whose duplication can be made to fail

pub mod mock_connection;
pub mod mock_factory;
pub mod record;

pub use mock_connection::{ConnectionEvent, MockConnection, MockProbe, MockStatement};
pub use mock_factory::{FactoryProbe, RecordingFactory};
pub use record::TestRecord;
