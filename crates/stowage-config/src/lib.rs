// SPDX-FileCopyrightText: 2026 Stowage Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for the Stowage export pipeline.
//!
//! Provides TOML configuration parsing with strict validation (`deny_unknown_fields`),
//! XDG file hierarchy lookup, environment variable overrides, and diagnostic
//! error rendering with typo suggestions.
//!
//! # Usage
//!
//! ```no_run
//! use stowage_config::{ConfigSource, load_and_validate};
//!
//! let config = load_and_validate(ConfigSource::Standard).expect("config errors");
//! println!("rows per statement: {}", config.export.rows_per_statement);
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

pub use diagnostic::{ConfigError, render_errors};
pub use loader::{ConfigSource, load_config, render_toml};
pub use model::{DatabaseConfig, ExportConfig, LoggingConfig, StowageConfig};

/// Load configuration from `source` and validate it.
///
/// Every error is returned, each pointing into the TOML document that
/// caused it when one can be found.
pub fn load_and_validate(source: ConfigSource<'_>) -> Result<StowageConfig, Vec<ConfigError>> {
    match loader::load_config(source) {
        Ok(config) => match validation::validate_config(&config) {
            Ok(()) => Ok(config),
            Err(mut errors) => {
                diagnostic::locate_validation_errors(&mut errors, &source.documents());
                Err(errors)
            }
        },
        Err(err) => Err(diagnostic::figment_to_config_errors(err, &source.documents())),
    }
}
