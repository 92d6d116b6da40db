// SPDX-FileCopyrightText: 2026 Stowage Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as positive thresholds, non-empty paths and known log levels.

use crate::diagnostic::ConfigError;
use crate::model::StowageConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &StowageConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.export.rows_per_statement == 0 {
        errors.push(ConfigError::invalid_value(
            "export.rows_per_statement",
            "must be at least 1",
        ));
    }

    if config.export.statements_per_transaction == 0 {
        errors.push(ConfigError::invalid_value(
            "export.statements_per_transaction",
            "must be at least 1",
        ));
    }

    if let Some(table) = &config.export.table {
        if !is_valid_identifier(table) {
            errors.push(ConfigError::invalid_value(
                "export.table",
                format!("`{table}` is not a valid table name"),
            ));
        }
    }

    if config.database.path.trim().is_empty() {
        errors.push(ConfigError::invalid_value("database.path", "must not be empty"));
    }

    let level = config.logging.level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ConfigError::invalid_value(
            "logging.level",
            format!(
                "`{}` is not one of {}",
                config.logging.level,
                LOG_LEVELS.join(", ")
            ),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Whether `name` is usable as an unquoted table or column name.
pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
