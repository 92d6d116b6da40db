// SPDX-FileCopyrightText: 2026 Stowage Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Figment-to-miette error bridge with fuzzy match suggestions.
//!
//! Deserialization errors from figment and the semantic errors from
//! [`validate_config`](crate::validation::validate_config) both end up as
//! [`ConfigError`] diagnostics. Wherever the offending key can be found in a
//! TOML document, the diagnostic carries that document and a span on the key.

#![allow(unused_assignments)] // miette's Diagnostic derive generates code triggering this lint

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Minimum Jaro-Winkler similarity score to suggest a correction.
/// `rows_per_statment` and `batchd` clear it; unrelated words do not.
const SUGGESTION_THRESHOLD: f64 = 0.75;

/// A configuration error with rich diagnostic information.
///
/// Span and source fields are `None` when the value came from the
/// environment or from compiled defaults.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    /// An unknown key was found in the configuration.
    #[error("unknown configuration key `{key}`")]
    #[diagnostic(
        code(stowage::config::unknown_key),
        help("{}", format_unknown_key_help(suggestion.as_deref(), valid_keys))
    )]
    UnknownKey {
        /// The unrecognized key name.
        key: String,
        /// Closest valid key, if any is similar enough.
        suggestion: Option<String>,
        /// Comma-separated keys accepted by the section.
        valid_keys: String,
        /// Span of the unknown key.
        #[label("this key is not recognized")]
        span: Option<SourceSpan>,
        /// Document the key was read from.
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// A configuration value has the wrong type.
    #[error("invalid type for key `{key}`: {detail}")]
    #[diagnostic(code(stowage::config::invalid_type), help("expected {expected}"))]
    InvalidType {
        /// Dotted path of the key, e.g. `export.rows_per_statement`.
        key: String,
        /// What was found and what was expected.
        detail: String,
        expected: String,
        #[label("wrong type here")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// A required configuration key is missing.
    #[error("missing required key `{key}`")]
    #[diagnostic(
        code(stowage::config::missing_key),
        help("add `{key} = <value>` to stowage.toml or pass it as STOWAGE_<SECTION>_<KEY>")
    )]
    MissingKey {
        /// The missing key name.
        key: String,
    },

    /// A value that parsed but cannot drive an export.
    #[error("invalid value for `{key}`: {message}")]
    #[diagnostic(code(stowage::config::validation))]
    Validation {
        /// Dotted path of the rejected key.
        key: String,
        message: String,
        #[label("rejected value")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// Catch-all for other configuration errors.
    #[error("configuration error: {0}")]
    #[diagnostic(code(stowage::config::other))]
    Other(String),
}

impl ConfigError {
    /// A validation error for `key` with no source location yet.
    pub fn invalid_value(key: &str, message: impl Into<String>) -> Self {
        ConfigError::Validation {
            key: key.to_string(),
            message: message.into(),
            span: None,
            src: None,
        }
    }
}

fn format_unknown_key_help(suggestion: Option<&str>, valid_keys: &str) -> String {
    match suggestion {
        Some(s) => format!("did you mean `{s}`? Valid keys: {valid_keys}"),
        None => format!("valid keys: {valid_keys}"),
    }
}

/// Convert a `figment::Error` into a list of `ConfigError` diagnostics.
pub fn figment_to_config_errors(
    err: figment::Error,
    toml_sources: &[(String, String)],
) -> Vec<ConfigError> {
    use figment::error::Kind;

    let mut errors = Vec::new();

    for error in err {
        let config_error = match &error.kind {
            Kind::UnknownField(field, expected) => {
                let valid_keys: Vec<&str> = expected.to_vec();
                let suggestion = suggest_key(field, &valid_keys);
                let section: Vec<String> = error.path.iter().map(|s| s.to_string()).collect();
                let (span, src) = find_source_span(&error, &section, field, toml_sources);

                ConfigError::UnknownKey {
                    key: field.clone(),
                    suggestion,
                    valid_keys: valid_keys.join(", "),
                    span,
                    src,
                }
            }
            Kind::MissingField(field) => ConfigError::MissingKey {
                key: field.clone().into_owned(),
            },
            Kind::InvalidType(actual, expected) => {
                let path: Vec<String> = error.path.iter().map(|s| s.to_string()).collect();
                let (span, src) = match path.split_last() {
                    Some((field, section)) => find_source_span(&error, section, field, toml_sources),
                    None => (None, None),
                };
                ConfigError::InvalidType {
                    key: path.join("."),
                    detail: format!("found {actual}, expected {expected}"),
                    expected: expected.to_string(),
                    span,
                    src,
                }
            }
            _ => ConfigError::Other(format!("{error}")),
        };

        errors.push(config_error);
    }

    errors
}

/// Point validation errors at the document that set the rejected key.
///
/// `toml_sources` must be ordered highest precedence first; the first
/// document containing the key wins. Errors whose key appears in no document
/// are left without a span.
pub fn locate_validation_errors(errors: &mut [ConfigError], toml_sources: &[(String, String)]) {
    for error in errors {
        let ConfigError::Validation { key, span, src, .. } = error else {
            continue;
        };
        let path: Vec<String> = key.split('.').map(str::to_string).collect();
        let Some((field, section)) = path.split_last() else {
            continue;
        };
        let found = toml_sources.iter().find_map(|(name, content)| {
            find_key_offset(content, section, field).map(|offset| (name, content, offset))
        });
        if let Some((name, content, offset)) = found {
            *span = Some(SourceSpan::new(offset.into(), field.len()));
            *src = Some(NamedSource::new(name, content.clone()));
        }
    }
}

fn find_source_span(
    error: &figment::error::Error,
    section: &[String],
    field: &str,
    toml_sources: &[(String, String)],
) -> (Option<SourceSpan>, Option<NamedSource<String>>) {
    let source_path = error
        .metadata
        .as_ref()
        .and_then(|m| m.source.as_ref())
        .and_then(|s| match s {
            figment::Source::File(path) => Some(path.display().to_string()),
            _ => None,
        });

    // Inline strings have no file source; fall back to the only source given.
    let source = match source_path {
        Some(path) => toml_sources.iter().find(|(p, _)| *p == path),
        None if toml_sources.len() == 1 => toml_sources.first(),
        None => None,
    };

    if let Some((path, content)) = source {
        if let Some(offset) = find_key_offset(content, section, field) {
            let span = SourceSpan::new(offset.into(), field.len());
            let named = NamedSource::new(path, content.clone());
            return (Some(span), Some(named));
        }
    }

    (None, None)
}

/// Find the byte offset of a key in TOML content, relative to a section path.
///
/// For `path = ["export"]` and `field = "rows_per_statment"`, finds the
/// `[export]` header then searches for the key after it.
pub fn find_key_offset(content: &str, path: &[String], field: &str) -> Option<usize> {
    let search_start = match path.first() {
        None => 0,
        Some(section) => {
            let header = format!("[{section}]");
            content.find(&header).map(|pos| pos + header.len())?
        }
    };

    let remaining = &content[search_start..];
    let mut byte_offset = 0;
    for line in remaining.split_inclusive('\n') {
        let trimmed = line.trim_start();
        if let Some(after) = trimmed.strip_prefix(field) {
            if after.starts_with([' ', '=', '\t']) {
                let field_start_in_line = line.len() - trimmed.len();
                return Some(search_start + byte_offset + field_start_in_line);
            }
        }
        byte_offset += line.len();
    }

    None
}

/// Suggest a similar key name using Jaro-Winkler string similarity.
pub fn suggest_key(unknown: &str, valid_keys: &[&str]) -> Option<String> {
    let mut best_score = SUGGESTION_THRESHOLD;
    let mut best_match = None;

    for &key in valid_keys {
        let score = strsim::jaro_winkler(unknown, key);
        if score > best_score {
            best_score = score;
            best_match = Some(key.to_string());
        }
    }

    best_match
}

/// Render a list of `ConfigError`s to stderr using miette's graphical handler.
pub fn render_errors(errors: &[ConfigError]) {
    use miette::GraphicalReportHandler;

    let handler = GraphicalReportHandler::new();
    for error in errors {
        let mut buf = String::new();
        let diagnostic: &dyn Diagnostic = error;
        if handler.render_report(&mut buf, diagnostic).is_ok() {
            eprint!("{buf}");
        } else {
            eprintln!("Error: {error}");
        }
    }
}
