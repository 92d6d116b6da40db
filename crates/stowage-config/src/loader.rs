// SPDX-FileCopyrightText: 2026 Stowage Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! A [`ConfigSource`] names where the TOML comes from. The standard lookup
//! layers `./stowage.toml` > `~/.config/stowage/stowage.toml` >
//! `/etc/stowage/stowage.toml`; an explicit file replaces that lookup. Both
//! take `STOWAGE_*` environment overrides. Inline TOML is used as given.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::StowageConfig;

const FILE_NAME: &str = "stowage.toml";
const SYSTEM_PATH: &str = "/etc/stowage/stowage.toml";

/// Where configuration is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource<'a> {
    /// System, user and local files, then environment overrides.
    Standard,
    /// One file chosen by the operator, then environment overrides.
    File(&'a Path),
    /// A TOML document held in memory. No files, no environment.
    Inline(&'a str),
}

impl<'a> ConfigSource<'a> {
    /// `--config <path>` when given, the standard lookup otherwise.
    pub fn from_override(path: Option<&'a Path>) -> Self {
        match path {
            Some(path) => ConfigSource::File(path),
            None => ConfigSource::Standard,
        }
    }

    /// Build the figment for this source, compiled defaults first.
    ///
    /// Merge order for [`ConfigSource::Standard`] (later overrides earlier):
    /// 1. Compiled defaults
    /// 2. `/etc/stowage/stowage.toml` (system-wide)
    /// 3. `~/.config/stowage/stowage.toml` (user XDG config)
    /// 4. `./stowage.toml` (local directory)
    /// 5. `STOWAGE_*` environment variables
    pub fn figment(&self) -> Figment {
        let defaults = Figment::new().merge(Serialized::defaults(StowageConfig::default()));
        match self {
            ConfigSource::Standard => defaults
                .merge(Toml::file(SYSTEM_PATH))
                .merge(Toml::file(user_config_path().unwrap_or_default()))
                .merge(Toml::file(FILE_NAME))
                .merge(env_provider()),
            ConfigSource::File(path) => defaults.merge(Toml::file(path)).merge(env_provider()),
            ConfigSource::Inline(content) => defaults.merge(Toml::string(content)),
        }
    }

    /// TOML documents this source reads, as `(display path, content)`,
    /// highest precedence first. Files that cannot be read are skipped.
    pub fn documents(&self) -> Vec<(String, String)> {
        match self {
            ConfigSource::Standard => {
                let local = std::env::current_dir()
                    .map(|d| d.join(FILE_NAME))
                    .unwrap_or_else(|_| PathBuf::from(FILE_NAME));
                [Some(local), user_config_path(), Some(PathBuf::from(SYSTEM_PATH))]
                    .into_iter()
                    .flatten()
                    .filter_map(|path| read_document(&path))
                    .collect()
            }
            ConfigSource::File(path) => read_document(path).into_iter().collect(),
            ConfigSource::Inline(content) => vec![("<inline>".to_string(), content.to_string())],
        }
    }
}

/// Extract a configuration from `source` without validating it.
pub fn load_config(source: ConfigSource<'_>) -> Result<StowageConfig, figment::Error> {
    source.figment().extract()
}

/// Render a configuration as pretty TOML.
pub fn render_toml(config: &StowageConfig) -> Result<String, toml::ser::Error> {
    toml::to_string_pretty(config)
}

fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("stowage").join(FILE_NAME))
}

fn read_document(path: &Path) -> Option<(String, String)> {
    std::fs::read_to_string(path)
        .ok()
        .map(|content| (path.display().to_string(), content))
}

/// Environment provider with explicit section-to-dot mapping.
///
/// `Env::split("_")` would turn `STOWAGE_EXPORT_ROWS_PER_STATEMENT` into
/// `export.rows.per.statement`; only the first underscore after the section
/// name is a separator.
fn env_provider() -> Env {
    Env::prefixed("STOWAGE_").map(|key| {
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("export_", "export.", 1)
            .replacen("database_", "database.", 1)
            .replacen("logging_", "logging.", 1);
        mapped.into()
    })
}
