/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Editor preferences loaded from TOML.

use std::path::{Path, PathBuf};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::history::DEFAULT_HISTORY_CAPACITY;
use crate::store::DEFAULT_PASTE_MAP_CAPACITY;

/// ```toml
/// history_capacity = 256
/// paste_map_capacity = 512
/// default_document = "/home/me/graphs/scratch.graph"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EditorConfig {
    /// Maximum history length, the `NewCanvas` sentinel included.
    pub history_capacity: usize,
    /// Maximum number of originals a single paste can remap.
    pub paste_map_capacity: usize,
    /// Document used when a command names none.
    pub default_document: Option<PathBuf>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            paste_map_capacity: DEFAULT_PASTE_MAP_CAPACITY,
            default_document: None,
        }
    }
}

impl EditorConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.history_capacity < 2 {
            return Err(ConfigError::Invalid(format!(
                "history_capacity must be at least 2, got {}",
                self.history_capacity
            )));
        }
        if self.paste_map_capacity == 0 {
            return Err(ConfigError::Invalid(
                "paste_map_capacity must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("Failed to read {}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    /// Load `path`, falling back to defaults when the file does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!("config: {} not found, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load_from(path)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// `<config dir>/nodeshell/config.toml`, when the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        let mut path = dirs::config_dir()?;
        path.push("nodeshell");
        path.push("config.toml");
        Some(path)
    }
}

/// Errors from reading editor preferences
#[derive(Debug)]
pub enum ConfigError {
    Io(String),
    Parse(String),
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {e}"),
            ConfigError::Parse(e) => write!(f, "Parse error: {e}"),
            ConfigError::Invalid(e) => write!(f, "Invalid config: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}
