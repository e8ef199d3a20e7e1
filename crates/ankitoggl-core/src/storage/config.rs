//! TOML-based application configuration.
//!
//! Stores the Toggl credentials and sync settings:
//! - API token, workspace and project identifiers
//! - Time entry description
//! - IANA timezone name
//! - Path to the Anki collection database
//!
//! Configuration is stored at `~/.config/ankitoggl/config.toml`.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::data_dir;
use crate::timezone::{is_valid_timezone, Timezone};
use crate::toggl::EntrySpec;

pub const DEFAULT_DESCRIPTION: &str = "Anki Review Session";
pub const DEFAULT_TIMEZONE: &str = "UTC";

// Validation limits, shared with the CLI `config set` path.
pub const MIN_DESCRIPTION_LENGTH: usize = 1;
pub const MAX_DESCRIPTION_LENGTH: usize = 100;
pub const MIN_API_TOKEN_LENGTH: usize = 10;
pub const MAX_API_TOKEN_LENGTH: usize = 200;

/// Configuration-specific errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    #[error("Missing required configuration key: {0}")]
    MissingKey(String),
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/ankitoggl/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api_token: String,
    #[serde(default)]
    pub workspace_id: i64,
    #[serde(default)]
    pub project_id: i64,
    #[serde(default = "default_description")]
    pub description: String,
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// Path to the Anki collection database (collection.anki2).
    #[serde(default)]
    pub collection_path: String,
}

fn default_description() -> String {
    DEFAULT_DESCRIPTION.to_string()
}
fn default_timezone() -> String {
    DEFAULT_TIMEZONE.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_token: String::new(),
            workspace_id: 0,
            project_id: 0,
            description: default_description(),
            timezone: default_timezone(),
            collection_path: String::new(),
        }
    }
}

impl Config {
    fn path() -> Result<PathBuf, std::io::Error> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk or return default (persisting it for next time).
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path().map_err(|e| ConfigError::LoadFailed {
            path: PathBuf::from("~/.config/ankitoggl/config.toml"),
            message: e.to_string(),
        })?;
        match std::fs::read_to_string(&path) {
            Ok(content) => toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                path,
                message: e.to_string(),
            }),
            Err(_) => {
                let cfg = Self::default();
                cfg.save()?;
                Ok(cfg)
            }
        }
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::path().map_err(|e| ConfigError::SaveFailed {
            path: PathBuf::from("~/.config/ankitoggl/config.toml"),
            message: e.to_string(),
        })?;
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        std::fs::write(&path, content).map_err(|e| ConfigError::SaveFailed {
            path,
            message: e.to_string(),
        })
    }

    /// Check every field against its validation rule.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_token.trim().is_empty() {
            return Err(ConfigError::MissingKey("api_token".to_string()));
        }
        let token_len = self.api_token.trim().len();
        if !(MIN_API_TOKEN_LENGTH..=MAX_API_TOKEN_LENGTH).contains(&token_len) {
            return Err(ConfigError::InvalidValue {
                key: "api_token".to_string(),
                message: format!(
                    "token must be between {MIN_API_TOKEN_LENGTH} and {MAX_API_TOKEN_LENGTH} characters"
                ),
            });
        }
        if self.workspace_id <= 0 {
            return Err(ConfigError::InvalidValue {
                key: "workspace_id".to_string(),
                message: "must be a positive integer".to_string(),
            });
        }
        if self.project_id <= 0 {
            return Err(ConfigError::InvalidValue {
                key: "project_id".to_string(),
                message: "must be a positive integer".to_string(),
            });
        }
        if !(MIN_DESCRIPTION_LENGTH..=MAX_DESCRIPTION_LENGTH).contains(&self.description.len()) {
            return Err(ConfigError::InvalidValue {
                key: "description".to_string(),
                message: format!(
                    "must be between {MIN_DESCRIPTION_LENGTH} and {MAX_DESCRIPTION_LENGTH} characters"
                ),
            });
        }
        if !is_valid_timezone(&self.timezone) {
            return Err(ConfigError::InvalidValue {
                key: "timezone".to_string(),
                message: format!("'{}' is not an IANA timezone", self.timezone),
            });
        }
        Ok(())
    }

    /// Whether the minimum credentials for a sync are present.
    pub fn is_configured(&self) -> bool {
        !self.api_token.trim().is_empty() && self.workspace_id > 0 && self.project_id > 0
    }

    /// The (workspace, project, description) tuple a sync targets.
    pub fn entry_spec(&self) -> EntrySpec {
        EntrySpec {
            workspace_id: self.workspace_id,
            project_id: self.project_id,
            description: self.description.clone(),
        }
    }

    /// The configured timezone, validated.
    pub fn resolve_timezone(&self) -> Result<Timezone, ConfigError> {
        Timezone::new(&self.timezone).map_err(|e| ConfigError::InvalidValue {
            key: "timezone".to_string(),
            message: e.to_string(),
        })
    }
}

/// Mask a token for logging: first and last four characters only.
pub fn mask_token(token: &str) -> String {
    if token.is_empty() {
        return String::new();
    }
    if token.len() <= 4 {
        "***".to_string()
    } else if token.len() <= 8 {
        format!("{}***", &token[..2])
    } else {
        format!("{}***{}", &token[..4], &token[token.len() - 4..])
    }
}
