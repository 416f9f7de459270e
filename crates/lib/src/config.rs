//! Settings for the catalog and project APIs.
//!
//! Settings come from three layers, later ones winning:
//! 1. `config.json` in the application config directory, if present
//! 2. `ADDONCTL_*` environment variables
//! 3. Explicit overrides applied by the caller (CLI flags)
//!
//! # File Format
//!
//! ```json
//! {
//!   "catalog_url": "https://catalog.example.com/api/v1-beta",
//!   "projects_url": "https://projects.example.com",
//!   "api_token": "...",
//!   "timeout_secs": 60
//! }
//! ```

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::auth::StaticToken;
use crate::consts::{
  DEFAULT_CATALOG_URL, DEFAULT_PROJECTS_URL, DEFAULT_TIMEOUT_SECS, ENV_API_TOKEN, ENV_CATALOG_URL, ENV_PROJECTS_URL,
  ENV_TIMEOUT_SECS,
};
use crate::platform::paths::config_file;

/// Errors that can occur while loading settings.
#[derive(Debug, Error)]
pub enum ConfigError {
  /// Failed to read the settings file.
  #[error("failed to read settings file '{path}': {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  /// Failed to parse the settings file JSON.
  #[error("failed to parse settings file '{path}': {source}")]
  Parse {
    path: PathBuf,
    #[source]
    source: serde_json::Error,
  },

  /// An environment variable held an unusable value.
  #[error("invalid value '{value}' for {var}")]
  InvalidEnv { var: &'static str, value: String },

  /// The operation needs an API token and none was configured.
  #[error("no API token configured (set {ENV_API_TOKEN} or api_token in the settings file)")]
  MissingToken,
}

/// Effective API settings.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
  pub catalog_url: String,
  pub projects_url: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub api_token: Option<String>,
  pub timeout_secs: u64,
}

impl Default for Settings {
  fn default() -> Self {
    Self {
      catalog_url: DEFAULT_CATALOG_URL.to_string(),
      projects_url: DEFAULT_PROJECTS_URL.to_string(),
      api_token: None,
      timeout_secs: DEFAULT_TIMEOUT_SECS,
    }
  }
}

impl fmt::Debug for Settings {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Settings")
      .field("catalog_url", &self.catalog_url)
      .field("projects_url", &self.projects_url)
      .field("api_token", &self.api_token.as_ref().map(|_| "<redacted>"))
      .field("timeout_secs", &self.timeout_secs)
      .finish()
  }
}

impl Settings {
  /// Load the settings file from the config directory, then apply the environment.
  pub fn load() -> Result<Self, ConfigError> {
    let mut settings = match config_file() {
      Some(path) => Self::from_file(&path)?.unwrap_or_default(),
      None => {
        debug!("no config directory, using defaults");
        Self::default()
      }
    };
    settings.apply_env()?;
    Ok(settings)
  }

  /// Load settings from `path`.
  ///
  /// Returns `Ok(None)` if the file doesn't exist.
  pub fn from_file(path: &Path) -> Result<Option<Self>, ConfigError> {
    let content = match fs::read_to_string(path) {
      Ok(content) => content,
      Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
      Err(source) => {
        return Err(ConfigError::Read {
          path: path.to_path_buf(),
          source,
        });
      }
    };

    let settings = serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
      path: path.to_path_buf(),
      source,
    })?;
    debug!(path = %path.display(), "loaded settings file");
    Ok(Some(settings))
  }

  /// Override fields from `ADDONCTL_*` environment variables.
  ///
  /// Empty variables are ignored.
  pub fn apply_env(&mut self) -> Result<(), ConfigError> {
    if let Some(url) = env_value(ENV_CATALOG_URL) {
      self.catalog_url = url;
    }
    if let Some(url) = env_value(ENV_PROJECTS_URL) {
      self.projects_url = url;
    }
    if let Some(token) = env_value(ENV_API_TOKEN) {
      self.api_token = Some(token);
    }
    if let Some(value) = env_value(ENV_TIMEOUT_SECS) {
      self.timeout_secs = value.parse().map_err(|_| ConfigError::InvalidEnv {
        var: ENV_TIMEOUT_SECS,
        value,
      })?;
    }
    Ok(())
  }

  pub fn timeout(&self) -> Duration {
    Duration::from_secs(self.timeout_secs)
  }

  /// The configured token, for commands that contact the APIs.
  pub fn token(&self) -> Result<StaticToken, ConfigError> {
    match self.api_token.as_deref() {
      Some(token) if !token.is_empty() => Ok(StaticToken::new(token)),
      _ => Err(ConfigError::MissingToken),
    }
  }
}

fn env_value(var: &str) -> Option<String> {
  std::env::var(var).ok().filter(|v| !v.is_empty())
}
