//! Deployment request and response types.

use serde::{Deserialize, Serialize};

use crate::consts::CONTAINER_SUFFIX;

/// One configuration in a deployment request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployRequestEntry {
  pub version_locator: String,
  pub name: String,
  /// Existing configuration to bind instead of creating a new one.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub config_id: Option<String>,
}

/// A configuration created or bound by a deployment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployedConfig {
  pub name: String,
  pub config_id: String,
}

impl DeployedConfig {
  /// Name of the configuration this container belongs to, if this entry is a container.
  pub fn container_of(&self) -> Option<&str> {
    self.name.strip_suffix(CONTAINER_SUFFIX)
  }
}

/// Result of a deployment request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployedAddonsDetails {
  #[serde(default)]
  pub project_id: String,
  #[serde(default)]
  pub configs: Vec<DeployedConfig>,
}
