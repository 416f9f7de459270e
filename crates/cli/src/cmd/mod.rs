mod deploy;
mod info;
mod locate;
mod resolve;

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use clap::ValueEnum;
use tracing::debug;

use addonctl_lib::addon::AddonConfig;
use addonctl_lib::deps::{ExpandOptions, RequiredOverridePolicy};

pub use deploy::cmd_deploy;
pub use info::cmd_info;
pub use locate::cmd_locate;
pub use resolve::cmd_resolve;

/// Command-line spelling of [`RequiredOverridePolicy`].
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OverridePolicyArg {
  #[default]
  Preserve,
  ForceEnable,
  Reject,
}

impl From<OverridePolicyArg> for ExpandOptions {
  fn from(arg: OverridePolicyArg) -> Self {
    let required_override = match arg {
      OverridePolicyArg::Preserve => RequiredOverridePolicy::Preserve,
      OverridePolicyArg::ForceEnable => RequiredOverridePolicy::ForceEnable,
      OverridePolicyArg::Reject => RequiredOverridePolicy::Reject,
    };
    ExpandOptions { required_override }
  }
}

/// Read an addon tree from a JSON file.
fn load_addon(path: &Path) -> Result<AddonConfig> {
  let path = dunce::canonicalize(path).with_context(|| format!("Addon file not found: {}", path.display()))?;
  let content = fs::read_to_string(&path).with_context(|| format!("Failed to read addon file: {}", path.display()))?;
  let addon: AddonConfig =
    serde_json::from_str(&content).with_context(|| format!("Failed to parse addon file: {}", path.display()))?;
  debug!(path = %path.display(), offering = %addon.offering_name, "loaded addon");
  Ok(addon)
}

/// One-line status of a dependency for text output.
fn describe(addon: &AddonConfig) -> String {
  let state = if addon.is_enabled() { "enabled" } else { "disabled" };
  let kind = if addon.is_required() { "required" } else { "optional" };
  if addon.version_locator.is_empty() {
    format!("{} ({}, {})", addon.offering_name, state, kind)
  } else {
    format!("{} {} ({}, {})", addon.offering_name, addon.version_locator, state, kind)
  }
}
