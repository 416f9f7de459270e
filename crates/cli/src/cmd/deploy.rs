//! Implementation of the `addonctl deploy` command.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use addonctl_lib::catalog::{CatalogClient, CatalogLocator, SemverMatcher};
use addonctl_lib::config::Settings;
use addonctl_lib::deploy::{Deployer, ProjectsClient};

use super::{OverridePolicyArg, load_addon};
use crate::output::{OutputFormat, print_json, print_stat, print_success, print_warning};

/// Execute the deploy command.
///
/// Resolves the addon's tree, submits the root and its enabled dependencies to
/// `project_id` and prints the configuration ids the project reports. With
/// `save`, the tree (including the back-filled ids) is written as JSON.
pub fn cmd_deploy(
  settings: &Settings,
  file: &Path,
  project_id: &str,
  policy: OverridePolicyArg,
  save: Option<&Path>,
  output: OutputFormat,
) -> Result<()> {
  let mut root = load_addon(file)?;

  let token = settings.token()?;
  let catalog = CatalogClient::new(&settings.catalog_url, token.clone(), settings.timeout())?;
  let locator = CatalogLocator::new(
    CatalogClient::new(&settings.catalog_url, token.clone(), settings.timeout())?,
    SemverMatcher,
  );
  let projects = ProjectsClient::new(&settings.projects_url, token, settings.timeout())?;

  let mut deployer = Deployer::new(catalog, projects)
    .with_locator(locator)
    .with_options(policy.into());

  let details = deployer
    .deploy(&mut root, project_id)
    .with_context(|| format!("Failed to deploy {} to project {}", root.offering_name, project_id))?;

  if let Some(path) = save {
    let json = serde_json::to_string_pretty(&root).context("Failed to serialize addon tree")?;
    fs::write(path, json).with_context(|| format!("Failed to write addon tree: {}", path.display()))?;
    info!(path = %path.display(), "addon tree saved");
  }

  if output.is_json() {
    print_json(&serde_json::json!({
      "project_id": project_id,
      "configs": details.as_ref().map(|d| d.configs.clone()).unwrap_or_default(),
      "addon": root,
    }))?;
    return Ok(());
  }

  match details {
    Some(details) => {
      print_success(&format!(
        "Deployed {} configuration(s) to project {}",
        details.configs.len(),
        project_id
      ));
      for config in &details.configs {
        print_stat(&config.name, &config.config_id);
      }
    }
    None => print_warning(&format!("Project {} reported no configurations", project_id)),
  }

  Ok(())
}
