//! Implementation of the `addonctl locate` command.

use anyhow::{Context, Result};

use addonctl_lib::catalog::{CatalogClient, SemverMatcher, resolve_version_locator};
use addonctl_lib::config::Settings;

use crate::output::{OutputFormat, print_json, print_stat, print_success};

pub fn cmd_locate(
  settings: &Settings,
  catalog_id: &str,
  offering_id: &str,
  constraint: &str,
  flavor: &str,
  output: OutputFormat,
) -> Result<()> {
  let client = CatalogClient::new(&settings.catalog_url, settings.token()?, settings.timeout())?;

  let resolved = resolve_version_locator(&client, &SemverMatcher, catalog_id, offering_id, constraint, flavor)
    .with_context(|| format!("Failed to locate {} {}", offering_id, constraint))?;

  if output.is_json() {
    print_json(&serde_json::json!({
      "catalog_id": catalog_id,
      "offering_id": offering_id,
      "flavor": flavor,
      "version": resolved.version,
      "version_locator": resolved.version_locator,
    }))?;
  } else {
    print_success(&format!("{} {} ({})", offering_id, resolved.version, flavor));
    print_stat("Locator", &resolved.version_locator);
  }

  Ok(())
}
