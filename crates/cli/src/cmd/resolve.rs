//! Implementation of the `addonctl resolve` command.
//!
//! Expands the addon's dependency tree against the catalog without deploying
//! anything, and lists the unique set of dependencies a deployment would carry.

use std::path::Path;

use anyhow::{Context, Result};

use addonctl_lib::catalog::{CatalogClient, CatalogLocator, LocatorResolver, SemverMatcher};
use addonctl_lib::config::Settings;
use addonctl_lib::deploy::resolve_tree;
use addonctl_lib::deps::{DependencyGraph, ExpandOptions, flatten_sorted};

use super::{OverridePolicyArg, describe, load_addon};
use crate::output::{self, OutputFormat, print_json, print_stat, print_success, print_warning};

pub fn cmd_resolve(
  settings: &Settings,
  file: &Path,
  policy: OverridePolicyArg,
  verbose: bool,
  output: OutputFormat,
) -> Result<()> {
  let mut root = load_addon(file)?;

  let token = settings.token()?;
  let catalog = CatalogClient::new(&settings.catalog_url, token.clone(), settings.timeout())?;
  let locator = CatalogLocator::new(
    CatalogClient::new(&settings.catalog_url, token, settings.timeout())?,
    SemverMatcher,
  );
  let options = ExpandOptions::from(policy);

  let report = resolve_tree(&mut root, &catalog, Some(&locator as &dyn LocatorResolver), &options)
    .with_context(|| format!("Failed to resolve dependencies of {}", root.offering_name))?;
  let dependencies = flatten_sorted(&root);
  let graph = DependencyGraph::from_tree(&root);
  let cycles = graph.cycles();
  let order = graph.deploy_order().ok();

  if output.is_json() {
    let conflicts: Vec<_> = report
      .conflicts
      .iter()
      .map(|c| {
        serde_json::json!({
          "offering_name": c.offering_name,
          "version_locator": c.version_locator,
          "required_by": c.required_by,
          "enabled": c.enabled,
        })
      })
      .collect();
    print_json(&serde_json::json!({
      "root": root,
      "dependencies": dependencies,
      "visited": report.visited,
      "added": report.added,
      "conflicts": conflicts,
      "cycles": cycles,
      "deploy_order": order,
    }))?;
    return Ok(());
  }

  print_success(&format!("Resolved {} {}", root.offering_name, root.version_locator));
  print_stat("Dependencies", &dependencies.len().to_string());
  print_stat(
    "Enabled",
    &dependencies.iter().filter(|d| d.is_enabled()).count().to_string(),
  );
  print_stat("Catalog lookups", &report.visited.to_string());

  if !dependencies.is_empty() {
    println!();
    for dependency in &dependencies {
      println!("  {} {}", output::symbols::INFO, describe(dependency));
      if verbose && !dependency.required_by.is_empty() {
        println!("      required by {}", dependency.required_by.join(", "));
      }
    }
  }

  if verbose && let Some(order) = &order {
    println!();
    println!("Deploy order:");
    for (position, locator) in order.iter().enumerate() {
      println!("  {}. {}", position + 1, locator);
    }
  }

  for cycle in &cycles {
    print_warning(&format!("Dependency cycle: {}", cycle.join(" <-> ")));
  }

  for conflict in &report.conflicts {
    print_warning(&format!(
      "{} is required by {} but was disabled (now {})",
      conflict.offering_name,
      conflict.required_by,
      if conflict.enabled { "enabled" } else { "disabled" }
    ));
  }

  Ok(())
}
