//! Dependency tree expansion.
//!
//! Expands an [`AddonConfig`] tree in place from the catalog's declared
//! dependency references.
//!
//! # Algorithm Overview
//!
//! Nodes are processed from an explicit worklist of child-index paths, depth
//! first and in catalog order. For each node:
//!
//! 1. Skip it if its version locator was already visited (cycles and diamonds collapse)
//! 2. Fetch its required and optional references
//! 3. Merge required references into same-named children, or queue new children
//! 4. Merge optional references not already satisfied by a required one
//! 5. Append the queued children, then schedule matched and new children
//!
//! Nothing is removed from the tree, and mutations already applied are kept
//! when a lookup fails part way through.

use std::collections::HashSet;

use thiserror::Error;
use tracing::{debug, info, trace, warn};

use crate::addon::AddonConfig;
use crate::catalog::{ComponentReferenceGetter, OfferingReferenceItem};

/// What to do when the catalog requires a dependency the caller disabled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RequiredOverridePolicy {
  /// Keep the caller's `enabled = false` and report the conflict.
  #[default]
  Preserve,
  /// Enable the dependency anyway and report the conflict.
  ForceEnable,
  /// Fail expansion with [`ExpandError::RequiredDisabled`].
  Reject,
}

#[derive(Debug, Clone, Default)]
pub struct ExpandOptions {
  pub required_override: RequiredOverridePolicy,
}

/// A required dependency that the caller had switched off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverrideConflict {
  pub offering_name: String,
  pub version_locator: String,
  /// Offering that requires it.
  pub required_by: String,
  /// Enablement after the policy was applied.
  pub enabled: bool,
}

/// Summary of one expansion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpandReport {
  /// Locators whose references were fetched.
  pub visited: usize,
  /// Dependencies synthesized from catalog references.
  pub added: usize,
  pub conflicts: Vec<OverrideConflict>,
}

/// Errors that can occur during expansion.
#[derive(Debug, Error)]
pub enum ExpandError {
  /// The root has no version locator to start from.
  #[error("addon '{offering}' has no version locator")]
  MissingLocator { offering: String },

  /// Fetching an offering's references failed.
  #[error("failed to get component references for '{locator}': {source}")]
  References {
    locator: String,
    #[source]
    source: Box<dyn std::error::Error + Send + Sync>,
  },

  /// A required dependency was explicitly disabled under [`RequiredOverridePolicy::Reject`].
  #[error("dependency '{offering}' is required by '{required_by}' but was explicitly disabled")]
  RequiredDisabled { offering: String, required_by: String },
}

/// Expand `root` in place.
///
/// `visited` holds locators already processed and is extended as nodes are
/// expanded; a locator already present is skipped. `disabled_offerings` names
/// offerings the caller turned off elsewhere in the tree and is only read, to
/// detect conflicts with catalog-required dependencies.
///
/// # Errors
///
/// Returns [`ExpandError`] if:
/// - The root has no version locator
/// - A reference lookup fails at any depth (wrapped with the failing locator)
/// - A required dependency is disabled and the policy is [`RequiredOverridePolicy::Reject`]
pub fn expand<G>(
  root: &mut AddonConfig,
  visited: &mut HashSet<String>,
  disabled_offerings: &HashSet<String>,
  getter: &G,
  options: &ExpandOptions,
) -> Result<ExpandReport, ExpandError>
where
  G: ComponentReferenceGetter + ?Sized,
{
  if root.version_locator.is_empty() {
    return Err(ExpandError::MissingLocator {
      offering: root.offering_name.clone(),
    });
  }

  info!(offering = %root.offering_name, locator = %root.version_locator, "expanding dependencies");

  let mut report = ExpandReport::default();
  let mut worklist: Vec<Vec<usize>> = vec![Vec::new()];

  while let Some(path) = worklist.pop() {
    let Some(node) = root.node_at_mut(&path) else {
      continue;
    };

    if node.version_locator.is_empty() {
      warn!(offering = %node.offering_name, "dependency has no version locator, not expanding");
      continue;
    }

    if !visited.insert(node.version_locator.clone()) {
      trace!(locator = %node.version_locator, "already visited");
      continue;
    }

    let references = getter
      .get_component_references(&node.version_locator)
      .map_err(|e| ExpandError::References {
        locator: node.version_locator.clone(),
        source: Box::new(e),
      })?;
    report.visited += 1;

    debug!(
      offering = %node.offering_name,
      locator = %node.version_locator,
      required = references.required.len(),
      optional = references.optional.len(),
      "fetched references"
    );

    let parent = node.offering_name.clone();
    let mut scheduled: Vec<usize> = Vec::new();
    let mut queued: Vec<AddonConfig> = Vec::new();
    let mut required_names: HashSet<&str> = HashSet::new();

    for item in &references.required {
      required_names.insert(item.name.as_str());

      if let Some(index) = node.dependency_index(&item.name) {
        let child = &mut node.dependencies[index];
        merge_required(child, item, &parent, options.required_override, &mut report)?;
        if !scheduled.contains(&index) {
          scheduled.push(index);
        }
      } else if !queued.iter().any(|q| q.offering_name == item.name) {
        let mut child = AddonConfig::from_required_reference(item, &parent);
        if disabled_offerings.contains(&item.name) {
          resolve_conflict(&mut child, &parent, options.required_override, &mut report)?;
        }
        queued.push(child);
      }
    }

    for item in &references.optional {
      if required_names.contains(item.name.as_str()) {
        trace!(name = %item.name, "optional reference already required");
        continue;
      }

      if let Some(index) = node.dependency_index(&item.name) {
        merge_optional(&mut node.dependencies[index], item);
        if !scheduled.contains(&index) {
          scheduled.push(index);
        }
      } else if !queued.iter().any(|q| q.offering_name == item.name) {
        if disabled_offerings.contains(&item.name) {
          debug!(name = %item.name, "optional dependency was disabled elsewhere in the tree");
        }
        queued.push(AddonConfig::from_optional_reference(item));
      }
    }

    report.added += queued.len();
    let first_new = node.dependencies.len();
    node.dependencies.extend(queued);
    scheduled.extend(first_new..node.dependencies.len());

    for index in scheduled.into_iter().rev() {
      let mut child_path = path.clone();
      child_path.push(index);
      worklist.push(child_path);
    }
  }

  info!(
    visited = report.visited,
    added = report.added,
    conflicts = report.conflicts.len(),
    "dependency expansion complete"
  );

  Ok(report)
}

/// Merge a required reference into an existing child.
///
/// Caller-set `enabled` and `on_by_default` survive; an unset `enabled`
/// becomes `true` because required dependencies cannot be omitted.
fn merge_required(
  child: &mut AddonConfig,
  item: &OfferingReferenceItem,
  parent: &str,
  policy: RequiredOverridePolicy,
  report: &mut ExpandReport,
) -> Result<(), ExpandError> {
  let detail = &item.offering_reference;
  child.version_locator = detail.version_locator.clone();
  child.resolved_version = detail.version.clone();
  fill_identity(child, item);
  child.is_required = Some(true);
  child.add_required_by(parent);
  if child.on_by_default.is_none() {
    child.on_by_default = Some(detail.on_by_default);
  }

  match child.enabled {
    None => child.enabled = Some(true),
    Some(true) => {}
    Some(false) => resolve_conflict(child, parent, policy, report)?,
  }
  Ok(())
}

/// Merge an optional reference into an existing child without touching caller flags.
fn merge_optional(child: &mut AddonConfig, item: &OfferingReferenceItem) {
  let detail = &item.offering_reference;
  child.version_locator = detail.version_locator.clone();
  child.resolved_version = detail.version.clone();
  child.offering_flavor = detail.flavor.name.clone();
  child.offering_label = detail.label.clone();
  fill_identity(child, item);
  if child.on_by_default.is_none() {
    child.on_by_default = Some(detail.on_by_default);
  }
  if child.is_required.is_none() {
    child.is_required = Some(false);
  }
}

/// Populate identity fields the caller left blank.
fn fill_identity(child: &mut AddonConfig, item: &OfferingReferenceItem) {
  let detail = &item.offering_reference;
  if child.offering_id.is_empty() {
    child.offering_id = detail.id.clone();
  }
  if child.catalog_id.is_empty() {
    child.catalog_id = detail.catalog_id.clone();
  }
  if child.offering_flavor.is_empty() {
    child.offering_flavor = detail.flavor.name.clone();
  }
  if child.offering_label.is_empty() {
    child.offering_label = detail.label.clone();
  }
}

fn resolve_conflict(
  child: &mut AddonConfig,
  parent: &str,
  policy: RequiredOverridePolicy,
  report: &mut ExpandReport,
) -> Result<(), ExpandError> {
  let enabled = match policy {
    RequiredOverridePolicy::Reject => {
      return Err(ExpandError::RequiredDisabled {
        offering: child.offering_name.clone(),
        required_by: parent.to_string(),
      });
    }
    RequiredOverridePolicy::Preserve => false,
    RequiredOverridePolicy::ForceEnable => true,
  };

  warn!(
    offering = %child.offering_name,
    required_by = %parent,
    enabled,
    "required dependency was explicitly disabled"
  );

  child.enabled = Some(enabled);
  report.conflicts.push(OverrideConflict {
    offering_name: child.offering_name.clone(),
    version_locator: child.version_locator.clone(),
    required_by: parent.to_string(),
    enabled,
  });
  Ok(())
}
