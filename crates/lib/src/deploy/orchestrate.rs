//! Deployment orchestration.
//!
//! Takes a root addon through the full flow:
//! 1. Resolve the root's version locator if the caller only gave a constraint
//! 2. Expand the dependency tree and apply the disabled-offering policy
//! 3. Build one flat request from the root and one entry per deployable dependency locator
//! 4. Submit it and correlate the returned configuration ids back onto the tree

use std::collections::{HashMap, HashSet};

use thiserror::Error;
use tracing::{debug, info, warn};

use super::client::{DeploymentSubmitter, SubmitError};
use super::types::{DeployRequestEntry, DeployedAddonsDetails};
use crate::addon::AddonConfig;
use crate::catalog::{ComponentReferenceGetter, LocatorError, LocatorResolver};
use crate::consts::CONFIG_NAME_SUFFIX_LEN;
use crate::deps::{ExpandError, ExpandOptions, ExpandReport, apply_disabled_offerings, collect_disabled_offerings, expand};

/// Errors that can occur during deployment.
#[derive(Debug, Error)]
pub enum DeployError {
  /// The root has neither a version locator nor a way to resolve one.
  #[error("addon '{offering}' has no version locator and no version constraint to resolve one")]
  MissingLocator { offering: String },

  #[error(transparent)]
  Locator(#[from] LocatorError),

  #[error(transparent)]
  Expand(#[from] ExpandError),

  #[error(transparent)]
  Submit(#[from] SubmitError),
}

/// Outcome of matching deployment results to tree nodes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CorrelationReport {
  /// Response entries that matched at least one node.
  pub matched: usize,
  /// Names of response entries that matched nothing.
  pub unmatched: Vec<String>,
}

/// Drives resolution and deployment of addon trees.
pub struct Deployer<G, S> {
  getter: G,
  submitter: S,
  locator: Option<Box<dyn LocatorResolver>>,
  options: ExpandOptions,
  rng: fastrand::Rng,
}

impl<G, S> Deployer<G, S>
where
  G: ComponentReferenceGetter,
  S: DeploymentSubmitter,
{
  pub fn new(getter: G, submitter: S) -> Self {
    Self {
      getter,
      submitter,
      locator: None,
      options: ExpandOptions::default(),
      rng: fastrand::Rng::new(),
    }
  }

  /// Resolve a root's locator from its version constraint when it has none.
  pub fn with_locator(mut self, locator: impl LocatorResolver + 'static) -> Self {
    self.locator = Some(Box::new(locator));
    self
  }

  pub fn with_options(mut self, options: ExpandOptions) -> Self {
    self.options = options;
    self
  }

  /// Use `rng` for configuration name suffixes.
  pub fn with_rng(mut self, rng: fastrand::Rng) -> Self {
    self.rng = rng;
    self
  }

  /// Resolve the root locator and expand the tree in place.
  ///
  /// See [`resolve_tree`].
  pub fn resolve(&self, root: &mut AddonConfig) -> Result<ExpandReport, DeployError> {
    resolve_tree(root, &self.getter, self.locator.as_deref(), &self.options)
  }

  /// Name the root and its deployable dependencies and build the request entries.
  ///
  /// Enablement is decided per version locator across the whole tree: a
  /// locator is deployed when any node carrying it is enabled, or required and
  /// not explicitly disabled. Every node sharing a deployed locator is marked
  /// enabled and receives the same name. Nodes without a locator are skipped.
  pub fn request_entries(&mut self, root: &mut AddonConfig) -> Vec<DeployRequestEntry> {
    root.config_name = root.root_config_name();
    let mut entries = vec![DeployRequestEntry {
      version_locator: root.version_locator.clone(),
      name: root.config_name.clone(),
      config_id: None,
    }];

    let mut names: HashMap<String, String> = HashMap::new();
    for selection in select_locators(root) {
      if !selection.deploy {
        debug!(offering = %selection.offering_name, locator = %selection.version_locator, "skipping disabled dependency");
        continue;
      }

      let name = self.dependency_config_name(&selection.offering_name);
      names.insert(selection.version_locator.clone(), name.clone());
      entries.push(DeployRequestEntry {
        version_locator: selection.version_locator,
        name,
        config_id: selection.existing_config_id,
      });
    }

    for dependency in root.dependencies.iter_mut() {
      dependency.for_each_mut(&mut |node| {
        let Some(name) = names.get(&node.version_locator) else {
          return;
        };
        if !node.is_enabled() {
          debug!(offering = %node.offering_name, locator = %node.version_locator, "enabling copy of a deployed dependency");
          node.enabled = Some(true);
        }
        node.config_name = name.clone();
      });
    }

    entries
  }

  /// Deploy `root` and its dependencies to `project_id`.
  ///
  /// Returns `Ok(None)` when the project reports no configurations.
  ///
  /// # Errors
  ///
  /// Returns [`DeployError`] if locator resolution, expansion or submission fails.
  /// The tree keeps any mutations made before the failure.
  pub fn deploy(
    &mut self,
    root: &mut AddonConfig,
    project_id: &str,
  ) -> Result<Option<DeployedAddonsDetails>, DeployError> {
    self.resolve(root)?;
    let entries = self.request_entries(root);

    info!(project_id, root = %root.config_name, configs = entries.len(), "deploying addons");
    let details = self.submitter.submit(project_id, &entries)?;

    if details.configs.is_empty() {
      warn!(project_id, "deployment returned no configurations");
      return Ok(None);
    }

    let report = correlate(root, &details);
    if !report.unmatched.is_empty() {
      debug!(unmatched = ?report.unmatched, "deployed configurations without a matching addon");
    }
    info!(project_id, matched = report.matched, "deployment complete");

    Ok(Some(details))
  }

  fn dependency_config_name(&mut self, offering_name: &str) -> String {
    let suffix: String = (0..CONFIG_NAME_SUFFIX_LEN).map(|_| self.rng.lowercase()).collect();
    format!("{}-{}", offering_name, suffix)
  }
}

/// Deployment decision for one version locator, folded over every node carrying it.
struct LocatorSelection {
  version_locator: String,
  /// Offering name of the first node seen with this locator.
  offering_name: String,
  existing_config_id: Option<String>,
  deploy: bool,
}

/// Walk every dependency of `root` and decide each locator once, in first-seen order.
fn select_locators(root: &AddonConfig) -> Vec<LocatorSelection> {
  let mut selections: Vec<LocatorSelection> = Vec::new();
  let mut positions: HashMap<&str, usize> = HashMap::new();
  let mut stack: Vec<&AddonConfig> = root.dependencies.iter().rev().collect();

  while let Some(node) = stack.pop() {
    stack.extend(node.dependencies.iter().rev());

    if node.version_locator.is_empty() {
      warn!(offering = %node.offering_name, "dependency has no version locator, not requesting it");
      continue;
    }
    if node.version_locator == root.version_locator {
      debug!(locator = %node.version_locator, "dependency refers back to the root");
      continue;
    }

    let wanted = node.is_enabled() || (node.is_required() && node.enabled != Some(false));
    match positions.get(node.version_locator.as_str()) {
      Some(&index) => {
        let selection = &mut selections[index];
        selection.deploy |= wanted;
        if selection.existing_config_id.is_none() {
          selection.existing_config_id = node.existing_config_id.clone();
        }
      }
      None => {
        positions.insert(node.version_locator.as_str(), selections.len());
        selections.push(LocatorSelection {
          version_locator: node.version_locator.clone(),
          offering_name: node.offering_name.clone(),
          existing_config_id: node.existing_config_id.clone(),
          deploy: wanted,
        });
      }
    }
  }

  selections
}

/// Resolve `root`'s locator if needed, expand its tree and apply the disabled-offering policy.
///
/// A root without a version locator is resolved from its `version_constraint`
/// through `locator`; without either the call fails with
/// [`DeployError::MissingLocator`].
pub fn resolve_tree<G>(
  root: &mut AddonConfig,
  getter: &G,
  locator: Option<&dyn LocatorResolver>,
  options: &ExpandOptions,
) -> Result<ExpandReport, DeployError>
where
  G: ComponentReferenceGetter + ?Sized,
{
  ensure_root_locator(root, locator)?;

  let disabled = collect_disabled_offerings(root);
  let mut visited = HashSet::new();
  let report = expand(root, &mut visited, &disabled, getter, options)?;

  let changed = apply_disabled_offerings(root, &disabled);
  if changed > 0 {
    debug!(changed, "applied disabled offerings");
  }

  Ok(report)
}

fn ensure_root_locator(root: &mut AddonConfig, locator: Option<&dyn LocatorResolver>) -> Result<(), DeployError> {
  if !root.version_locator.is_empty() {
    return Ok(());
  }

  let (Some(locator), Some(constraint)) = (locator, root.version_constraint.as_deref()) else {
    return Err(DeployError::MissingLocator {
      offering: root.offering_name.clone(),
    });
  };

  let resolved = locator.resolve(&root.catalog_id, &root.offering_id, constraint, &root.offering_flavor)?;
  root.version_locator = resolved.version_locator;
  root.resolved_version = resolved.version;
  Ok(())
}

/// Copy deployed configuration ids onto the nodes with matching names.
///
/// Entries named `"{name} Container"` set the container id and name of the
/// node called `name`; all other entries set its `config_id`. Matching is
/// exact and best effort: entries without a node are reported, not errors.
pub fn correlate(root: &mut AddonConfig, details: &DeployedAddonsDetails) -> CorrelationReport {
  let mut report = CorrelationReport::default();

  for config in &details.configs {
    let container_of = config.container_of();
    let target = container_of.unwrap_or(&config.name);
    let mut hit = false;

    root.for_each_mut(&mut |node| {
      if node.config_name.is_empty() || node.config_name != target {
        return;
      }
      hit = true;
      if container_of.is_some() {
        node.container_config_id = Some(config.config_id.clone());
        node.container_config_name = Some(config.name.clone());
      } else {
        node.config_id = Some(config.config_id.clone());
      }
    });

    if hit {
      report.matched += 1;
    } else {
      report.unmatched.push(config.name.clone());
    }
  }

  report
}
