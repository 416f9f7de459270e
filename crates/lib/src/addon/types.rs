//! The addon tree node.
//!
//! An [`AddonConfig`] is one offering being deployed into a project: the root the
//! caller asks for, or one of its (possibly nested) dependencies. Nodes are created
//! by the caller or synthesized during dependency expansion, mutated in place, and
//! never removed; a dependency that should not be deployed is marked disabled.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::catalog::OfferingReferenceItem;

/// A node in the addon dependency tree.
///
/// The `enabled`, `on_by_default` and `is_required` flags are tri-state: `None`
/// means neither the caller nor the catalog has decided yet, which keeps an
/// explicit `Some(false)` from the caller distinguishable from "unset".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AddonConfig {
  pub offering_id: String,
  pub offering_name: String,
  pub offering_flavor: String,
  pub offering_label: String,
  pub catalog_id: String,

  /// Opaque identifier of one (offering, version, flavor) deployable unit.
  pub version_locator: String,
  pub resolved_version: String,
  pub version_id: String,

  /// Constraint used to resolve `version_locator` when the caller leaves it empty.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub version_constraint: Option<String>,

  pub prefix: String,
  pub config_name: String,

  /// Bind to this existing project configuration instead of creating a new one.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub existing_config_id: Option<String>,

  #[serde(skip_serializing_if = "Option::is_none")]
  pub enabled: Option<bool>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub on_by_default: Option<bool>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub is_required: Option<bool>,

  pub inputs: BTreeMap<String, serde_json::Value>,

  pub dependencies: Vec<AddonConfig>,

  /// Offering names that forced this dependency on.
  #[serde(skip_serializing_if = "Vec::is_empty")]
  pub required_by: Vec<String>,

  #[serde(skip_serializing_if = "Option::is_none")]
  pub config_id: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub container_config_id: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub container_config_name: Option<String>,
}

impl AddonConfig {
  /// Create a node for an offering in a catalog.
  pub fn new(offering_name: impl Into<String>, offering_id: impl Into<String>, catalog_id: impl Into<String>) -> Self {
    Self {
      offering_name: offering_name.into(),
      offering_id: offering_id.into(),
      catalog_id: catalog_id.into(),
      ..Self::default()
    }
  }

  pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
    self.prefix = prefix.into();
    self
  }

  pub fn with_flavor(mut self, flavor: impl Into<String>) -> Self {
    self.offering_flavor = flavor.into();
    self
  }

  pub fn with_version_constraint(mut self, constraint: impl Into<String>) -> Self {
    self.version_constraint = Some(constraint.into());
    self
  }

  pub fn with_version_locator(mut self, locator: impl Into<String>) -> Self {
    self.version_locator = locator.into();
    self
  }

  pub fn with_enabled(mut self, enabled: bool) -> Self {
    self.enabled = Some(enabled);
    self
  }

  pub fn with_on_by_default(mut self, on_by_default: bool) -> Self {
    self.on_by_default = Some(on_by_default);
    self
  }

  pub fn with_existing_config_id(mut self, config_id: impl Into<String>) -> Self {
    self.existing_config_id = Some(config_id.into());
    self
  }

  pub fn with_input(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
    self.inputs.insert(key.into(), value);
    self
  }

  pub fn with_dependency(mut self, dependency: AddonConfig) -> Self {
    self.dependencies.push(dependency);
    self
  }

  /// Build a dependency node from a catalog reference the parent requires.
  pub fn from_required_reference(item: &OfferingReferenceItem, parent: &str) -> Self {
    let mut node = Self::from_reference(item);
    node.enabled = Some(true);
    node.is_required = Some(true);
    node.on_by_default = Some(item.offering_reference.on_by_default);
    node.add_required_by(parent);
    node
  }

  /// Build a dependency node from an optional catalog reference.
  ///
  /// An optional dependency the caller never listed is on by default.
  pub fn from_optional_reference(item: &OfferingReferenceItem) -> Self {
    let mut node = Self::from_reference(item);
    node.is_required = Some(false);
    node.on_by_default = Some(true);
    node
  }

  fn from_reference(item: &OfferingReferenceItem) -> Self {
    let detail = &item.offering_reference;
    Self {
      offering_id: detail.id.clone(),
      offering_name: item.name.clone(),
      offering_flavor: detail.flavor.name.clone(),
      offering_label: detail.label.clone(),
      catalog_id: detail.catalog_id.clone(),
      version_locator: detail.version_locator.clone(),
      resolved_version: detail.version.clone(),
      ..Self::default()
    }
  }

  /// Effective enablement: the explicit flag, else the catalog default, else off.
  pub fn is_enabled(&self) -> bool {
    self.enabled.or(self.on_by_default).unwrap_or(false)
  }

  pub fn is_required(&self) -> bool {
    self.is_required.unwrap_or(false)
  }

  /// Record that `offering_name` forced this dependency on.
  pub fn add_required_by(&mut self, offering_name: &str) {
    if !offering_name.is_empty() && !self.required_by.iter().any(|n| n == offering_name) {
      self.required_by.push(offering_name.to_string());
    }
  }

  /// Derive the configuration name used for the root of a deployment.
  pub fn root_config_name(&self) -> String {
    if self.prefix.is_empty() {
      self.offering_name.clone()
    } else {
      format!("{}-{}", self.prefix, self.offering_name)
    }
  }

  /// Position of the direct child with the given offering name.
  pub fn dependency_index(&self, offering_name: &str) -> Option<usize> {
    self.dependencies.iter().position(|d| d.offering_name == offering_name)
  }

  /// Descend along a path of child indices.
  pub fn node_at_mut(&mut self, path: &[usize]) -> Option<&mut AddonConfig> {
    let mut node = self;
    for &index in path {
      node = node.dependencies.get_mut(index)?;
    }
    Some(node)
  }

  /// Visit every node of the tree (this node included), depth first.
  pub fn for_each_mut(&mut self, f: &mut impl FnMut(&mut AddonConfig)) {
    let mut stack: Vec<&mut AddonConfig> = vec![self];
    while let Some(node) = stack.pop() {
      f(node);
      stack.extend(node.dependencies.iter_mut().rev());
    }
  }

  /// Count every node of the tree, this node included.
  pub fn node_count(&self) -> usize {
    1 + self.dependencies.iter().map(AddonConfig::node_count).sum::<usize>()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::catalog::{FlavorRef, OfferingReferenceDetail};

  fn reference(name: &str, on_by_default: bool) -> OfferingReferenceItem {
    OfferingReferenceItem {
      name: name.to_string(),
      offering_reference: OfferingReferenceDetail {
        id: format!("{}-id", name),
        catalog_id: "cat".to_string(),
        version: "1.2.3".to_string(),
        version_locator: format!("cat.{}-loc", name),
        flavor: FlavorRef {
          name: "standard".to_string(),
          label: "Standard".to_string(),
        },
        on_by_default,
        label: format!("{} label", name),
      },
    }
  }

  mod enablement {
    use super::*;

    #[test]
    fn explicit_flag_wins_over_default() {
      let node = AddonConfig::new("kms", "kms-id", "cat")
        .with_enabled(false)
        .with_on_by_default(true);
      assert!(!node.is_enabled());
    }

    #[test]
    fn falls_back_to_on_by_default() {
      let node = AddonConfig::new("kms", "kms-id", "cat").with_on_by_default(true);
      assert!(node.is_enabled());
    }

    #[test]
    fn unset_is_disabled() {
      assert!(!AddonConfig::new("kms", "kms-id", "cat").is_enabled());
    }
  }

  mod references {
    use super::*;

    #[test]
    fn required_reference_is_enabled_and_traced() {
      let node = AddonConfig::from_required_reference(&reference("kms", false), "db");

      assert_eq!(node.offering_name, "kms");
      assert_eq!(node.offering_id, "kms-id");
      assert_eq!(node.version_locator, "cat.kms-loc");
      assert_eq!(node.resolved_version, "1.2.3");
      assert_eq!(node.offering_flavor, "standard");
      assert_eq!(node.enabled, Some(true));
      assert_eq!(node.is_required, Some(true));
      assert_eq!(node.on_by_default, Some(false));
      assert_eq!(node.required_by, vec!["db".to_string()]);
    }

    #[test]
    fn optional_reference_is_on_by_default() {
      let node = AddonConfig::from_optional_reference(&reference("logs", false));

      assert_eq!(node.enabled, None);
      assert_eq!(node.on_by_default, Some(true));
      assert_eq!(node.is_required, Some(false));
      assert!(node.is_enabled());
    }

    #[test]
    fn required_by_is_deduplicated() {
      let mut node = AddonConfig::default();
      node.add_required_by("db");
      node.add_required_by("db");
      node.add_required_by("");
      node.add_required_by("app");
      assert_eq!(node.required_by, vec!["db".to_string(), "app".to_string()]);
    }
  }

  mod tree {
    use super::*;

    #[test]
    fn root_config_name_uses_prefix() {
      let node = AddonConfig::new("db", "db-id", "cat").with_prefix("test-42");
      assert_eq!(node.root_config_name(), "test-42-db");

      let node = AddonConfig::new("db", "db-id", "cat");
      assert_eq!(node.root_config_name(), "db");
    }

    #[test]
    fn node_at_mut_follows_path() {
      let mut root = AddonConfig::new("a", "a", "cat")
        .with_dependency(AddonConfig::new("b", "b", "cat").with_dependency(AddonConfig::new("c", "c", "cat")));

      assert_eq!(root.node_at_mut(&[0, 0]).map(|n| n.offering_name.clone()), Some("c".to_string()));
      assert!(root.node_at_mut(&[1]).is_none());
    }

    #[test]
    fn for_each_mut_visits_all_nodes() {
      let mut root = AddonConfig::new("a", "a", "cat")
        .with_dependency(AddonConfig::new("b", "b", "cat").with_dependency(AddonConfig::new("c", "c", "cat")))
        .with_dependency(AddonConfig::new("d", "d", "cat"));

      let mut seen = Vec::new();
      root.for_each_mut(&mut |n| seen.push(n.offering_name.clone()));

      assert_eq!(seen, vec!["a", "b", "c", "d"]);
      assert_eq!(root.node_count(), 4);
    }

    #[test]
    fn deserializes_with_defaults() {
      let json = r#"{
        "offering_name": "db",
        "offering_id": "db-id",
        "catalog_id": "cat",
        "version_constraint": "^v8.18.0",
        "enabled": false,
        "inputs": {"region": "us-south"},
        "dependencies": [{"offering_name": "kms"}]
      }"#;

      let node: AddonConfig = serde_json::from_str(json).unwrap();

      assert_eq!(node.version_constraint.as_deref(), Some("^v8.18.0"));
      assert_eq!(node.enabled, Some(false));
      assert_eq!(node.on_by_default, None);
      assert_eq!(node.inputs.get("region"), Some(&serde_json::json!("us-south")));
      assert_eq!(node.dependencies.len(), 1);
      assert_eq!(node.dependencies[0].offering_name, "kms");
      assert!(node.dependencies[0].version_locator.is_empty());
    }
  }
}
