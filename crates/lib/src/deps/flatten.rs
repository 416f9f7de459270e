//! Flattening an expanded tree into its unique deployable set.

use std::collections::HashSet;

use crate::addon::AddonConfig;

/// Collect every descendant of `root` once per version locator.
///
/// The root itself is not included. Nodes are returned in first-seen,
/// depth-first order; a node whose locator was already collected is neither
/// added again nor walked into, which also stops cyclic catalogs. Nodes
/// without a locator are left out, but their children are still walked.
pub fn flatten(root: &AddonConfig) -> Vec<AddonConfig> {
  let mut seen: HashSet<&str> = HashSet::new();
  let mut flattened = Vec::new();
  let mut stack: Vec<&AddonConfig> = root.dependencies.iter().rev().collect();

  while let Some(node) = stack.pop() {
    if node.version_locator.is_empty() {
      stack.extend(node.dependencies.iter().rev());
      continue;
    }
    if !seen.insert(node.version_locator.as_str()) {
      continue;
    }
    flattened.push(node.clone());
    stack.extend(node.dependencies.iter().rev());
  }

  flattened
}

/// [`flatten`], sorted by offering name then version locator.
pub fn flatten_sorted(root: &AddonConfig) -> Vec<AddonConfig> {
  let mut flattened = flatten(root);
  flattened.sort_by(|a, b| {
    a.offering_name
      .cmp(&b.offering_name)
      .then_with(|| a.version_locator.cmp(&b.version_locator))
  });
  flattened
}

#[cfg(test)]
mod tests {
  use super::*;

  fn node(name: &str, locator: &str) -> AddonConfig {
    AddonConfig::new(name, format!("{}-id", name), "cat").with_version_locator(locator)
  }

  fn locators(nodes: &[AddonConfig]) -> Vec<&str> {
    nodes.iter().map(|n| n.version_locator.as_str()).collect()
  }

  #[test]
  fn excludes_root() {
    let root = node("db", "cat.db").with_dependency(node("kms", "cat.kms"));
    assert_eq!(locators(&flatten(&root)), vec!["cat.kms"]);
  }

  #[test]
  fn depth_first_order() {
    let root = node("db", "cat.db")
      .with_dependency(node("a", "cat.a").with_dependency(node("a1", "cat.a1")))
      .with_dependency(node("b", "cat.b"));

    assert_eq!(locators(&flatten(&root)), vec!["cat.a", "cat.a1", "cat.b"]);
  }

  #[test]
  fn diamond_counts_distinct_locators() {
    let root = node("db", "cat.db")
      .with_dependency(node("a", "cat.a").with_dependency(node("shared", "cat.shared")))
      .with_dependency(node("b", "cat.b").with_dependency(node("shared", "cat.shared")));

    let flattened = flatten(&root);

    assert_eq!(flattened.len(), 3);
    let unique: HashSet<_> = locators(&flattened).into_iter().collect();
    assert_eq!(unique.len(), flattened.len());
  }

  #[test]
  fn duplicate_subtree_is_not_rewalked() {
    let root = node("db", "cat.db")
      .with_dependency(node("a", "cat.a"))
      .with_dependency(node("a", "cat.a").with_dependency(node("hidden", "cat.hidden")));

    assert_eq!(locators(&flatten(&root)), vec!["cat.a"]);
  }

  #[test]
  fn back_edge_to_root_is_listed_once() {
    let root = node("db", "cat.db").with_dependency(node("kms", "cat.kms").with_dependency(node("db", "cat.db")));

    assert_eq!(locators(&flatten(&root)), vec!["cat.kms", "cat.db"]);
  }

  #[test]
  fn nodes_without_locator_are_left_out() {
    let root = node("db", "cat.db")
      .with_dependency(AddonConfig::new("ghost", "ghost-id", "cat").with_dependency(node("kms", "cat.kms")))
      .with_dependency(AddonConfig::new("phantom", "phantom-id", "cat"));

    assert_eq!(locators(&flatten(&root)), vec!["cat.kms"]);
  }

  #[test]
  fn sorted_by_name() {
    let root = node("db", "cat.db")
      .with_dependency(node("zeta", "cat.z"))
      .with_dependency(node("alpha", "cat.a"));

    let names: Vec<_> = flatten_sorted(&root).into_iter().map(|n| n.offering_name).collect();
    assert_eq!(names, vec!["alpha", "zeta"]);
  }
}
