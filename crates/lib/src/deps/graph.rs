//! Locator-level dependency graph of a resolved tree.
//!
//! The expanded [`AddonConfig`] tree repeats shared dependencies and records
//! catalog cycles as back edges. This module collapses it into one node per
//! version locator so cycles and a dependencies-first order can be reported.

use std::collections::HashMap;

use petgraph::algo::{tarjan_scc, toposort};
use petgraph::graph::{DiGraph, NodeIndex};
use thiserror::Error;
use tracing::trace;

use crate::addon::AddonConfig;

#[derive(Debug, Error)]
pub enum GraphError {
  #[error("dependency cycle detected at '{locator}'")]
  CycleDetected { locator: String },
}

/// Directed graph with an edge from each dependency to its dependent.
#[derive(Debug, Default)]
pub struct DependencyGraph {
  graph: DiGraph<String, ()>,
  nodes: HashMap<String, NodeIndex>,
}

impl DependencyGraph {
  /// Build the graph from every node of `root` that has a version locator.
  ///
  /// Nodes without a locator are skipped; their children attach to the
  /// nearest ancestor that has one.
  pub fn from_tree(root: &AddonConfig) -> Self {
    let mut graph = DiGraph::new();
    let mut nodes: HashMap<String, NodeIndex> = HashMap::new();
    let mut stack: Vec<(&AddonConfig, Option<NodeIndex>)> = vec![(root, None)];

    while let Some((node, dependent)) = stack.pop() {
      let index = if node.version_locator.is_empty() {
        dependent
      } else {
        let index = *nodes
          .entry(node.version_locator.clone())
          .or_insert_with(|| graph.add_node(node.version_locator.clone()));
        if let Some(dependent) = dependent {
          graph.update_edge(index, dependent, ());
        }
        Some(index)
      };

      for child in node.dependencies.iter().rev() {
        stack.push((child, index));
      }
    }

    trace!(nodes = graph.node_count(), edges = graph.edge_count(), "built dependency graph");
    Self { graph, nodes }
  }

  pub fn len(&self) -> usize {
    self.graph.node_count()
  }

  pub fn is_empty(&self) -> bool {
    self.graph.node_count() == 0
  }

  pub fn contains(&self, locator: &str) -> bool {
    self.nodes.contains_key(locator)
  }

  /// Locators the given locator directly depends on, sorted.
  pub fn dependencies_of(&self, locator: &str) -> Vec<&str> {
    let Some(&index) = self.nodes.get(locator) else {
      return Vec::new();
    };
    let mut deps: Vec<&str> = self
      .graph
      .neighbors_directed(index, petgraph::Direction::Incoming)
      .map(|i| self.graph[i].as_str())
      .collect();
    deps.sort_unstable();
    deps
  }

  /// Groups of locators that depend on each other, each group sorted.
  pub fn cycles(&self) -> Vec<Vec<String>> {
    let mut cycles: Vec<Vec<String>> = tarjan_scc(&self.graph)
      .into_iter()
      .filter(|component| component.len() > 1 || self.graph.contains_edge(component[0], component[0]))
      .map(|component| {
        let mut locators: Vec<String> = component.into_iter().map(|i| self.graph[i].clone()).collect();
        locators.sort();
        locators
      })
      .collect();
    cycles.sort();
    cycles
  }

  /// Locators ordered so every dependency precedes its dependents.
  ///
  /// # Errors
  ///
  /// Returns [`GraphError::CycleDetected`] if the graph has a cycle.
  pub fn deploy_order(&self) -> Result<Vec<String>, GraphError> {
    let sorted = toposort(&self.graph, None).map_err(|cycle| GraphError::CycleDetected {
      locator: self.graph[cycle.node_id()].clone(),
    })?;
    Ok(sorted.into_iter().map(|i| self.graph[i].clone()).collect())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn node(name: &str, locator: &str) -> AddonConfig {
    AddonConfig::new(name, format!("{}-id", name), "cat").with_version_locator(locator)
  }

  fn position(order: &[String], locator: &str) -> usize {
    order.iter().position(|l| l == locator).unwrap()
  }

  #[test]
  fn diamond_collapses_shared_locator() {
    let root = node("db", "cat.db")
      .with_dependency(node("a", "cat.a").with_dependency(node("shared", "cat.shared")))
      .with_dependency(node("b", "cat.b").with_dependency(node("shared", "cat.shared")));

    let graph = DependencyGraph::from_tree(&root);

    assert_eq!(graph.len(), 4);
    assert_eq!(graph.dependencies_of("cat.db"), vec!["cat.a", "cat.b"]);
    assert!(graph.cycles().is_empty());
  }

  #[test]
  fn deploy_order_puts_dependencies_first() {
    let root = node("db", "cat.db")
      .with_dependency(node("kms", "cat.kms").with_dependency(node("hsm", "cat.hsm")))
      .with_dependency(node("logs", "cat.logs"));

    let order = DependencyGraph::from_tree(&root).deploy_order().unwrap();

    assert_eq!(order.len(), 4);
    assert!(position(&order, "cat.hsm") < position(&order, "cat.kms"));
    assert!(position(&order, "cat.kms") < position(&order, "cat.db"));
    assert!(position(&order, "cat.logs") < position(&order, "cat.db"));
  }

  #[test]
  fn back_edge_is_reported_as_cycle() {
    let root = node("db", "cat.db").with_dependency(node("kms", "cat.kms").with_dependency(node("db", "cat.db")));

    let graph = DependencyGraph::from_tree(&root);

    assert_eq!(graph.cycles(), vec![vec!["cat.db".to_string(), "cat.kms".to_string()]]);
    assert!(matches!(graph.deploy_order(), Err(GraphError::CycleDetected { .. })));
  }

  #[test]
  fn self_reference_is_a_cycle() {
    let root = node("db", "cat.db").with_dependency(node("db", "cat.db"));
    assert_eq!(DependencyGraph::from_tree(&root).cycles(), vec![vec!["cat.db".to_string()]]);
  }

  #[test]
  fn locatorless_nodes_pass_children_through() {
    let root = node("db", "cat.db").with_dependency(
      AddonConfig::new("pending", "pending-id", "cat").with_dependency(node("kms", "cat.kms")),
    );

    let graph = DependencyGraph::from_tree(&root);

    assert_eq!(graph.len(), 2);
    assert!(!graph.contains(""));
    assert_eq!(graph.dependencies_of("cat.db"), vec!["cat.kms"]);
  }
}
