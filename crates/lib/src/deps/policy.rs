//! Enablement policy for disabled offerings.
//!
//! A caller who switches an offering off in one place usually means it off
//! everywhere. The names collected here are threaded through expansion (which
//! only reads them) and then applied to the dependencies expansion discovered.

use std::collections::HashSet;

use tracing::debug;

use crate::addon::AddonConfig;

/// Offering names of every node, root included, explicitly set to `enabled = false`.
pub fn collect_disabled_offerings(root: &AddonConfig) -> HashSet<String> {
  let mut disabled = HashSet::new();
  let mut stack = vec![root];
  while let Some(node) = stack.pop() {
    if node.enabled == Some(false) {
      disabled.insert(node.offering_name.clone());
    }
    stack.extend(node.dependencies.iter());
  }
  disabled
}

/// Disable undecided, non-required dependencies whose offering is in `disabled`.
///
/// Returns how many nodes were changed. Required dependencies are never touched
/// here; conflicts with them are settled during expansion.
pub fn apply_disabled_offerings(root: &mut AddonConfig, disabled: &HashSet<String>) -> usize {
  if disabled.is_empty() {
    return 0;
  }

  let mut changed = 0;
  for dependency in root.dependencies.iter_mut() {
    dependency.for_each_mut(&mut |node| {
      if node.enabled.is_none() && !node.is_required() && disabled.contains(&node.offering_name) {
        debug!(offering = %node.offering_name, "disabling dependency disabled elsewhere");
        node.enabled = Some(false);
        changed += 1;
      }
    });
  }
  changed
}
