//! Dependency resolution for addon trees.
//!
//! # Modules
//!
//! - [`expand`] - In-place expansion from catalog references, with cycle guarding
//! - [`flatten`] - Unique deployable set of a resolved tree
//! - [`graph`] - Locator-level graph for cycle reporting and deploy order
//! - [`policy`] - Propagation of caller-disabled offerings

pub mod expand;
pub mod flatten;
pub mod graph;
pub mod policy;

pub use expand::{ExpandError, ExpandOptions, ExpandReport, OverrideConflict, RequiredOverridePolicy, expand};
pub use flatten::{flatten, flatten_sorted};
pub use graph::{DependencyGraph, GraphError};
pub use policy::{apply_disabled_offerings, collect_disabled_offerings};
