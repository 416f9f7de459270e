//! Addon tree nodes.
//!
//! See [`AddonConfig`] for the node type shared by catalog resolution,
//! dependency expansion and deployment.

mod types;

pub use types::*;
