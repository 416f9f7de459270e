//! Deployment of resolved addon trees.
//!
//! # Modules
//!
//! - [`types`] - Request and response wire types
//! - [`client`] - The [`DeploymentSubmitter`] seam and its HTTP implementation
//! - [`orchestrate`] - [`Deployer`], which resolves, names, submits and correlates

pub mod client;
pub mod orchestrate;
mod types;

pub use client::{DeploymentSubmitter, ProjectsClient, SubmitError};
pub use orchestrate::{CorrelationReport, DeployError, Deployer, correlate, resolve_tree};
pub use types::*;
