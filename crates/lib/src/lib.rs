//! addonctl-lib: Addon dependency resolution and deployment orchestration
//!
//! This crate composes catalog offerings ("addons") into a deployment project:
//! - `catalog`: offering lookups, dependency references and version-constrained locators
//! - `deps`: in-place dependency tree expansion, flattening, enablement policy and the locator graph
//! - `deploy`: deployment request assembly, submission and result correlation
//! - `addon`: the `AddonConfig` tree node shared by all of the above

pub mod addon;
pub mod auth;
pub mod catalog;
pub mod config;
pub mod consts;
pub mod deploy;
pub mod deps;
pub mod platform;
pub mod util;
