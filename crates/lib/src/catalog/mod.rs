//! Catalog access and version resolution.
//!
//! # Modules
//!
//! - [`types`] - Offering and dependency-reference wire types, plus the lookup traits
//! - [`version`] - Version constraint matching ([`VersionMatcher`], [`SemverMatcher`])
//! - [`locator`] - Resolving a constraint and flavor to a version locator
//! - [`client`] - HTTP implementation of the lookup traits

pub mod client;
pub mod locator;
mod types;
pub mod version;

pub use client::{CatalogClient, CatalogError};
pub use locator::{CatalogLocator, LocatorError, LocatorResolver, ResolvedLocator, resolve_version_locator};
pub use types::*;
pub use version::{SemverMatcher, VersionMatcher};
