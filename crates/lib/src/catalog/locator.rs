//! Version-constrained locator resolution.
//!
//! Turns (catalog, offering, version constraint, flavor) into the concrete
//! version string and version locator a deployment request needs:
//! 1. Fetch the offering's version listing
//! 2. Collect deployable versions (see [`DEPLOYABLE_INSTALL_KIND`])
//! 3. Let the [`VersionMatcher`] choose one
//! 4. Pick the locator of the chosen version with the requested flavor

use thiserror::Error;
use tracing::{debug, info};

use super::types::OfferingLookup;
use super::version::VersionMatcher;
use crate::consts::DEPLOYABLE_INSTALL_KIND;

/// A version constraint resolved against the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLocator {
  pub version: String,
  pub version_locator: String,
}

/// Errors that can occur while resolving a version locator.
#[derive(Debug, Error)]
pub enum LocatorError {
  /// The offering lookup failed.
  #[error("failed to look up offering '{offering_id}' in catalog '{catalog_id}': {source}")]
  Lookup {
    catalog_id: String,
    offering_id: String,
    #[source]
    source: Box<dyn std::error::Error + Send + Sync>,
  },

  /// No available version satisfies the constraint.
  #[error("no matching version for offering '{offering_id}' with constraint '{constraint}'")]
  NoMatchingVersion { offering_id: String, constraint: String },

  /// The chosen version has no locator for the requested flavor.
  #[error("version '{version}' with flavor '{flavor}' not found for offering '{offering_id}'")]
  VersionNotFound {
    offering_id: String,
    version: String,
    flavor: String,
  },
}

/// Resolves locators for the orchestrator without exposing the lookup's error type.
pub trait LocatorResolver {
  fn resolve(
    &self,
    catalog_id: &str,
    offering_id: &str,
    constraint: &str,
    flavor: &str,
  ) -> Result<ResolvedLocator, LocatorError>;
}

/// An [`OfferingLookup`] paired with a [`VersionMatcher`].
#[derive(Debug, Clone)]
pub struct CatalogLocator<L, M> {
  lookup: L,
  matcher: M,
}

impl<L, M> CatalogLocator<L, M> {
  pub fn new(lookup: L, matcher: M) -> Self {
    Self { lookup, matcher }
  }
}

impl<L: OfferingLookup, M: VersionMatcher> LocatorResolver for CatalogLocator<L, M> {
  fn resolve(
    &self,
    catalog_id: &str,
    offering_id: &str,
    constraint: &str,
    flavor: &str,
  ) -> Result<ResolvedLocator, LocatorError> {
    resolve_version_locator(&self.lookup, &self.matcher, catalog_id, offering_id, constraint, flavor)
  }
}

/// Resolve a version constraint and flavor to a concrete version locator.
///
/// # Errors
///
/// Returns [`LocatorError`] if:
/// - The offering cannot be fetched
/// - The matcher finds no version satisfying `constraint`
/// - No version/flavor combination maps to a locator
pub fn resolve_version_locator<L, M>(
  lookup: &L,
  matcher: &M,
  catalog_id: &str,
  offering_id: &str,
  constraint: &str,
  flavor: &str,
) -> Result<ResolvedLocator, LocatorError>
where
  L: OfferingLookup + ?Sized,
  M: VersionMatcher + ?Sized,
{
  let offering = lookup
    .get_offering(catalog_id, offering_id)
    .map_err(|e| LocatorError::Lookup {
      catalog_id: catalog_id.to_string(),
      offering_id: offering_id.to_string(),
      source: Box::new(e),
    })?;

  let mut available: Vec<String> = Vec::new();
  for version in offering.versions_of_kind(DEPLOYABLE_INSTALL_KIND) {
    if !available.contains(&version.version) {
      available.push(version.version.clone());
    }
  }
  debug!(offering_id, count = available.len(), "collected deployable versions");

  let chosen = matcher
    .best_match(&available, constraint)
    .ok_or_else(|| LocatorError::NoMatchingVersion {
      offering_id: offering_id.to_string(),
      constraint: constraint.to_string(),
    })?;

  let version = offering
    .versions_of_kind(DEPLOYABLE_INSTALL_KIND)
    .find(|v| v.version == chosen && v.flavor_name() == flavor)
    .ok_or_else(|| LocatorError::VersionNotFound {
      offering_id: offering_id.to_string(),
      version: chosen.clone(),
      flavor: flavor.to_string(),
    })?;

  info!(offering_id, constraint, version = %chosen, locator = %version.version_locator, "resolved version locator");

  Ok(ResolvedLocator {
    version: chosen,
    version_locator: version.version_locator.clone(),
  })
}
