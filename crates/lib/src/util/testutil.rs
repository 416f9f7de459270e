//! Test utilities for addonctl-lib.
//!
//! In-memory stand-ins for the catalog and deployment seams so resolution and
//! orchestration can be tested without HTTP.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

use thiserror::Error;

use crate::catalog::{
  ComponentReferenceGetter, FlavorRef, Kind, Offering, OfferingLookup, OfferingReferenceDetail, OfferingReferenceItem,
  OfferingReferenceResponse, OfferingVersion,
};
use crate::consts::DEPLOYABLE_INSTALL_KIND;
use crate::deploy::{DeployRequestEntry, DeployedAddonsDetails, DeploymentSubmitter, SubmitError};

#[derive(Debug, Error)]
#[error("fake failure: {0}")]
pub struct FakeError(pub String);

/// In-memory catalog with offerings and dependency references.
///
/// Locators without registered references resolve to an empty dependency set.
#[derive(Debug, Default)]
pub struct FakeCatalog {
  offerings: HashMap<(String, String), Offering>,
  references: HashMap<String, OfferingReferenceResponse>,
  failing: HashSet<String>,
  calls: RefCell<Vec<String>>,
}

impl FakeCatalog {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_offering(mut self, offering: Offering) -> Self {
    self
      .offerings
      .insert((offering.catalog_id.clone(), offering.id.clone()), offering);
    self
  }

  /// Add a version under its own kind entry.
  pub fn add_version(
    &mut self,
    catalog_id: &str,
    offering_id: &str,
    install_kind: &str,
    version: &str,
    flavor: &str,
    locator: &str,
  ) {
    let offering = self
      .offerings
      .entry((catalog_id.to_string(), offering_id.to_string()))
      .or_insert_with(|| Offering {
        id: offering_id.to_string(),
        catalog_id: catalog_id.to_string(),
        ..Default::default()
      });
    offering.kinds.push(Kind {
      install_kind: install_kind.to_string(),
      target_kind: String::new(),
      versions: vec![version_entry(version, flavor, locator)],
    });
  }

  pub fn with_references(
    mut self,
    locator: &str,
    required: Vec<OfferingReferenceItem>,
    optional: Vec<OfferingReferenceItem>,
  ) -> Self {
    self
      .references
      .insert(locator.to_string(), OfferingReferenceResponse { required, optional });
    self
  }

  /// Make reference lookups for `locator` fail.
  pub fn failing_on(mut self, locator: &str) -> Self {
    self.failing.insert(locator.to_string());
    self
  }

  /// Locators passed to `get_component_references`, in call order.
  pub fn calls(&self) -> Vec<String> {
    self.calls.borrow().clone()
  }
}

impl ComponentReferenceGetter for FakeCatalog {
  type Error = FakeError;

  fn get_component_references(&self, version_locator: &str) -> Result<OfferingReferenceResponse, FakeError> {
    self.calls.borrow_mut().push(version_locator.to_string());
    if self.failing.contains(version_locator) {
      return Err(FakeError(format!("references unavailable for {}", version_locator)));
    }
    Ok(self.references.get(version_locator).cloned().unwrap_or_default())
  }
}

impl OfferingLookup for FakeCatalog {
  type Error = FakeError;

  fn get_offering(&self, catalog_id: &str, offering_id: &str) -> Result<Offering, FakeError> {
    self
      .offerings
      .get(&(catalog_id.to_string(), offering_id.to_string()))
      .cloned()
      .ok_or_else(|| FakeError(format!("offering {} not found in {}", offering_id, catalog_id)))
  }
}

fn version_entry(version: &str, flavor: &str, locator: &str) -> OfferingVersion {
  OfferingVersion {
    id: format!("{}-id", locator),
    version: version.to_string(),
    version_locator: locator.to_string(),
    flavor: Some(FlavorRef {
      name: flavor.to_string(),
      label: String::new(),
    }),
  }
}

/// Build a deployable offering from `(version, flavor, locator)` rows.
pub fn offering(catalog_id: &str, offering_id: &str, rows: &[(&str, &str, &str)]) -> Offering {
  Offering {
    id: offering_id.to_string(),
    name: offering_id.to_string(),
    label: String::new(),
    catalog_id: catalog_id.to_string(),
    kinds: vec![Kind {
      install_kind: DEPLOYABLE_INSTALL_KIND.to_string(),
      target_kind: "terraform".to_string(),
      versions: rows.iter().map(|(v, f, l)| version_entry(v, f, l)).collect(),
    }],
  }
}

/// Build a catalog reference to `name` at `locator`.
pub fn reference(name: &str, locator: &str, on_by_default: bool) -> OfferingReferenceItem {
  OfferingReferenceItem {
    name: name.to_string(),
    offering_reference: OfferingReferenceDetail {
      id: format!("{}-id", name),
      catalog_id: "cat".to_string(),
      version: "1.0.0".to_string(),
      version_locator: locator.to_string(),
      flavor: FlavorRef {
        name: "standard".to_string(),
        label: "Standard".to_string(),
      },
      on_by_default,
      label: format!("{} label", name),
    },
  }
}

/// Deployment submitter that records requests and returns a canned result.
#[derive(Debug, Default)]
pub struct FakeSubmitter {
  response: DeployedAddonsDetails,
  fail_status: Option<(u16, String)>,
  requests: RefCell<Vec<(String, Vec<DeployRequestEntry>)>>,
}

impl FakeSubmitter {
  pub fn returning(response: DeployedAddonsDetails) -> Self {
    Self {
      response,
      ..Default::default()
    }
  }

  pub fn failing(status: u16, body: &str) -> Self {
    Self {
      fail_status: Some((status, body.to_string())),
      ..Default::default()
    }
  }

  /// Every `(project_id, entries)` pair submitted so far.
  pub fn requests(&self) -> Vec<(String, Vec<DeployRequestEntry>)> {
    self.requests.borrow().clone()
  }
}

impl DeploymentSubmitter for FakeSubmitter {
  fn submit(&self, project_id: &str, entries: &[DeployRequestEntry]) -> Result<DeployedAddonsDetails, SubmitError> {
    self
      .requests
      .borrow_mut()
      .push((project_id.to_string(), entries.to_vec()));
    if let Some((status, body)) = &self.fail_status {
      return Err(SubmitError::Status {
        url: format!("fake://projects/{}/container", project_id),
        status: *status,
        body: body.clone(),
      });
    }
    Ok(self.response.clone())
  }
}
