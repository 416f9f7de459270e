//! Catalog wire types and the lookup seams the resolver depends on.

use serde::{Deserialize, Serialize};

/// A catalog-declared dependency set for one offering version.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OfferingReferenceResponse {
  #[serde(default)]
  pub required: Vec<OfferingReferenceItem>,
  #[serde(default)]
  pub optional: Vec<OfferingReferenceItem>,
}

/// One referenced offering, by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OfferingReferenceItem {
  pub name: String,
  #[serde(default)]
  pub offering_reference: OfferingReferenceDetail,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OfferingReferenceDetail {
  pub id: String,
  pub catalog_id: String,
  pub version: String,
  pub version_locator: String,
  pub flavor: FlavorRef,
  pub on_by_default: bool,
  pub label: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlavorRef {
  pub name: String,
  pub label: String,
}

/// Offering metadata with its nested kind, version and flavor listings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Offering {
  pub id: String,
  pub name: String,
  pub label: String,
  pub catalog_id: String,
  pub kinds: Vec<Kind>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Kind {
  pub install_kind: String,
  pub target_kind: String,
  pub versions: Vec<OfferingVersion>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OfferingVersion {
  pub id: String,
  pub version: String,
  pub version_locator: String,
  pub flavor: Option<FlavorRef>,
}

impl OfferingVersion {
  pub fn flavor_name(&self) -> &str {
    self.flavor.as_ref().map(|f| f.name.as_str()).unwrap_or("")
  }
}

impl Offering {
  /// Versions of every kind installed with `install_kind`.
  pub fn versions_of_kind<'a>(&'a self, install_kind: &'a str) -> impl Iterator<Item = &'a OfferingVersion> + 'a {
    self
      .kinds
      .iter()
      .filter(move |k| k.install_kind == install_kind)
      .flat_map(|k| k.versions.iter())
  }
}

/// Queries the catalog for the dependencies an offering version declares.
pub trait ComponentReferenceGetter {
  type Error: std::error::Error + Send + Sync + 'static;

  fn get_component_references(&self, version_locator: &str) -> Result<OfferingReferenceResponse, Self::Error>;
}

/// Fetches an offering's full version and flavor catalog.
pub trait OfferingLookup {
  type Error: std::error::Error + Send + Sync + 'static;

  fn get_offering(&self, catalog_id: &str, offering_id: &str) -> Result<Offering, Self::Error>;
}

impl<T: ComponentReferenceGetter + ?Sized> ComponentReferenceGetter for &T {
  type Error = T::Error;

  fn get_component_references(&self, version_locator: &str) -> Result<OfferingReferenceResponse, Self::Error> {
    (**self).get_component_references(version_locator)
  }
}

impl<T: OfferingLookup + ?Sized> OfferingLookup for &T {
  type Error = T::Error;

  fn get_offering(&self, catalog_id: &str, offering_id: &str) -> Result<Offering, Self::Error> {
    (**self).get_offering(catalog_id, offering_id)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn reference_response_defaults_missing_lists() {
    let response: OfferingReferenceResponse = serde_json::from_str(r#"{"required": []}"#).unwrap();
    assert!(response.required.is_empty());
    assert!(response.optional.is_empty());
  }

  #[test]
  fn reference_item_parses_detail() {
    let json = r#"{
      "required": [{
        "name": "kms",
        "offering_reference": {
          "id": "kms-id",
          "catalog_id": "cat",
          "version": "v4.1.0",
          "version_locator": "cat.kms-v4",
          "flavor": {"name": "fully-configurable", "label": "Fully configurable"},
          "on_by_default": true,
          "label": "Key Protect"
        }
      }]
    }"#;

    let response: OfferingReferenceResponse = serde_json::from_str(json).unwrap();
    let detail = &response.required[0].offering_reference;

    assert_eq!(response.required[0].name, "kms");
    assert_eq!(detail.version_locator, "cat.kms-v4");
    assert_eq!(detail.flavor.name, "fully-configurable");
    assert!(detail.on_by_default);
  }

  #[test]
  fn versions_of_kind_filters_install_kind() {
    let offering = Offering {
      kinds: vec![
        Kind {
          install_kind: "terraform".to_string(),
          versions: vec![OfferingVersion {
            version: "1.0.0".to_string(),
            ..Default::default()
          }],
          ..Default::default()
        },
        Kind {
          install_kind: "helm".to_string(),
          versions: vec![OfferingVersion {
            version: "9.9.9".to_string(),
            ..Default::default()
          }],
          ..Default::default()
        },
      ],
      ..Default::default()
    };

    let versions: Vec<_> = offering.versions_of_kind("terraform").map(|v| v.version.as_str()).collect();
    assert_eq!(versions, vec!["1.0.0"]);
  }
}
