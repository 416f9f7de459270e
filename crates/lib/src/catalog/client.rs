//! HTTP catalog client.
//!
//! Implements [`ComponentReferenceGetter`] and [`OfferingLookup`] against the
//! catalog management API with bearer authentication.

use std::time::Duration;

use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

use super::types::{ComponentReferenceGetter, Offering, OfferingLookup, OfferingReferenceResponse};
use crate::auth::{AuthError, TokenSource, bearer};
use crate::util::http::{build_client, endpoint, read_response};

/// Errors returned by [`CatalogClient`].
#[derive(Debug, Error)]
pub enum CatalogError {
  /// The HTTP client could not be constructed.
  #[error("failed to create HTTP client: {0}")]
  Client(#[source] reqwest::Error),

  #[error(transparent)]
  Auth(#[from] AuthError),

  /// The configured base URL cannot be extended with a path.
  #[error("invalid catalog URL '{base}'")]
  InvalidUrl { base: String },

  /// The request never produced a response.
  #[error("request to '{url}' failed: {source}")]
  Transport {
    url: String,
    #[source]
    source: reqwest::Error,
  },

  /// The catalog answered with a non-success status.
  #[error("catalog returned HTTP {status} for '{url}': {body}")]
  Status { url: String, status: u16, body: String },

  /// The response body was not the expected JSON.
  #[error("failed to decode response from '{url}': {source}")]
  Decode {
    url: String,
    body: String,
    #[source]
    source: serde_json::Error,
  },
}

/// Blocking client for the catalog management API.
pub struct CatalogClient {
  http: Client,
  base_url: String,
  token: Box<dyn TokenSource + Send + Sync>,
}

impl std::fmt::Debug for CatalogClient {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("CatalogClient").field("base_url", &self.base_url).finish_non_exhaustive()
  }
}

impl CatalogClient {
  pub fn new(
    base_url: impl Into<String>,
    token: impl TokenSource + Send + Sync + 'static,
    timeout: Duration,
  ) -> Result<Self, CatalogError> {
    Ok(Self {
      http: build_client(timeout).map_err(CatalogError::Client)?,
      base_url: base_url.into(),
      token: Box::new(token),
    })
  }

  fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, CatalogError> {
    let url = endpoint(&self.base_url, segments).ok_or_else(|| CatalogError::InvalidUrl {
      base: self.base_url.clone(),
    })?;
    debug!(url = %url, "catalog request");

    let response = self
      .http
      .get(url.clone())
      .header(reqwest::header::AUTHORIZATION, bearer(self.token.as_ref())?)
      .header(reqwest::header::ACCEPT, "application/json")
      .send()
      .map_err(|source| CatalogError::Transport {
        url: url.to_string(),
        source,
      })?;

    let url = url.to_string();
    let (status, body) = read_response(response).map_err(|source| CatalogError::Transport {
      url: url.clone(),
      source,
    })?;

    if !(200..300).contains(&status) {
      return Err(CatalogError::Status { url, status, body });
    }

    serde_json::from_str(&body).map_err(|source| CatalogError::Decode { url, body, source })
  }
}

impl ComponentReferenceGetter for CatalogClient {
  type Error = CatalogError;

  fn get_component_references(&self, version_locator: &str) -> Result<OfferingReferenceResponse, CatalogError> {
    self.get_json(&["versions", version_locator, "dependencies"])
  }
}

impl OfferingLookup for CatalogClient {
  type Error = CatalogError;

  fn get_offering(&self, catalog_id: &str, offering_id: &str) -> Result<Offering, CatalogError> {
    self.get_json(&["catalogs", catalog_id, "offerings", offering_id])
  }
}
