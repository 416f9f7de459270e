//! Deployment submission.
//!
//! [`DeploymentSubmitter`] is the seam the orchestrator posts requests through;
//! [`ProjectsClient`] implements it against the projects API.

use std::time::Duration;

use reqwest::blocking::Client;
use thiserror::Error;
use tracing::{debug, info};

use super::types::{DeployRequestEntry, DeployedAddonsDetails};
use crate::auth::{AuthError, TokenSource, bearer};
use crate::util::http::{build_client, endpoint, read_response};

/// Errors that can occur while submitting a deployment.
#[derive(Debug, Error)]
pub enum SubmitError {
  /// The HTTP client could not be constructed.
  #[error("failed to create HTTP client: {0}")]
  Client(#[source] reqwest::Error),

  #[error(transparent)]
  Auth(#[from] AuthError),

  /// The configured base URL cannot be extended with a path.
  #[error("invalid projects URL '{base}'")]
  InvalidUrl { base: String },

  /// The request never produced a response.
  #[error("deployment request to '{url}' failed: {source}")]
  Transport {
    url: String,
    #[source]
    source: reqwest::Error,
  },

  /// The API answered with a non-success status.
  #[error("deployment to '{url}' returned HTTP {status}: {body}")]
  Status { url: String, status: u16, body: String },

  /// The response body was not the expected JSON.
  #[error("failed to decode deployment response: {source} (body: {body})")]
  Decode {
    body: String,
    #[source]
    source: serde_json::Error,
  },
}

/// Submits a flat deployment request to a project.
pub trait DeploymentSubmitter {
  fn submit(&self, project_id: &str, entries: &[DeployRequestEntry]) -> Result<DeployedAddonsDetails, SubmitError>;
}

impl<T: DeploymentSubmitter + ?Sized> DeploymentSubmitter for &T {
  fn submit(&self, project_id: &str, entries: &[DeployRequestEntry]) -> Result<DeployedAddonsDetails, SubmitError> {
    (**self).submit(project_id, entries)
  }
}

/// Blocking client for the projects API.
pub struct ProjectsClient {
  http: Client,
  base_url: String,
  token: Box<dyn TokenSource + Send + Sync>,
}

impl std::fmt::Debug for ProjectsClient {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("ProjectsClient").field("base_url", &self.base_url).finish_non_exhaustive()
  }
}

impl ProjectsClient {
  pub fn new(
    base_url: impl Into<String>,
    token: impl TokenSource + Send + Sync + 'static,
    timeout: Duration,
  ) -> Result<Self, SubmitError> {
    Ok(Self {
      http: build_client(timeout).map_err(SubmitError::Client)?,
      base_url: base_url.into(),
      token: Box::new(token),
    })
  }
}

impl DeploymentSubmitter for ProjectsClient {
  fn submit(&self, project_id: &str, entries: &[DeployRequestEntry]) -> Result<DeployedAddonsDetails, SubmitError> {
    let url = endpoint(&self.base_url, &["v1", "projects", project_id, "container"]).ok_or_else(|| {
      SubmitError::InvalidUrl {
        base: self.base_url.clone(),
      }
    })?;

    info!(project_id, configs = entries.len(), "submitting deployment");
    debug!(url = %url, ?entries, "deployment request");

    let response = self
      .http
      .post(url.clone())
      .header(reqwest::header::AUTHORIZATION, bearer(self.token.as_ref())?)
      .header(reqwest::header::ACCEPT, "application/json")
      .json(entries)
      .send()
      .map_err(|source| SubmitError::Transport {
        url: url.to_string(),
        source,
      })?;

    let url = url.to_string();
    let (status, body) = read_response(response).map_err(|source| SubmitError::Transport {
      url: url.clone(),
      source,
    })?;

    if !(200..300).contains(&status) {
      return Err(SubmitError::Status { url, status, body });
    }

    serde_json::from_str(&body).map_err(|source| SubmitError::Decode { body, source })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::auth::StaticToken;

  fn entries() -> Vec<DeployRequestEntry> {
    vec![DeployRequestEntry {
      version_locator: "cat.db".to_string(),
      name: "test-db".to_string(),
      config_id: None,
    }]
  }

  fn client(server: &mockito::Server) -> ProjectsClient {
    ProjectsClient::new(server.url(), StaticToken::new("tok"), Duration::from_secs(5)).unwrap()
  }

  #[test]
  fn posts_entries_and_parses_configs() {
    let mut server = mockito::Server::new();
    let mock = server
      .mock("POST", "/v1/projects/p1/container")
      .match_header("authorization", "Bearer tok")
      .match_body(mockito::Matcher::Json(serde_json::json!([
        {"version_locator": "cat.db", "name": "test-db"}
      ])))
      .with_status(201)
      .with_body(r#"{"project_id":"p1","configs":[{"name":"test-db","config_id":"c1"}]}"#)
      .create();

    let details = client(&server).submit("p1", &entries()).unwrap();

    mock.assert();
    assert_eq!(details.project_id, "p1");
    assert_eq!(details.configs[0].config_id, "c1");
  }

  #[test]
  fn non_success_carries_status_and_raw_body() {
    let mut server = mockito::Server::new();
    server
      .mock("POST", "/v1/projects/p1/container")
      .with_status(409)
      .with_body(r#"{"errors":[{"message":"name in use"}]}"#)
      .create();

    match client(&server).submit("p1", &entries()) {
      Err(SubmitError::Status { status, body, .. }) => {
        assert_eq!(status, 409);
        assert!(body.contains("name in use"));
      }
      other => panic!("expected Status error, got {:?}", other),
    }
  }

  #[test]
  fn project_id_is_sent_as_a_single_path_segment() {
    let mut server = mockito::Server::new();
    let mock = server
      .mock("POST", "/v1/projects/team%2Fp1%3Fx/container")
      .match_header("content-type", "application/json")
      .with_status(200)
      .with_body(r#"{"project_id":"team/p1?x","configs":[]}"#)
      .create();

    let details = client(&server).submit("team/p1?x", &entries()).unwrap();

    mock.assert();
    assert_eq!(details.project_id, "team/p1?x");
  }

  #[test]
  fn malformed_response_is_decode_error() {
    let mut server = mockito::Server::new();
    server
      .mock("POST", "/v1/projects/p1/container")
      .with_status(200)
      .with_body("<html>")
      .create();

    let result = client(&server).submit("p1", &entries());
    assert!(matches!(result, Err(SubmitError::Decode { .. })));
  }
}
