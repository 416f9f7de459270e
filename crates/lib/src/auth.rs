//! Bearer token sources for the catalog and project APIs.

use std::fmt;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
  /// No token was configured.
  #[error("no API token configured (set {var})")]
  MissingToken { var: &'static str },
}

/// Supplies the bearer token attached to API requests.
pub trait TokenSource {
  fn token(&self) -> Result<String, AuthError>;
}

/// A token fixed at construction time.
#[derive(Clone)]
pub struct StaticToken(String);

impl StaticToken {
  pub fn new(token: impl Into<String>) -> Self {
    Self(token.into())
  }
}

impl fmt::Debug for StaticToken {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("StaticToken(<redacted>)")
  }
}

impl TokenSource for StaticToken {
  fn token(&self) -> Result<String, AuthError> {
    if self.0.is_empty() {
      return Err(AuthError::MissingToken {
        var: crate::consts::ENV_API_TOKEN,
      });
    }
    Ok(self.0.clone())
  }
}

/// Format an `Authorization` header value.
pub fn bearer(source: &dyn TokenSource) -> Result<String, AuthError> {
  Ok(format!("Bearer {}", source.token()?))
}
