//! Shared HTTP client construction.

use std::time::Duration;

use reqwest::Url;
use reqwest::blocking::{Client, Response};

use crate::consts::APP_NAME;

/// Build a blocking client with the crate's user agent and a request timeout.
pub fn build_client(timeout: Duration) -> reqwest::Result<Client> {
  Client::builder()
    .user_agent(user_agent())
    .timeout(timeout)
    .build()
}

fn user_agent() -> String {
  format!("{}/{}", APP_NAME, env!("CARGO_PKG_VERSION"))
}

/// Drain a response into its status code and raw body text.
pub fn read_response(response: Response) -> reqwest::Result<(u16, String)> {
  let status = response.status().as_u16();
  let body = response.text()?;
  Ok((status, body))
}

/// Append path segments to a base URL, percent-encoding each one.
///
/// Segments never introduce extra path levels, a query or a fragment, so ids
/// containing `/`, `?` or `#` stay inside their own segment. Returns `None`
/// if `base` is not a URL that can carry a path.
pub fn endpoint(base: &str, segments: &[&str]) -> Option<Url> {
  let mut url = Url::parse(base).ok()?;
  url.path_segments_mut().ok()?.pop_if_empty().extend(segments);
  Some(url)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn endpoint_normalizes_slashes() {
    let expected = "https://x/api/v1/a";
    assert_eq!(endpoint("https://x/api/", &["v1", "a"]).unwrap().as_str(), expected);
    assert_eq!(endpoint("https://x/api", &["v1", "a"]).unwrap().as_str(), expected);
    assert_eq!(endpoint("https://x", &["v1"]).unwrap().as_str(), "https://x/v1");
  }

  #[test]
  fn endpoint_encodes_reserved_characters() {
    let url = endpoint("https://x/api", &["projects", "a/b?c#d", "container"]).unwrap();
    assert_eq!(url.path(), "/api/projects/a%2Fb%3Fc%23d/container");
    assert!(url.query().is_none());
    assert!(url.fragment().is_none());
  }

  #[test]
  fn endpoint_rejects_unusable_base() {
    assert!(endpoint("not a url", &["v1"]).is_none());
    assert!(endpoint("mailto:someone@example.com", &["v1"]).is_none());
  }
}
