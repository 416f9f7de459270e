//! Shared utilities.
//!
//! HTTP client helpers used by the API clients, plus in-memory fakes for tests.

pub mod http;

#[cfg(test)]
pub mod testutil;
