//! Version constraint matching.
//!
//! The resolver only needs "pick the best of these versions for this constraint",
//! so matching sits behind [`VersionMatcher`]. [`SemverMatcher`] is the default
//! implementation and delegates the comparison rules to the `semver` crate.
//!
//! Supported constraint forms:
//! - Exact version: `"8.18.0"` or `"v8.18.0"`
//! - Caret: `"^8.18"` means >=8.18.0 <9.0.0
//! - Tilde: `"~8.18"` means >=8.18.0 <8.19.0
//! - Dual bounds: `">=8.0.0,<=8.20.0"`
//! - Latest: `""` or `"latest"`

use semver::{Version, VersionReq};
use tracing::{debug, trace};

/// Selects the best version string for a constraint expression.
pub trait VersionMatcher {
  /// Return the best match from `available`, or `None` if nothing satisfies `constraint`.
  fn best_match(&self, available: &[String], constraint: &str) -> Option<String>;
}

/// [`VersionMatcher`] backed by semantic version requirements.
///
/// A leading `v` is accepted on both available versions and constraint operands.
/// The returned string is the catalog's original spelling of the highest match.
#[derive(Debug, Clone, Copy, Default)]
pub struct SemverMatcher;

impl VersionMatcher for SemverMatcher {
  fn best_match(&self, available: &[String], constraint: &str) -> Option<String> {
    let req = match parse_constraint(constraint) {
      Some(req) => req,
      None => {
        debug!(constraint, "unparseable version constraint");
        return None;
      }
    };

    let mut best: Option<(Version, &String)> = None;
    for candidate in available {
      let Some(version) = parse_version(candidate) else {
        trace!(version = %candidate, "skipping non-semver version");
        continue;
      };
      if !req.matches(&version) {
        continue;
      }
      if best.as_ref().is_none_or(|(current, _)| version > *current) {
        best = Some((version, candidate));
      }
    }

    best.map(|(_, original)| original.clone())
  }
}

/// Parse a catalog version string, tolerating a leading `v`.
pub fn parse_version(raw: &str) -> Option<Version> {
  Version::parse(strip_v(raw.trim())).ok()
}

/// Translate a constraint expression into a [`VersionReq`].
///
/// Bare versions are exact matches rather than the crate's implicit caret.
pub fn parse_constraint(constraint: &str) -> Option<VersionReq> {
  let constraint = constraint.trim();
  if constraint.is_empty() || constraint.eq_ignore_ascii_case("latest") {
    return Some(VersionReq::STAR);
  }

  let mut comparators = Vec::new();
  for part in constraint.split(',') {
    let part = part.trim();
    if part.is_empty() {
      return None;
    }
    let operand_start = part.find(|c: char| !matches!(c, '^' | '~' | '=' | '<' | '>')).unwrap_or(part.len());
    let (op, operand) = part.split_at(operand_start);
    let operand = strip_v(operand.trim());
    if operand.is_empty() {
      return None;
    }
    let op = if op.is_empty() { "=" } else { op };
    comparators.push(format!("{}{}", op, operand));
  }

  VersionReq::parse(&comparators.join(", ")).ok()
}

fn strip_v(raw: &str) -> &str {
  raw.strip_prefix(['v', 'V']).unwrap_or(raw)
}
