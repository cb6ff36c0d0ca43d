// src/validate.rs
use std::collections::BTreeMap;

use log::debug;
use regex::Regex;

use crate::error::ScaffoldError;

pub const NAME: &str = "name";
pub const TENANT: &str = "tenant";
pub const APP: &str = "app";
pub const PACKAGE: &str = "package";

/// Pattern each identifier must match. Tenant and app end up in a DNS label.
fn pattern_for(key: &str) -> Option<&'static str> {
  match key {
    NAME => Some(r"^[A-Za-z0-9][A-Za-z0-9._-]*$"),
    TENANT | APP => Some(r"^[a-z0-9][a-z0-9-]*$"),
    PACKAGE => Some(r"^[A-Za-z0-9_.-]+$"),
    _ => None,
  }
}

/// Checks that every `required` key is present, non-blank and well-formed.
/// All problems are reported together.
pub fn validate_identifiers(
  required: &[&str],
  values: &BTreeMap<String, String>,
) -> Result<(), ScaffoldError> {
  let mut problems = Vec::new();

  for key in required {
    let Some(value) = values.get(*key).filter(|v| !v.trim().is_empty()) else {
      problems.push(format!("'{}' is required", key));
      continue;
    };
    if value.contains("{{") || value.contains("}}") {
      problems.push(format!("'{}' must not contain template tags (got '{}')", key, value));
      continue;
    }
    if let Some(pattern) = pattern_for(key) {
      let re = Regex::new(pattern).expect("identifier patterns are valid");
      if !re.is_match(value) {
        problems.push(format!("'{}' must match {} (got '{}')", key, pattern, value));
      }
    }
  }

  if problems.is_empty() {
    debug!("Identifiers valid: {:?}", required);
    Ok(())
  } else {
    Err(ScaffoldError::Validation(problems.join("; ")))
  }
}
