// src/settings.rs
//! The `frontend-config.ts` settings file read by the `frontend` command.

use std::fs;
use std::path::Path;

use log::info;
use regex::Regex;

use crate::error::ScaffoldError;

/// Marker host used by the generated settings template.
pub const PLACEHOLDER_DOMAIN: &str = "your-domain.com";

pub const TOKEN_ENDPOINT: &str = "NPL_TOKEN_ENDPOINT";
pub const CLIENT_ID: &str = "NPL_CLIENT_ID";
pub const APPLICATION_URL: &str = "NPL_APPLICATION_URL";
pub const SWAGGER_URL: &str = "NPL_SWAGGER_URL";

const SETTINGS_TEMPLATE: &str = r#"// NPL Frontend Configuration
// Update these values with your actual endpoints and credentials

export const NPL_TOKEN_ENDPOINT = "https://keycloak-your-domain.com/realms/your-realm/protocol/openid-connect/token";
export const NPL_CLIENT_ID = "your-client-id";
export const NPL_APPLICATION_URL = "https://engine-your-domain.com";
export const NPL_SWAGGER_URL = "https://engine-your-domain.com/npl/your-package/-/openapi.json";
"#;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrontendSettings {
  pub token_endpoint: Option<String>,
  pub client_id: Option<String>,
  pub application_url: Option<String>,
  pub swagger_url: Option<String>,
  /// True while the file still carries the template's placeholder host.
  pub has_placeholders: bool,
}

impl FrontendSettings {
  pub fn load(path: &Path) -> Result<Self, ScaffoldError> {
    let text =
      fs::read_to_string(path).map_err(|e| ScaffoldError::file_op("read settings file", path, e))?;
    Ok(Self::parse(&text))
  }

  pub fn parse(text: &str) -> Self {
    Self {
      token_endpoint: extract_constant(text, TOKEN_ENDPOINT),
      client_id: extract_constant(text, CLIENT_ID),
      application_url: extract_constant(text, APPLICATION_URL),
      swagger_url: extract_constant(text, SWAGGER_URL),
      has_placeholders: text.contains(PLACEHOLDER_DOMAIN),
    }
  }

  /// Names of the constants the file does not define.
  pub fn missing(&self) -> Vec<&'static str> {
    [
      (TOKEN_ENDPOINT, &self.token_endpoint),
      (CLIENT_ID, &self.client_id),
      (APPLICATION_URL, &self.application_url),
      (SWAGGER_URL, &self.swagger_url),
    ]
    .into_iter()
    .filter(|(_, value)| value.is_none())
    .map(|(name, _)| name)
    .collect()
  }
}

/// Pulls `value` out of `NAME = "value"`.
pub fn extract_constant(text: &str, name: &str) -> Option<String> {
  let pattern = format!(r#"{}\s*=\s*"([^"]+)""#, regex::escape(name));
  let re = Regex::new(&pattern).ok()?;
  re.captures(text).map(|caps| caps[1].to_string())
}

/// Writes the placeholder settings file the operator is expected to edit.
pub fn write_template(path: &Path) -> Result<(), ScaffoldError> {
  if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
    fs::create_dir_all(parent).map_err(|e| ScaffoldError::file_op("create directory", parent, e))?;
  }
  fs::write(path, SETTINGS_TEMPLATE)
    .map_err(|e| ScaffoldError::file_op("write settings file", path, e))?;
  info!("Created template settings file at {}", path.display());
  info!("Update the values in {} before running the application", path.display());
  Ok(())
}
