// src/fetch.rs
//! Retrieval and persistence of the engine's interface-description (OpenAPI) document.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};
use reqwest::blocking::Client;
use serde_json::Value;
use url::Url;

use crate::error::ScaffoldError;

pub const DEFAULT_CLOUD_DOMAIN: &str = "noumena.cloud";
pub const DOCUMENT_DIR: &str = "openapi";

/// Source of the interface document. The document body is opaque JSON.
pub trait DocumentFetcher {
  fn fetch_json(&self, url: &Url) -> Result<Value, ScaffoldError>;
}

/// Single GET per call; no retries, transport-default timeout.
#[derive(Debug, Clone)]
pub struct HttpDocumentFetcher {
  client: Client,
}

impl HttpDocumentFetcher {
  pub fn new() -> Result<Self, ScaffoldError> {
    let client = Client::builder()
      .user_agent(concat!("create-npl/", env!("CARGO_PKG_VERSION")))
      .build()
      .map_err(|e| ScaffoldError::Fetch {
        url: String::new(),
        cause: format!("failed to create HTTP client: {}", e),
      })?;
    Ok(Self { client })
  }
}

impl DocumentFetcher for HttpDocumentFetcher {
  fn fetch_json(&self, url: &Url) -> Result<Value, ScaffoldError> {
    let fetch_err = |cause: String| ScaffoldError::Fetch {
      url: url.to_string(),
      cause,
    };

    debug!("GET {}", url);
    let response = self
      .client
      .get(url.clone())
      .send()
      .map_err(|e| fetch_err(format!("request failed: {}", e)))?;

    let status = response.status();
    if !status.is_success() {
      return Err(fetch_err(format!("HTTP status {}", status)));
    }

    response
      .json::<Value>()
      .map_err(|e| fetch_err(format!("response is not valid JSON: {}", e)))
  }
}

/// `https://engine-<tenant>-<app>.<cloud-domain>/npl/<package>/-/openapi.json`
pub fn engine_document_url(
  tenant: &str,
  app: &str,
  package: &str,
  cloud_domain: &str,
) -> Result<Url, ScaffoldError> {
  let raw = format!(
    "https://engine-{}-{}.{}/npl/{}/-/openapi.json",
    tenant, app, cloud_domain, package
  );
  Url::parse(&raw).map_err(|e| ScaffoldError::Validation(format!("invalid engine URL '{}': {}", raw, e)))
}

/// `<project>/openapi/<package>-openapi.json`
pub fn document_path(project_root: &Path, package: &str) -> PathBuf {
  project_root
    .join(DOCUMENT_DIR)
    .join(format!("{}-openapi.json", package))
}

/// Writes `json` pretty-printed (two-space indent), creating parent directories.
pub fn persist(json: &Value, path: &Path) -> Result<(), ScaffoldError> {
  if let Some(parent) = path.parent() {
    fs::create_dir_all(parent).map_err(|e| ScaffoldError::file_op("create directory", parent, e))?;
  }
  let body = serde_json::to_string_pretty(json)?;
  fs::write(path, body).map_err(|e| ScaffoldError::file_op("write interface document", path, e))?;
  info!("Saved interface document to {}", path.display());
  Ok(())
}
