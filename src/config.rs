// src/config.rs
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ScaffoldError;

pub const MANIFEST_FILE: &str = "scaffold.yaml";

#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)] // Catch typos in yaml
#[serde(rename_all = "camelCase")]
pub struct ScaffoldManifest {
  pub name: String,
  #[serde(default)]
  pub description: String,
  /// Files (relative to the project root) rewritten with `{{tag}}` substitution after the copy.
  #[serde(default)]
  pub templated_files: Vec<PathBuf>,
}

impl ScaffoldManifest {
  /// Loads `scaffold.yaml` from the root of a template tree.
  pub fn load(template_path: &Path) -> Result<Self, ScaffoldError> {
    read_and_parse_manifest(&template_path.join(MANIFEST_FILE))
  }
}

pub(crate) fn read_and_parse_manifest(manifest_path: &Path) -> Result<ScaffoldManifest, ScaffoldError> {
  let content = fs::read_to_string(manifest_path).map_err(|e| ScaffoldError::ManifestRead {
    manifest_path: manifest_path.to_path_buf(),
    source: e,
  })?;
  serde_yaml::from_str(&content).map_err(|e| ScaffoldError::ManifestParse {
    manifest_path: manifest_path.to_path_buf(),
    source: e,
  })
}
