// src/error.rs
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScaffoldError {
  #[error("Invalid input: {0}")]
  Validation(String),

  #[error("Directory '{0}' already exists and is not empty. Use --force to overwrite.")]
  DirectoryConflict(PathBuf),

  #[error("IO Error: {0}")]
  Io(#[from] std::io::Error),

  #[error("Failed to {action} '{path}': {source}")]
  FileOp {
    action: &'static str,
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("Error walking template directory '{path}': {source}")]
  WalkDir {
    path: PathBuf,
    #[source]
    source: walkdir::Error,
  },

  #[error("Could not read scaffold manifest '{manifest_path}': {source}")]
  ManifestRead {
    manifest_path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("Could not parse scaffold manifest '{manifest_path}': {source}")]
  ManifestParse {
    manifest_path: PathBuf,
    #[source]
    source: serde_yaml::Error,
  },

  #[error("Could not fetch '{url}': {cause}")]
  Fetch { url: String, cause: String },

  #[error("Could not serialize interface document: {0}")]
  Serialize(#[from] serde_json::Error),

  #[error("Command `{command} {}` failed with {}", .args.join(" "), describe_exit(.exit_code))]
  CommandFailed {
    command: String,
    args: Vec<String>,
    exit_code: Option<i32>,
  },

  #[error("Could not launch `{command}`: {source}")]
  Launch {
    command: String,
    #[source]
    source: std::io::Error,
  },

  #[error("Could not determine templates directory")]
  CannotDetermineTemplatesDir,
}

fn describe_exit(code: &Option<i32>) -> String {
  match code {
    Some(code) => format!("exit code {}", code),
    None => "no exit code (terminated by signal)".to_string(),
  }
}

impl ScaffoldError {
  /// Short operator-facing name of the failure class.
  pub fn kind(&self) -> &'static str {
    match self {
      ScaffoldError::Validation(_) => "validation",
      ScaffoldError::DirectoryConflict(_) => "directory conflict",
      ScaffoldError::Io(_)
      | ScaffoldError::FileOp { .. }
      | ScaffoldError::WalkDir { .. }
      | ScaffoldError::ManifestRead { .. }
      | ScaffoldError::ManifestParse { .. }
      | ScaffoldError::Serialize(_)
      | ScaffoldError::CannotDetermineTemplatesDir => "io",
      ScaffoldError::Fetch { .. } => "fetch",
      ScaffoldError::CommandFailed { .. } => "command",
      ScaffoldError::Launch { .. } => "launch",
    }
  }

  pub(crate) fn file_op(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
    ScaffoldError::FileOp {
      action,
      path: path.into(),
      source,
    }
  }
}
