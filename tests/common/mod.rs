//! Shared helpers for create-npl CLI tests.

use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Isolated working directory for one CLI invocation.
#[allow(dead_code)]
pub struct TestContext {
  root: TempDir,
}

#[allow(dead_code)]
impl TestContext {
  pub fn new() -> Self {
    let root = TempDir::new().expect("Failed to create temp directory for tests");
    Self { root }
  }

  pub fn work_dir(&self) -> &Path {
    self.root.path()
  }

  pub fn path(&self, relative: &str) -> PathBuf {
    self.root.path().join(relative)
  }

  /// `create-npl` running in the work directory against the bundled templates.
  pub fn cli(&self) -> Command {
    let mut cmd = Command::cargo_bin("create-npl").expect("Failed to locate create-npl binary");
    cmd
      .current_dir(self.work_dir())
      .env("NPL_TEMPLATES_DIR", Path::new(env!("CARGO_MANIFEST_DIR")).join("templates"))
      .env_remove("NPL_CLOUD_DOMAIN")
      .env_remove("NPL_NPM")
      .env_remove("NPL_NPX");
    cmd
  }

  /// Writes an executable stand-in for npm that appends its arguments to `npm.log`.
  #[cfg(unix)]
  pub fn fake_npm(&self, exit_code: i32) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let script = self.path("fake-npm.sh");
    let log = self.path("npm.log");
    fs::write(
      &script,
      format!("#!/bin/sh\necho \"$@\" >> '{}'\nexit {}\n", log.display(), exit_code),
    )
    .expect("Failed to write fake npm");
    fs::set_permissions(&script, fs::Permissions::from_mode(0o755))
      .expect("Failed to mark fake npm executable");
    script
  }

  /// Lines recorded by the fake npm, empty if it never ran.
  pub fn npm_calls(&self) -> Vec<String> {
    fs::read_to_string(self.path("npm.log"))
      .map(|s| s.lines().map(str::to_string).collect())
      .unwrap_or_default()
  }

  pub fn read(&self, relative: &str) -> String {
    fs::read_to_string(self.path(relative))
      .unwrap_or_else(|e| panic!("Failed to read {}: {}", relative, e))
  }
}
