// src/template.rs
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, trace, warn};
use regex::{Captures, Regex};
use walkdir::WalkDir;

use crate::config::MANIFEST_FILE;
use crate::error::ScaffoldError;

fn tag_regex() -> &'static Regex {
  static TAG: OnceLock<Regex> = OnceLock::new();
  TAG.get_or_init(|| Regex::new(r"\{\{\s*([A-Za-z0-9_.-]+)\s*\}\}").expect("tag pattern is valid"))
}

/// Copies every file and directory under `template_path` into `output_path`.
///
/// `output_path` must be absent or empty. File contents are copied byte-for-byte
/// (permissions included) and symlinks are recreated as symlinks; the template's
/// own `scaffold.yaml` is left behind. Returns the number of entries copied.
pub fn materialize(template_path: &Path, output_path: &Path) -> Result<u64, ScaffoldError> {
  debug!(
    "Copying template from {} to {}",
    template_path.display(),
    output_path.display()
  );

  if !template_path.is_dir() {
    return Err(ScaffoldError::file_op(
      "read template directory",
      template_path,
      std::io::Error::new(std::io::ErrorKind::NotFound, "not a directory"),
    ));
  }
  if dir_has_entries(output_path)? {
    return Err(ScaffoldError::DirectoryConflict(output_path.to_path_buf()));
  }
  fs::create_dir_all(output_path)
    .map_err(|e| ScaffoldError::file_op("create directory", output_path, e))?;

  // Collect first so the progress bar knows its length.
  let mut entries = Vec::new();
  for entry in WalkDir::new(template_path).sort_by_file_name() {
    let entry = entry.map_err(|e| ScaffoldError::WalkDir {
      path: template_path.to_path_buf(),
      source: e,
    })?;
    if entry.path() == template_path {
      continue;
    }
    entries.push(entry);
  }
  let file_count = entries.iter().filter(|e| !e.file_type().is_dir()).count() as u64;
  debug!("Total files to copy: {}", file_count);

  let pb = ProgressBar::new(file_count);
  if let Ok(style) = ProgressStyle::default_bar()
    .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
  {
    pb.set_style(style.progress_chars("#>-"));
  }
  pb.set_message("Copying files...");

  let mut copied = 0;
  for entry in entries {
    let current_path = entry.path();
    let relative_path = current_path
      .strip_prefix(template_path)
      .expect("walkdir yields paths under its root");
    let output_entry_path = output_path.join(relative_path);

    if entry.file_type().is_dir() {
      trace!("Creating directory: {}", output_entry_path.display());
      fs::create_dir_all(&output_entry_path)
        .map_err(|e| ScaffoldError::file_op("create directory", &output_entry_path, e))?;
    } else if entry.file_type().is_file() {
      if entry.depth() == 1 && relative_path == Path::new(MANIFEST_FILE) {
        continue;
      }
      pb.set_message(format!("{}", relative_path.display()));
      trace!("Copying file to: {}", output_entry_path.display());
      fs::copy(current_path, &output_entry_path)
        .map_err(|e| ScaffoldError::file_op("copy file to", &output_entry_path, e))?;
      copied += 1;
      pb.inc(1);
    } else if entry.file_type().is_symlink() {
      trace!("Linking: {}", output_entry_path.display());
      copy_symlink(current_path, &output_entry_path)?;
      copied += 1;
      pb.inc(1);
    } else {
      warn!("Skipping special file in template: {}", current_path.display());
    }
  }

  pb.finish_and_clear();
  Ok(copied)
}

#[cfg(unix)]
fn copy_symlink(source: &Path, dest: &Path) -> Result<(), ScaffoldError> {
  let target = fs::read_link(source).map_err(|e| ScaffoldError::file_op("read link", source, e))?;
  std::os::unix::fs::symlink(&target, dest).map_err(|e| ScaffoldError::file_op("create link", dest, e))
}

#[cfg(not(unix))]
fn copy_symlink(source: &Path, dest: &Path) -> Result<(), ScaffoldError> {
  warn!("Copying the target of link {} instead of the link itself", source.display());
  fs::copy(source, dest)
    .map(|_| ())
    .map_err(|e| ScaffoldError::file_op("copy file to", dest, e))
}

/// Rewrites each listed file (relative to `project_root`) in place, replacing `{{tag}}`
/// with `view[tag]`. Tags absent from the view are left untouched; each one is logged
/// and returned with the file it was found in.
pub fn substitute(
  project_root: &Path,
  files: &[PathBuf],
  view: &BTreeMap<String, String>,
) -> Result<Vec<(PathBuf, String)>, ScaffoldError> {
  let mut gaps = Vec::new();
  for relative in files {
    let path = project_root.join(relative);
    let content =
      fs::read_to_string(&path).map_err(|e| ScaffoldError::file_op("read templated file", &path, e))?;
    let (rendered, unresolved) = render(&content, view);
    fs::write(&path, rendered).map_err(|e| ScaffoldError::file_op("write templated file", &path, e))?;
    debug!("Populated {}", relative.display());
    for tag in unresolved {
      warn!("Unresolved placeholder '{{{{{}}}}}' left in {}", tag, relative.display());
      gaps.push((relative.clone(), tag));
    }
  }
  Ok(gaps)
}

/// Renders `{{tag}}` occurrences from `view`; returns the output and the names of tags
/// that had no value.
pub fn render(content: &str, view: &BTreeMap<String, String>) -> (String, Vec<String>) {
  let mut unresolved = Vec::new();
  let rendered = tag_regex().replace_all(content, |caps: &Captures| match view.get(&caps[1]) {
    Some(value) => value.clone(),
    None => {
      if !unresolved.iter().any(|t: &String| t.as_str() == &caps[1]) {
        unresolved.push(caps[1].to_string());
      }
      caps[0].to_string()
    }
  });
  (rendered.into_owned(), unresolved)
}

pub(crate) fn dir_has_entries(path: &Path) -> Result<bool, ScaffoldError> {
  if !path.exists() {
    return Ok(false);
  }
  let mut entries =
    fs::read_dir(path).map_err(|e| ScaffoldError::file_op("read directory", path, e))?;
  Ok(entries.next().is_some())
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::tempdir;

  fn view() -> BTreeMap<String, String> {
    [("name", "demo"), ("tenant", "acme"), ("app", "iou"), ("package", "objects")]
      .into_iter()
      .map(|(k, v)| (k.to_string(), v.to_string()))
      .collect()
  }

  #[test]
  fn render_replaces_all_known_tags() {
    let (out, unresolved) = render("{{name}} {{tenant}}-{{app}}/{{ package }}", &view());
    assert_eq!(out, "demo acme-iou/objects");
    assert!(!out.contains("{{"));
    assert!(unresolved.is_empty());
  }

  #[test]
  fn render_keeps_unknown_tags_verbatim() {
    let (out, unresolved) = render("title={{title}} name={{name}} again={{title}}", &view());
    assert_eq!(out, "title={{title}} name=demo again={{title}}");
    assert_eq!(unresolved, vec!["title".to_string()]);
  }

  #[test]
  fn materialize_copies_tree_and_skips_manifest() {
    let src = tempdir().unwrap();
    fs::create_dir_all(src.path().join("src/services")).unwrap();
    fs::write(src.path().join("src/services/api.ts"), "export {}").unwrap();
    fs::write(src.path().join("package.json"), "{\"name\": \"{{name}}\"}").unwrap();
    fs::write(src.path().join(MANIFEST_FILE), "name: t").unwrap();

    let out = tempdir().unwrap();
    let dest = out.path().join("project");
    let copied = materialize(src.path(), &dest).unwrap();

    assert_eq!(copied, 2);
    assert_eq!(fs::read_to_string(dest.join("src/services/api.ts")).unwrap(), "export {}");
    assert!(dest.join("package.json").is_file());
    assert!(!dest.join(MANIFEST_FILE).exists());
  }

  #[cfg(unix)]
  #[test]
  fn materialize_preserves_permissions() {
    use std::os::unix::fs::PermissionsExt;

    let src = tempdir().unwrap();
    let script = src.path().join("run.sh");
    fs::write(&script, "#!/bin/sh\n").unwrap();
    fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();

    let out = tempdir().unwrap();
    let dest = out.path().join("p");
    materialize(src.path(), &dest).unwrap();

    let mode = fs::metadata(dest.join("run.sh")).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o755);
  }

  #[test]
  fn materialize_refuses_non_empty_destination() {
    let src = tempdir().unwrap();
    fs::write(src.path().join("a.txt"), "a").unwrap();
    let dest = tempdir().unwrap();
    fs::write(dest.path().join("keep.txt"), "keep").unwrap();

    let err = materialize(src.path(), dest.path()).unwrap_err();
    assert!(matches!(err, ScaffoldError::DirectoryConflict(_)));
    assert_eq!(fs::read_to_string(dest.path().join("keep.txt")).unwrap(), "keep");
  }

  #[test]
  fn substitute_rewrites_listed_files_only() {
    let root = tempdir().unwrap();
    fs::write(root.path().join(".env"), "VITE_TENANT={{tenant}}\n").unwrap();
    fs::write(root.path().join("README.md"), "{{name}}").unwrap();

    let gaps = substitute(root.path(), &[PathBuf::from(".env")], &view()).unwrap();

    assert!(gaps.is_empty());
    assert_eq!(fs::read_to_string(root.path().join(".env")).unwrap(), "VITE_TENANT=acme\n");
    assert_eq!(fs::read_to_string(root.path().join("README.md")).unwrap(), "{{name}}");
  }

  #[test]
  fn substitute_reports_unresolved_tags_per_file() {
    let root = tempdir().unwrap();
    fs::write(root.path().join("index.html"), "<title>{{name}} {{title}}</title>").unwrap();
    fs::write(root.path().join(".env"), "A={{app}}\nB={{region}}\nC={{region}}\n").unwrap();

    let gaps = substitute(
      root.path(),
      &[PathBuf::from("index.html"), PathBuf::from(".env")],
      &view(),
    )
    .unwrap();

    assert_eq!(
      gaps,
      vec![
        (PathBuf::from("index.html"), "title".to_string()),
        (PathBuf::from(".env"), "region".to_string()),
      ]
    );
    assert_eq!(
      fs::read_to_string(root.path().join("index.html")).unwrap(),
      "<title>demo {{title}}</title>"
    );
  }

  #[cfg(unix)]
  #[test]
  fn materialize_recreates_symlinks() {
    let src = tempdir().unwrap();
    fs::create_dir_all(src.path().join("public")).unwrap();
    fs::write(src.path().join("public/logo.svg"), "<svg/>").unwrap();
    std::os::unix::fs::symlink("public/logo.svg", src.path().join("favicon.svg")).unwrap();

    let out = tempdir().unwrap();
    let dest = out.path().join("p");
    let copied = materialize(src.path(), &dest).unwrap();

    assert_eq!(copied, 2);
    let link = dest.join("favicon.svg");
    assert!(fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
    assert_eq!(fs::read_link(&link).unwrap(), PathBuf::from("public/logo.svg"));
    assert_eq!(fs::read_to_string(&link).unwrap(), "<svg/>");
  }

  #[test]
  fn substitute_fails_on_missing_file() {
    let root = tempdir().unwrap();
    let err = substitute(root.path(), &[PathBuf::from("index.html")], &view()).unwrap_err();
    assert!(matches!(err, ScaffoldError::FileOp { .. }));
  }
}
