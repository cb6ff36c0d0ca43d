// src/scaffold.rs
//! Forward-only scaffolding state machine.
//!
//! Each call to [`Scaffolder::advance`] performs one step and returns the next
//! [`Stage`], or the error that aborts the run. Nothing is rolled back on abort:
//! files written by earlier steps stay on disk, and a re-run relies on the
//! directory-conflict check to offer an overwrite.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, error, info, warn};
use url::Url;

use crate::config::ScaffoldManifest;
use crate::error::ScaffoldError;
use crate::fetch::{self, DocumentFetcher};
use crate::gate::{Decision, DecisionGate};
use crate::runner::{CommandRunner, CommandSpec};
use crate::template;
use crate::validate::{self, APP, PACKAGE, TENANT};

/// Immutable input for one run.
#[derive(Debug, Clone)]
pub struct ScaffoldRequest {
  /// Absolute path of the project to create.
  pub target_path: PathBuf,
  /// Absolute path of the template tree (read only).
  pub template_path: PathBuf,
  /// Tag name -> value for `{{tag}}` substitution.
  pub substitutions: BTreeMap<String, String>,
  pub force_overwrite: bool,
  pub auto_mode: bool,
}

/// Where the interface document comes from, if anywhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentSource {
  None,
  /// Engine URL derived from the `tenant`, `app` and `package` substitutions.
  Engine { cloud_domain: String },
  /// Explicit URL; `package` names the persisted file.
  Url { url: Url, package: String },
}

#[derive(Debug, Clone)]
pub struct ClientGeneration {
  pub command: CommandSpec,
  /// Ask the `generateClient` gate before running.
  pub confirm: bool,
}

/// Mode-specific parts of a run.
#[derive(Debug, Clone)]
pub struct ScaffoldPlan {
  pub required: Vec<&'static str>,
  pub document: DocumentSource,
  pub install: CommandSpec,
  pub generate: Option<ClientGeneration>,
  pub build: Option<CommandSpec>,
  pub next_steps: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
  Init,
  ConfigResolved,
  DirectoryPrepared,
  Materialized,
  DocumentFetched,
  DependenciesInstalled,
  ClientGenerated,
  Built,
  Done,
}

impl Stage {
  /// Human name of the step that leaves this stage.
  fn step(self) -> &'static str {
    match self {
      Stage::Init => "validating input",
      Stage::ConfigResolved => "preparing the project directory",
      Stage::DirectoryPrepared => "copying template files",
      Stage::Materialized => "downloading the interface document",
      Stage::DocumentFetched => "installing dependencies",
      Stage::DependenciesInstalled => "generating the API client",
      Stage::ClientGenerated => "building the project",
      Stage::Built | Stage::Done => "finishing",
    }
  }
}

impl fmt::Display for Stage {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    fmt::Debug::fmt(self, f)
  }
}

/// A target is occupied when something other than an empty directory is at its path.
pub fn target_occupied(target: &Path) -> Result<bool, ScaffoldError> {
  Ok(target.exists() && (!target.is_dir() || template::dir_has_entries(target)?))
}

#[derive(Debug, Clone)]
struct ResolvedDocument {
  url: Url,
  path: PathBuf,
}

pub struct Scaffolder<G, F, R> {
  request: ScaffoldRequest,
  plan: ScaffoldPlan,
  gate: G,
  fetcher: F,
  runner: R,
  manifest: Option<ScaffoldManifest>,
  document: Option<ResolvedDocument>,
}

impl<G, F, R> Scaffolder<G, F, R>
where
  G: DecisionGate,
  F: DocumentFetcher,
  R: CommandRunner,
{
  pub fn new(request: ScaffoldRequest, plan: ScaffoldPlan, gate: G, fetcher: F, runner: R) -> Self {
    Self {
      request,
      plan,
      gate,
      fetcher,
      runner,
      manifest: None,
      document: None,
    }
  }

  /// Drives the machine from `Init` to `Done`, stopping at the first error.
  pub fn run(&mut self) -> Result<(), ScaffoldError> {
    if self.request.auto_mode {
      info!("Auto mode: prompts are answered with their defaults");
    }
    let mut stage = Stage::Init;
    while stage != Stage::Done {
      let next = self.advance(stage).map_err(|e| {
        error!("Aborted while {} ({} failure)", stage.step(), e.kind());
        e
      })?;
      debug!("{} -> {}", stage, next);
      stage = next;
    }

    info!(
      "Project created successfully in {}",
      self.request.target_path.display()
    );
    if !self.plan.next_steps.is_empty() {
      println!("Next steps:");
      for (i, line) in self.plan.next_steps.iter().enumerate() {
        println!("  {}. {}", i + 1, line);
      }
    }
    Ok(())
  }

  /// Performs the single step leaving `stage`.
  pub fn advance(&mut self, stage: Stage) -> Result<Stage, ScaffoldError> {
    match stage {
      Stage::Init => {
        self.resolve_config()?;
        Ok(Stage::ConfigResolved)
      }
      Stage::ConfigResolved => {
        self.prepare_directory()?;
        Ok(Stage::DirectoryPrepared)
      }
      Stage::DirectoryPrepared => {
        self.materialize()?;
        Ok(Stage::Materialized)
      }
      Stage::Materialized => {
        self.fetch_document()?;
        Ok(Stage::DocumentFetched)
      }
      Stage::DocumentFetched => {
        info!("Installing dependencies...");
        self.runner.run(&self.plan.install, &self.request.target_path)?;
        Ok(Stage::DependenciesInstalled)
      }
      Stage::DependenciesInstalled => {
        self.generate_client()?;
        Ok(Stage::ClientGenerated)
      }
      Stage::ClientGenerated => match &self.plan.build {
        Some(build) => {
          info!("Building project...");
          self.runner.run(build, &self.request.target_path)?;
          Ok(Stage::Built)
        }
        None => Ok(Stage::Done),
      },
      Stage::Built | Stage::Done => Ok(Stage::Done),
    }
  }

  // Init -> ConfigResolved: read-only checks, nothing on disk changes.
  fn resolve_config(&mut self) -> Result<(), ScaffoldError> {
    let subs = &self.request.substitutions;
    validate::validate_identifiers(&self.plan.required, subs)?;

    self.document = match &self.plan.document {
      DocumentSource::None => None,
      DocumentSource::Engine { cloud_domain } => {
        let value = |key: &str| {
          subs
            .get(key)
            .map(String::as_str)
            .ok_or_else(|| ScaffoldError::Validation(format!("'{}' is required", key)))
        };
        let package = value(PACKAGE)?;
        let url = fetch::engine_document_url(value(TENANT)?, value(APP)?, package, cloud_domain)?;
        Some(ResolvedDocument {
          url,
          path: fetch::document_path(&self.request.target_path, package),
        })
      }
      DocumentSource::Url { url, package } => Some(ResolvedDocument {
        url: url.clone(),
        path: fetch::document_path(&self.request.target_path, package),
      }),
    };

    self.manifest = Some(ScaffoldManifest::load(&self.request.template_path)?);
    Ok(())
  }

  // ConfigResolved -> DirectoryPrepared. Not guarded against concurrent changes to the target.
  fn prepare_directory(&mut self) -> Result<(), ScaffoldError> {
    let target = &self.request.target_path;

    if target_occupied(target)? {
      let overwrite = self.request.force_overwrite
        || self.gate.decide(
          Decision::Overwrite,
          &format!("Directory {} already exists. Overwrite?", target.display()),
          false,
        );
      if !overwrite {
        return Err(ScaffoldError::DirectoryConflict(target.clone()));
      }

      warn!("Removing existing {}", target.display());
      let removed = if target.is_dir() {
        fs::remove_dir_all(target)
      } else {
        fs::remove_file(target)
      };
      removed.map_err(|e| ScaffoldError::file_op("remove", target, e))?;
    }

    fs::create_dir_all(target).map_err(|e| ScaffoldError::file_op("create directory", target, e))?;
    info!("Creating new project in {}", target.display());
    Ok(())
  }

  // DirectoryPrepared -> Materialized. Partial copies are left in place on failure.
  fn materialize(&mut self) -> Result<(), ScaffoldError> {
    let templated_files = match &self.manifest {
      Some(manifest) => {
        debug!("Template '{}': {}", manifest.name, manifest.description);
        manifest.templated_files.clone()
      }
      None => Vec::new(),
    };

    info!(
      "Copying template files from {}",
      self.request.template_path.display()
    );
    let copied = template::materialize(&self.request.template_path, &self.request.target_path)?;
    debug!("Copied {} files", copied);

    info!("Populating templates...");
    let gaps = template::substitute(
      &self.request.target_path,
      &templated_files,
      &self.request.substitutions,
    )?;
    if !gaps.is_empty() {
      warn!("{} placeholder(s) had no value and were left as-is", gaps.len());
    }
    Ok(())
  }

  fn fetch_document(&mut self) -> Result<(), ScaffoldError> {
    let Some(document) = &self.document else {
      debug!("No interface document to fetch");
      return Ok(());
    };
    info!("Downloading interface document from {}", document.url);
    let json = self.fetcher.fetch_json(&document.url)?;
    fetch::persist(&json, &document.path)
  }

  fn generate_client(&mut self) -> Result<(), ScaffoldError> {
    let Some(generation) = &self.plan.generate else {
      return Ok(());
    };
    if generation.confirm
      && !self.gate.decide(
        Decision::GenerateClient,
        "Would you like to generate the API client now?",
        true,
      )
    {
      info!("Skipping API client generation");
      return Ok(());
    }
    info!("Generating API client...");
    self.runner.run(&generation.command, &self.request.target_path)
  }
}
