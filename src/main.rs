// src/main.rs
mod cli;
mod config;
mod error;
mod fetch;
mod gate;
mod generate;
mod runner;
mod scaffold;
mod settings;
mod template;
mod validate;

use clap::Parser;
use cli::{Cli, Commands};
use error::ScaffoldError;
use log::LevelFilter;
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

fn main() -> ExitCode {
  let cli = Cli::parse();

  // Setup logging based on verbosity
  let log_level = match cli.verbose {
    0 => LevelFilter::Info,
    1 => LevelFilter::Debug,
    _ => LevelFilter::Trace,
  };
  env_logger::Builder::new()
    .filter_level(log_level)
    .format_timestamp(None)
    .init();

  log::debug!("CLI args: {:?}", cli);

  match run(cli) {
    Ok(()) => ExitCode::SUCCESS,
    Err(e) => {
      log::error!("{}", e);
      ExitCode::FAILURE
    }
  }
}

fn run(cli: Cli) -> Result<(), ScaffoldError> {
  let templates_path = determine_templates_dir(cli.templates_dir)?;
  log::debug!("Using templates directory: {}", templates_path.display());

  match cli.command {
    Commands::Create(args) => generate::run_create(args, &templates_path),
    Commands::Frontend(args) => generate::run_frontend(args, &templates_path),
  }
}

/// Determines the templates directory path.
/// Order of preference:
/// 1. --templates-dir CLI argument (or NPL_TEMPLATES_DIR, via clap's `env`)
/// 2. templates/ subdirectory relative to the executable
/// 3. templates/ subdirectory relative to the current working directory
/// 4. templates/ shipped in this crate's source tree
fn determine_templates_dir(cli_path: Option<PathBuf>) -> Result<PathBuf, ScaffoldError> {
  if let Some(path) = cli_path {
    if path.is_dir() {
      return Ok(path);
    }
    log::warn!(
      "Provided --templates-dir path does not exist or is not a directory: {}",
      path.display()
    );
  }

  if let Ok(mut exe_path) = env::current_exe() {
    exe_path.pop(); // Remove the executable name
    let path = exe_path.join("templates");
    if path.is_dir() {
      return Ok(path);
    }
  }

  if let Ok(cwd) = env::current_dir() {
    let path = cwd.join("templates");
    if path.is_dir() {
      return Ok(path);
    }
  }

  let bundled = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("templates");
  if bundled.is_dir() {
    return Ok(bundled);
  }

  Err(ScaffoldError::CannotDetermineTemplatesDir)
}
