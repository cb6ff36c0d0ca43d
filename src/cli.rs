// src/cli.rs
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::fetch::DEFAULT_CLOUD_DOMAIN;

#[derive(Parser, Debug)]
#[command(
    name = "create-npl",
    author,
    version,
    about = "Scaffolds frontend projects wired to an NPL engine.",
    long_about = None
)]
pub struct Cli {
  #[command(subcommand)]
  pub command: Commands,

  /// Increase verbosity level (e.g., -v, -vv)
  #[arg(short, long, action = clap::ArgAction::Count, global = true)]
  pub verbose: u8,

  /// Directory holding the template trees
  #[arg(long, global = true)]
  #[clap(env = "NPL_TEMPLATES_DIR")]
  pub templates_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
  /// Create a React project for an NPL package hosted on NOUMENA Cloud
  Create(CreateArgs),
  /// Create a lightweight frontend driven by a frontend-config.ts settings file
  Frontend(FrontendArgs),
}

// Identifiers are optional here so a missing one is reported by the scaffolder
// (exit code 1) rather than by clap.
#[derive(Parser, Debug)]
pub struct CreateArgs {
  /// The name of the project and directory to create
  #[arg(short, long)]
  pub name: Option<String>,

  /// The tenant slug
  #[arg(short, long)]
  pub tenant: Option<String>,

  /// The application slug
  #[arg(short, long)]
  pub app: Option<String>,

  /// The NPL package name
  #[arg(short, long)]
  pub package: Option<String>,

  /// Force overwrite of existing directory
  #[arg(short, long)]
  pub force: bool,

  /// Never prompt; every question takes its default answer
  #[arg(long)]
  pub auto: bool,

  /// Domain the engine is hosted under
  #[arg(long, default_value = DEFAULT_CLOUD_DOMAIN)]
  #[clap(env = "NPL_CLOUD_DOMAIN")]
  pub cloud_domain: String,

  /// Also build the project after generating the client
  #[arg(long)]
  pub build: bool,
}

#[derive(Parser, Debug)]
pub struct FrontendArgs {
  /// Path to frontend-config.ts file
  #[arg(short, long, default_value = "./frontend-config.ts")]
  pub config: PathBuf,

  /// Directory to create the frontend in
  #[arg(short, long, default_value = "./frontend")]
  pub directory: PathBuf,

  /// Run with minimal prompts, using sensible defaults
  #[arg(short, long)]
  pub auto: bool,
}
