// src/runner.rs
use std::fmt;
use std::io::ErrorKind;
use std::path::Path;

use duct::cmd;
use log::{debug, error, info};

use crate::error::ScaffoldError;

/// An external program plus its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
  pub program: String,
  pub args: Vec<String>,
}

impl CommandSpec {
  pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    Self {
      program: program.into(),
      args: args.into_iter().map(Into::into).collect(),
    }
  }
}

impl fmt::Display for CommandSpec {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.program)?;
    for arg in &self.args {
      write!(f, " {}", arg)?;
    }
    Ok(())
  }
}

/// Runs one command to completion in `cwd`. Ok only on exit status zero.
pub trait CommandRunner {
  fn run(&mut self, command: &CommandSpec, cwd: &Path) -> Result<(), ScaffoldError>;
}

/// Runs commands through duct with stdin/stdout/stderr inherited from this process,
/// so the operator sees live output and can answer the tool's own prompts.
#[derive(Debug, Default, Clone, Copy)]
pub struct DuctRunner;

impl CommandRunner for DuctRunner {
  fn run(&mut self, command: &CommandSpec, cwd: &Path) -> Result<(), ScaffoldError> {
    info!("Running `{}` in {}", command, cwd.display());

    let output = cmd(
      command.program.as_str(),
      command.args.iter().map(String::as_str),
    )
    .dir(cwd)
    .unchecked() // Ok(Output) on non-zero exit; status is checked below
    .run()
    .map_err(|e| {
      if e.kind() == ErrorKind::NotFound {
        error!("Executable '{}' not found on PATH", command.program);
      }
      ScaffoldError::Launch {
        command: command.program.clone(),
        source: e,
      }
    })?;

    debug!("`{}` finished with {:?}", command, output.status);
    if output.status.success() {
      Ok(())
    } else {
      Err(ScaffoldError::CommandFailed {
        command: command.program.clone(),
        args: command.args.clone(),
        exit_code: output.status.code(),
      })
    }
  }
}
