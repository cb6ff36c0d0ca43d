// src/gate.rs
use std::fmt;

use dialoguer::{theme::ColorfulTheme, Confirm};
use log::{info, warn};

/// The yes/no questions the scaffolder may ask.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
  Overwrite,
  CreateConfig,
  GenerateClient,
}

impl fmt::Display for Decision {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let id = match self {
      Decision::Overwrite => "overwrite",
      Decision::CreateConfig => "createConfig",
      Decision::GenerateClient => "generateClient",
    };
    f.write_str(id)
  }
}

/// Resolves a yes/no decision. Implementations never fail: a missing terminal is
/// checked once before scaffolding starts.
pub trait DecisionGate {
  fn decide(&mut self, decision: Decision, question: &str, default: bool) -> bool;
}

/// Asks on the terminal unless `auto` is set, in which case the default is taken.
#[derive(Debug, Clone)]
pub struct ConsoleGate {
  auto: bool,
}

impl ConsoleGate {
  pub fn new(auto: bool) -> Self {
    Self { auto }
  }
}

impl DecisionGate for ConsoleGate {
  fn decide(&mut self, decision: Decision, question: &str, default: bool) -> bool {
    if self.auto {
      info!(
        "Auto mode: '{}' -> {}",
        decision,
        if default { "yes" } else { "no" }
      );
      return default;
    }

    match Confirm::with_theme(&ColorfulTheme::default())
      .with_prompt(question)
      .default(default)
      .interact()
    {
      Ok(answer) => answer,
      Err(e) => {
        warn!("Prompt for '{}' failed ({}); using default", decision, e);
        default
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn auto_mode_returns_default_without_prompting() {
    let mut gate = ConsoleGate::new(true);
    assert!(gate.decide(Decision::CreateConfig, "Create?", true));
    assert!(!gate.decide(Decision::Overwrite, "Overwrite?", false));
  }

  #[test]
  fn decisions_display_their_identity() {
    assert_eq!(Decision::Overwrite.to_string(), "overwrite");
    assert_eq!(Decision::GenerateClient.to_string(), "generateClient");
  }
}
