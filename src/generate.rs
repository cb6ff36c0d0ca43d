// src/generate.rs
use std::collections::BTreeMap;
use std::env;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use url::Url;

use crate::cli::{CreateArgs, FrontendArgs};
use crate::error::ScaffoldError;
use crate::fetch::{HttpDocumentFetcher, DOCUMENT_DIR};
use crate::gate::{ConsoleGate, Decision, DecisionGate};
use crate::runner::{CommandSpec, DuctRunner};
use crate::scaffold::{
  target_occupied, ClientGeneration, DocumentSource, ScaffoldPlan, ScaffoldRequest, Scaffolder,
};
use crate::settings::{self, FrontendSettings};
use crate::validate::{APP, NAME, PACKAGE, TENANT};

pub const CREATE_TEMPLATE: &str = "react";
pub const FRONTEND_TEMPLATE: &str = "lit";

/// Tag carrying the absolute settings-file path into the `frontend` template.
pub const CONFIG_PATH_TAG: &str = "configPath";
pub const CLOUD_DOMAIN_TAG: &str = "cloudDomain";

pub fn run_create(args: CreateArgs, templates_dir: &Path) -> Result<(), ScaffoldError> {
  info!("Running create command...");
  debug!("Args: {:?}, Templates Dir: {}", args, templates_dir.display());

  let cwd = env::current_dir()?;
  let name = args.name.clone().unwrap_or_default();
  let target_path = cwd.join(name.trim());

  // The overwrite question is the only prompt this mode can ask.
  if !args.force && !name.trim().is_empty() && target_occupied(&target_path)? {
    ensure_interactive(args.auto)?;
  }

  let mut substitutions = BTreeMap::new();
  for (key, value) in [
    (NAME, args.name),
    (TENANT, args.tenant),
    (APP, args.app),
    (PACKAGE, args.package),
  ] {
    if let Some(value) = value {
      substitutions.insert(key.to_string(), value.trim().to_string());
    }
  }
  substitutions.insert(CLOUD_DOMAIN_TAG.to_string(), args.cloud_domain.clone());

  let request = ScaffoldRequest {
    target_path,
    template_path: templates_dir.join(CREATE_TEMPLATE),
    substitutions,
    force_overwrite: args.force,
    auto_mode: args.auto,
  };
  let plan = ScaffoldPlan {
    required: vec![NAME, TENANT, APP, PACKAGE],
    document: DocumentSource::Engine {
      cloud_domain: args.cloud_domain,
    },
    install: npm(["install"]),
    generate: Some(ClientGeneration {
      command: npm(["run", "generate-client"]),
      confirm: false,
    }),
    build: args.build.then(|| npm(["run", "build"])),
    next_steps: vec![format!("cd {}", name.trim()), "npm run dev".to_string()],
  };

  Scaffolder::new(
    request,
    plan,
    ConsoleGate::new(args.auto),
    HttpDocumentFetcher::new()?,
    DuctRunner,
  )
  .run()
}

pub fn run_frontend(args: FrontendArgs, templates_dir: &Path) -> Result<(), ScaffoldError> {
  info!("Running frontend command...");
  debug!("Args: {:?}, Templates Dir: {}", args, templates_dir.display());
  ensure_interactive(args.auto)?;

  let cwd = env::current_dir()?;
  let config_path = absolutize(&cwd, &args.config);
  let target_path = absolutize(&cwd, &args.directory);
  let mut gate = ConsoleGate::new(args.auto);

  let settings = resolve_settings(&config_path, &mut gate)?;
  let (document, generate) = client_generation(&settings, args.auto)?;

  let mut substitutions = BTreeMap::new();
  if let Some(name) = target_path.file_name() {
    substitutions.insert(NAME.to_string(), name.to_string_lossy().into_owned());
  }
  substitutions.insert(CONFIG_PATH_TAG.to_string(), config_path_literal(&config_path));

  if args.auto && target_path.exists() {
    info!("Auto mode: overwriting existing directory {}", target_path.display());
  }

  let shown_dir = target_path
    .strip_prefix(&cwd)
    .map(Path::to_path_buf)
    .unwrap_or_else(|_| target_path.clone());
  let next_steps = frontend_next_steps(&settings, &config_path, &shown_dir);

  let request = ScaffoldRequest {
    target_path,
    template_path: templates_dir.join(FRONTEND_TEMPLATE),
    substitutions,
    force_overwrite: args.auto,
    auto_mode: args.auto,
  };
  let plan = ScaffoldPlan {
    required: vec![NAME],
    document,
    install: npm(["install"]),
    generate,
    build: Some(npm(["run", "build"])),
    next_steps,
  };

  Scaffolder::new(request, plan, gate, HttpDocumentFetcher::new()?, DuctRunner).run()
}

/// The settings path as it appears inside a quoted string in `vite.config.ts` (single
/// quotes) and `tsconfig.json` (double quotes). `\uXXXX` escapes read the same in both.
fn config_path_literal(path: &Path) -> String {
  let normalized = if cfg!(windows) {
    path.to_string_lossy().replace('\\', "/")
  } else {
    path.to_string_lossy().into_owned()
  };
  let mut out = String::with_capacity(normalized.len());
  for c in normalized.chars() {
    match c {
      '\\' => out.push_str("\\\\"),
      '\'' | '"' => out.push_str(&format!("\\u{:04x}", c as u32)),
      c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
      c => out.push(c),
    }
  }
  out
}

/// Prompts need a terminal; checked before scaffolding starts.
fn ensure_interactive(auto: bool) -> Result<(), ScaffoldError> {
  if auto || std::io::stdin().is_terminal() {
    return Ok(());
  }
  Err(ScaffoldError::Validation(
    "no interactive terminal available; re-run with --auto".to_string(),
  ))
}

fn absolutize(cwd: &Path, path: &Path) -> PathBuf {
  if path.is_absolute() {
    path.to_path_buf()
  } else {
    cwd.join(path)
  }
}

/// Loads the settings file, offering to create a template when it is missing.
fn resolve_settings<G: DecisionGate>(
  config_path: &Path,
  gate: &mut G,
) -> Result<FrontendSettings, ScaffoldError> {
  if config_path.is_file() {
    info!("Found settings file at {}", config_path.display());
    let settings = FrontendSettings::load(config_path)?;
    for name in settings.missing() {
      warn!("{} does not define {}", config_path.display(), name);
    }
    return Ok(settings);
  }

  warn!("No settings file found at {}", config_path.display());
  let create = gate.decide(
    Decision::CreateConfig,
    "Would you like to create a template frontend-config.ts?",
    true,
  );
  if !create {
    return Err(ScaffoldError::Validation(format!(
      "settings file {} is required",
      config_path.display()
    )));
  }
  settings::write_template(config_path)?;
  FrontendSettings::load(config_path)
}

/// Decides whether the interface document is fetched and the client generated.
fn client_generation(
  settings: &FrontendSettings,
  auto: bool,
) -> Result<(DocumentSource, Option<ClientGeneration>), ScaffoldError> {
  if settings.has_placeholders {
    if auto {
      info!("Auto mode: skipping API generation (placeholder URLs detected)");
    } else {
      info!("Settings still hold placeholder URLs; skipping API generation");
    }
    return Ok((DocumentSource::None, None));
  }

  let Some(raw) = settings.swagger_url.as_deref() else {
    warn!("{} not set; skipping API generation", settings::SWAGGER_URL);
    return Ok((DocumentSource::None, None));
  };
  let url = Url::parse(raw).map_err(|e| {
    ScaffoldError::Validation(format!("{} '{}' is not a valid URL: {}", settings::SWAGGER_URL, raw, e))
  })?;
  let package = package_from_url(&url).unwrap_or_else(|| "api".to_string());
  let input = format!("{}/{}-openapi.json", DOCUMENT_DIR, package);

  let command = CommandSpec::new(
    npx_program(),
    ["@hey-api/openapi-ts", "--input", input.as_str(), "--output", "src/api.ts"],
  );
  Ok((
    DocumentSource::Url { url, package },
    Some(ClientGeneration { command, confirm: true }),
  ))
}

/// `.../npl/<package>/-/openapi.json` -> `<package>`
fn package_from_url(url: &Url) -> Option<String> {
  let mut segments = url.path_segments()?;
  segments.find(|s| *s == "npl")?;
  segments
    .next()
    .filter(|s| !s.is_empty() && *s != "-")
    .map(str::to_string)
}

fn frontend_next_steps(settings: &FrontendSettings, config_path: &Path, dir: &Path) -> Vec<String> {
  let mut steps = Vec::new();
  if settings.has_placeholders {
    steps.push(format!("Update {} with your actual values", config_path.display()));
    steps.push(format!("cd {}", dir.display()));
    steps.push("npm run generate-api".to_string());
  } else {
    steps.push(format!("cd {}", dir.display()));
  }
  steps.push("npm run dev".to_string());
  steps.push("Regenerate the API client any time with: npm run generate-api".to_string());
  steps
}

fn npm<const N: usize>(args: [&str; N]) -> CommandSpec {
  CommandSpec::new(tool_program("NPL_NPM", "npm"), args)
}

fn npx_program() -> String {
  tool_program("NPL_NPX", "npx")
}

/// Program name for a node tool, overridable through `env_key`.
fn tool_program(env_key: &str, default: &str) -> String {
  match env::var(env_key) {
    Ok(program) if !program.trim().is_empty() => program,
    _ if cfg!(windows) => format!("{}.cmd", default),
    _ => default.to_string(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::tempdir;

  struct Always(bool);

  impl DecisionGate for Always {
    fn decide(&mut self, _decision: Decision, _question: &str, _default: bool) -> bool {
      self.0
    }
  }

  fn real_settings(swagger: &str) -> FrontendSettings {
    FrontendSettings::parse(&format!("export const NPL_SWAGGER_URL = \"{}\";", swagger))
  }

  #[test]
  fn package_is_read_from_engine_url() {
    let url = Url::parse("https://engine-acme-iou.noumena.cloud/npl/objects/-/openapi.json").unwrap();
    assert_eq!(package_from_url(&url).as_deref(), Some("objects"));

    let other = Url::parse("https://example.com/openapi.json").unwrap();
    assert_eq!(package_from_url(&other), None);
  }

  #[test]
  fn placeholder_settings_skip_generation() {
    let settings = FrontendSettings::parse(
      "export const NPL_SWAGGER_URL = \"https://engine-your-domain.com/npl/p/-/openapi.json\";",
    );
    let (document, generate) = client_generation(&settings, true).unwrap();
    assert_eq!(document, DocumentSource::None);
    assert!(generate.is_none());
  }

  #[test]
  fn real_settings_fetch_and_generate_from_local_copy() {
    let settings = real_settings("https://engine-acme-iou.noumena.cloud/npl/objects/-/openapi.json");
    let (document, generate) = client_generation(&settings, false).unwrap();

    assert!(matches!(document, DocumentSource::Url { ref package, .. } if package == "objects"));
    let generate = generate.unwrap();
    assert!(generate.confirm);
    assert!(generate
      .command
      .args
      .contains(&"openapi/objects-openapi.json".to_string()));
  }

  #[test]
  fn invalid_swagger_url_is_a_validation_failure() {
    let settings = real_settings("not a url");
    let err = client_generation(&settings, false).unwrap_err();
    assert!(matches!(err, ScaffoldError::Validation(_)));
  }

  #[test]
  fn missing_settings_are_created_when_accepted() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("frontend-config.ts");

    let settings = resolve_settings(&path, &mut Always(true)).unwrap();

    assert!(path.is_file());
    assert!(settings.has_placeholders);
  }

  #[test]
  fn missing_settings_declined_is_fatal() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("frontend-config.ts");

    let err = resolve_settings(&path, &mut Always(false)).unwrap_err();

    assert!(matches!(err, ScaffoldError::Validation(_)));
    assert!(!path.exists());
  }

  #[test]
  fn next_steps_mention_settings_update_for_placeholders() {
    let placeholder = FrontendSettings::parse("host = \"your-domain.com\"");
    let steps = frontend_next_steps(&placeholder, Path::new("/w/frontend-config.ts"), Path::new("frontend"));
    assert!(steps[0].starts_with("Update /w/frontend-config.ts"));

    let real = real_settings("https://engine-acme-iou.noumena.cloud/npl/objects/-/openapi.json");
    let steps = frontend_next_steps(&real, Path::new("/w/frontend-config.ts"), Path::new("frontend"));
    assert_eq!(steps[0], "cd frontend");
  }

  #[test]
  fn config_path_is_escaped_for_ts_and_json_strings() {
    assert_eq!(
      config_path_literal(Path::new("/work/frontend-config.ts")),
      "/work/frontend-config.ts"
    );
    let literal = config_path_literal(Path::new("/home/o'neil/\"cfg\"/frontend-config.ts"));
    assert_eq!(literal, "/home/o\\u0027neil/\\u0022cfg\\u0022/frontend-config.ts");

    let parsed: String = serde_json::from_str(&format!("\"{}\"", literal)).unwrap();
    assert_eq!(parsed, "/home/o'neil/\"cfg\"/frontend-config.ts");
  }

  #[cfg(unix)]
  #[test]
  fn backslash_in_config_path_survives_as_an_escape() {
    let literal = config_path_literal(Path::new("/tmp/a\\b/frontend-config.ts"));
    assert_eq!(literal, "/tmp/a\\\\b/frontend-config.ts");

    let parsed: String = serde_json::from_str(&format!("\"{}\"", literal)).unwrap();
    assert_eq!(parsed, "/tmp/a\\b/frontend-config.ts");
  }

  #[test]
  fn relative_paths_are_resolved_against_cwd() {
    assert_eq!(
      absolutize(Path::new("/work"), Path::new("./frontend")),
      PathBuf::from("/work/./frontend")
    );
    assert_eq!(absolutize(Path::new("/work"), Path::new("/abs")), PathBuf::from("/abs"));
  }
}
