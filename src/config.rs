use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ReleaseError, Result};
use crate::exec::ExternalCommand;
use crate::manifest::DEFAULT_MANIFEST_FILE_NAME;
use crate::versions::DEFAULT_VERSIONING_FILE;

/// Prefix of environment variables that override config keys
pub const ENV_PREFIX: &str = "RELEASING_";

/// Per-user defaults for releasing.
///
/// Every key can be overridden by an environment variable named
/// `RELEASING_<KEY>` (e.g. `RELEASING_SIGN_TAGS=false`).
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Versioning file to use instead of `<repo root>/versions.yaml`
    #[serde(default)]
    pub versioning_file: Option<PathBuf>,

    #[serde(default = "default_manifest_file_name")]
    pub manifest_file_name: String,

    #[serde(default = "default_sign_tags")]
    pub sign_tags: bool,

    /// Build-consistency command run after manifests are rewritten
    #[serde(default = "default_lint_command")]
    pub lint_command: Vec<String>,

    /// Full verification command run before committing
    #[serde(default = "default_ci_command")]
    pub ci_command: Vec<String>,
}

fn default_manifest_file_name() -> String {
    DEFAULT_MANIFEST_FILE_NAME.to_string()
}

fn default_sign_tags() -> bool {
    true
}

fn default_lint_command() -> Vec<String> {
    vec!["make".to_string(), "lint".to_string()]
}

fn default_ci_command() -> Vec<String> {
    vec!["make".to_string(), "ci".to_string()]
}

impl Default for Config {
    fn default() -> Self {
        Config {
            versioning_file: None,
            manifest_file_name: default_manifest_file_name(),
            sign_tags: default_sign_tags(),
            lint_command: default_lint_command(),
            ci_command: default_ci_command(),
        }
    }
}

/// Loads configuration from file or returns defaults, then applies environment overrides.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `~/.releasing.toml` in the home directory
/// 3. `releasing.toml` in the user config directory
/// 4. Default configuration if no file found
///
/// # Returns
/// * `Ok(Config)` - Loaded or default configuration
/// * `Err(ConfigParse)` - If a file exists but cannot be read or parsed
pub fn load_config(config_path: Option<&Path>) -> Result<Config> {
    let config = match find_config_file(config_path) {
        Some(path) => {
            let contents = fs::read_to_string(&path).map_err(|e| {
                ReleaseError::config(format!("could not read {}: {}", path.display(), e))
            })?;
            toml::from_str(&contents).map_err(|e| {
                ReleaseError::config(format!("invalid config file {}: {}", path.display(), e))
            })?
        }
        None => Config::default(),
    };

    apply_env_overrides(config, |key| std::env::var(key).ok())
}

fn find_config_file(config_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = config_path {
        return Some(path.to_path_buf());
    }

    let candidates = [
        dirs::home_dir().map(|home| home.join(".releasing.toml")),
        dirs::config_dir().map(|dir| dir.join("releasing.toml")),
    ];

    candidates.into_iter().flatten().find(|p| p.exists())
}

/// Applies `RELEASING_*` overrides using `lookup` to read variables
pub fn apply_env_overrides<F>(mut config: Config, lookup: F) -> Result<Config>
where
    F: Fn(&str) -> Option<String>,
{
    let var = |key: &str| lookup(&format!("{}{}", ENV_PREFIX, key));

    if let Some(path) = var("VERSIONING_FILE") {
        config.versioning_file = Some(PathBuf::from(path));
    }
    if let Some(name) = var("MANIFEST_FILE_NAME") {
        config.manifest_file_name = name;
    }
    if let Some(raw) = var("SIGN_TAGS") {
        config.sign_tags = parse_bool(&raw).ok_or_else(|| {
            ReleaseError::config(format!(
                "{}SIGN_TAGS must be true or false, got '{}'",
                ENV_PREFIX, raw
            ))
        })?;
    }
    if let Some(line) = var("LINT_COMMAND") {
        config.lint_command = ExternalCommand::parse(&line).argv().to_vec();
    }
    if let Some(line) = var("CI_COMMAND") {
        config.ci_command = ExternalCommand::parse(&line).argv().to_vec();
    }

    Ok(config)
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

/// Settings for one invocation, built once in `main` and passed to each workflow
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub module_set_name: String,
    pub versioning_file: PathBuf,
    pub repo_root: PathBuf,
    pub config: Config,
}

impl Settings {
    /// Resolves the versioning file: flag, then config, then `<repo root>/versions.yaml`
    pub fn resolve(
        config: Config,
        module_set_name: impl Into<String>,
        versioning_file_flag: Option<PathBuf>,
        repo_root: impl Into<PathBuf>,
    ) -> Self {
        let repo_root = repo_root.into();
        let versioning_file = versioning_file_flag
            .or_else(|| config.versioning_file.clone())
            .unwrap_or_else(|| repo_root.join(DEFAULT_VERSIONING_FILE));

        Settings {
            module_set_name: module_set_name.into(),
            versioning_file,
            repo_root,
            config,
        }
    }
}
