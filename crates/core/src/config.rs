//! TOML-based configuration for the example sync tool.
//!
//! Every section is optional; a missing file means all defaults. Secrets are
//! never stored in the file: `github.token_env` names the environment
//! variable holding the token and is resolved at runtime via
//! [`ToolConfig::resolve_env_vars`].

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::errors::ConfigError;
use crate::exchange::ExchangeConfig;

/// File name looked up in the repository root when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "sync-examples.toml";

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level tool configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolConfig {
    #[serde(default)]
    pub paths: PathsConfig,

    #[serde(default)]
    pub sdk: SdkConfig,

    #[serde(default)]
    pub github: GitHubConfig,

    #[serde(default)]
    pub verify: VerifyConfig,
}

// ---------------------------------------------------------------------------
// Paths
// ---------------------------------------------------------------------------

/// Directory layout, relative to the repository root unless absolute.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Directory holding the SDK checkouts (one per exchange).
    #[serde(default = "default_sdk_root")]
    pub sdk_root: PathBuf,

    #[serde(default = "default_examples_dir")]
    pub examples_dir: String,

    /// Build output directory; included in change detection when present.
    #[serde(default = "default_public_dir")]
    pub public_dir: String,
}

fn default_sdk_root() -> PathBuf {
    PathBuf::from("..")
}
fn default_examples_dir() -> String {
    "examples".into()
}
fn default_public_dir() -> String {
    "public".into()
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            sdk_root: default_sdk_root(),
            examples_dir: default_examples_dir(),
            public_dir: default_public_dir(),
        }
    }
}

// ---------------------------------------------------------------------------
// SDK sources
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SdkConfig {
    /// Clone URLs are `{base_url}/{repo_name}.git` unless overridden.
    #[serde(default = "default_sdk_base_url")]
    pub base_url: String,

    /// Per-exchange clone URL overrides, keyed by exchange key.
    #[serde(default)]
    pub repo_urls: HashMap<String, String>,
}

fn default_sdk_base_url() -> String {
    "https://github.com/tiagosiebler".into()
}

impl Default for SdkConfig {
    fn default() -> Self {
        Self {
            base_url: default_sdk_base_url(),
            repo_urls: HashMap::new(),
        }
    }
}

impl SdkConfig {
    /// Clone URL for `exchange`, honouring overrides.
    pub fn clone_url(&self, exchange: &ExchangeConfig) -> String {
        exchange.clone_url(
            &self.base_url,
            self.repo_urls.get(exchange.key).map(String::as_str),
        )
    }
}

// ---------------------------------------------------------------------------
// GitHub
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubConfig {
    #[serde(default = "default_github_api_url")]
    pub api_url: String,

    /// Name of the env var holding the API token.
    #[serde(default = "default_token_env")]
    pub token_env: String,

    /// Name of the env var holding the CI step-summary file path.
    #[serde(default = "default_summary_env")]
    pub summary_env: String,

    /// Pull request target branch.
    #[serde(default = "default_base_branch")]
    pub base_branch: String,

    #[serde(default = "default_remote")]
    pub remote: String,

    /// Resolved at runtime from `token_env`.
    #[serde(skip)]
    pub token: Option<String>,

    /// Resolved at runtime from `summary_env`.
    #[serde(skip)]
    pub step_summary: Option<PathBuf>,
}

fn default_github_api_url() -> String {
    "https://api.github.com".into()
}
fn default_token_env() -> String {
    "GITHUB_TOKEN".into()
}
fn default_summary_env() -> String {
    "GITHUB_STEP_SUMMARY".into()
}
fn default_base_branch() -> String {
    "main".into()
}
fn default_remote() -> String {
    "origin".into()
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_url: default_github_api_url(),
            token_env: default_token_env(),
            summary_env: default_summary_env(),
            base_branch: default_base_branch(),
            remote: default_remote(),
            token: None,
            step_summary: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Verification commands
// ---------------------------------------------------------------------------

/// A named command run in the repository root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandSpec {
    pub name: String,
    pub command: Vec<String>,
}

impl CommandSpec {
    pub fn new(name: &str, command: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            command: command.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Lint/format checks, then the build.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyConfig {
    #[serde(default = "default_checks")]
    pub checks: Vec<CommandSpec>,

    #[serde(default = "default_build")]
    pub build: Vec<CommandSpec>,
}

fn default_checks() -> Vec<CommandSpec> {
    vec![
        CommandSpec::new("lint:fix", &["npm", "run", "lint:fix"]),
        CommandSpec::new("format", &["npm", "run", "format"]),
        CommandSpec::new("lint", &["npm", "run", "lint"]),
    ]
}
fn default_build() -> Vec<CommandSpec> {
    vec![CommandSpec::new("buildfast", &["npm", "run", "buildfast"])]
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            checks: default_checks(),
            build: default_build(),
        }
    }
}

// ---------------------------------------------------------------------------
// Loading, env resolution, validation
// ---------------------------------------------------------------------------

impl ToolConfig {
    /// Load configuration from a TOML file on disk.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        info!(path = %path.display(), "loading configuration");

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }

        let contents = std::fs::read_to_string(path)?;
        let config: ToolConfig =
            toml::from_str(&contents).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        debug!("configuration parsed successfully");
        Ok(config)
    }

    /// Load `explicit` if given (it must exist), else
    /// `<repo_root>/sync-examples.toml` if present, else defaults.
    pub fn load_or_default(explicit: Option<&Path>, repo_root: &Path) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load_from_file(path);
        }
        let candidate = repo_root.join(DEFAULT_CONFIG_FILE);
        if candidate.exists() {
            return Self::load_from_file(candidate);
        }
        debug!("no configuration file, using defaults");
        Ok(Self::default())
    }

    /// Fill the token and step-summary path from the environment.
    pub fn resolve_env_vars(&mut self) {
        self.github.token = resolve_optional_env(&self.github.token_env, "github.token_env");
        self.github.step_summary =
            resolve_optional_env(&self.github.summary_env, "github.summary_env").map(PathBuf::from);
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.paths.examples_dir.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "paths.examples_dir".into(),
                detail: "examples directory must not be empty".into(),
            });
        }
        if self.paths.public_dir.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "paths.public_dir".into(),
                detail: "public directory must not be empty".into(),
            });
        }
        if self.github.base_branch.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "github.base_branch".into(),
                detail: "base branch must not be empty".into(),
            });
        }
        if self.github.remote.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "github.remote".into(),
                detail: "remote name must not be empty".into(),
            });
        }
        for (section, specs) in [("verify.checks", &self.verify.checks), ("verify.build", &self.verify.build)] {
            for spec in specs {
                if spec.command.is_empty() || spec.command[0].trim().is_empty() {
                    return Err(ConfigError::InvalidValue {
                        field: section.into(),
                        detail: format!("command for step '{}' must not be empty", spec.name),
                    });
                }
            }
        }
        Ok(())
    }

    /// Convenience: load, resolve, and validate in one call.
    pub fn load_and_resolve(explicit: Option<&Path>, repo_root: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load_or_default(explicit, repo_root)?;
        config.resolve_env_vars();
        config.validate()?;
        Ok(config)
    }

    /// A commented configuration file with every default spelled out.
    pub fn default_template() -> &'static str {
        r#"# sync-examples configuration. Every key is optional.

[paths]
# Directory holding the SDK checkouts, relative to the repository root.
sdk_root = ".."
examples_dir = "examples"
public_dir = "public"

[sdk]
base_url = "https://github.com/tiagosiebler"

[sdk.repo_urls]
# binance = "git@github.com:me/binance.git"

[github]
api_url = "https://api.github.com"
token_env = "GITHUB_TOKEN"
summary_env = "GITHUB_STEP_SUMMARY"
base_branch = "main"
remote = "origin"

[verify]
checks = [
    { name = "lint:fix", command = ["npm", "run", "lint:fix"] },
    { name = "format", command = ["npm", "run", "format"] },
    { name = "lint", command = ["npm", "run", "lint"] },
]
build = [
    { name = "buildfast", command = ["npm", "run", "buildfast"] },
]
"#
    }
}

/// Read an environment variable by name; unset or empty yields `None`.
fn resolve_optional_env(env_name: &str, field: &str) -> Option<String> {
    match std::env::var(env_name) {
        Ok(val) if !val.is_empty() => {
            debug!(field, env_name, "resolved env var");
            Some(val)
        }
        Ok(_) => {
            warn!(field, env_name, "env var is set but empty");
            None
        }
        Err(_) => {
            debug!(field, env_name, "env var not set");
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Resolved paths
// ---------------------------------------------------------------------------

/// Absolute locations derived once from the repo root and [`PathsConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncPaths {
    pub repo_root: PathBuf,
    pub sdk_root: PathBuf,
    pub examples_root: PathBuf,
    pub public_dir: PathBuf,
    /// `examples_dir` as written in config, used for git pathspecs.
    pub examples_rel: String,
    /// `public_dir` as written in config, used for git pathspecs.
    pub public_rel: String,
}

impl SyncPaths {
    pub fn new(repo_root: impl Into<PathBuf>, paths: &PathsConfig) -> Self {
        let repo_root = repo_root.into();
        let examples_rel = paths.examples_dir.trim_end_matches('/').to_string();
        let public_rel = paths.public_dir.trim_end_matches('/').to_string();
        Self {
            sdk_root: repo_root.join(&paths.sdk_root),
            examples_root: repo_root.join(&examples_rel),
            public_dir: repo_root.join(&public_rel),
            repo_root,
            examples_rel,
            public_rel,
        }
    }

    /// Where the SDK for `exchange` is checked out.
    pub fn sdk_checkout(&self, exchange: &ExchangeConfig) -> PathBuf {
        self.sdk_root.join(exchange.repo_name)
    }

    pub fn destination(&self, exchange: &ExchangeConfig) -> PathBuf {
        self.examples_root.join(exchange.dest_folder)
    }

    /// Git pathspec of the destination folder, e.g. `examples/OKX/`.
    pub fn destination_pathspec(&self, exchange: &ExchangeConfig) -> String {
        format!("{}/{}/", self.examples_rel, exchange.dest_folder)
    }
}
