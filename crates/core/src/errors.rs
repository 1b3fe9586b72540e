//! Error types for the example sync toolkit.
//!
//! Each subsystem has its own error type derived with `thiserror`, and a
//! top-level [`CoreError`] enum unifies them all for callers that want a
//! single error type.

use std::path::PathBuf;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Unified error type for the entire core library.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Process(#[from] ProcessError),

    #[error(transparent)]
    Git(#[from] GitError),

    #[error(transparent)]
    GitHub(#[from] GitHubError),

    #[error(transparent)]
    Transform(#[from] TransformError),

    #[error(transparent)]
    Sync(#[from] SyncError),

    #[error(transparent)]
    Index(#[from] IndexError),
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

/// Errors from configuration loading, validation and exchange lookup.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file not found.
    #[error("configuration file not found: {0}")]
    FileNotFound(String),

    /// TOML parse error.
    #[error("configuration parse error: {0}")]
    ParseError(String),

    /// A config value is invalid.
    #[error("invalid configuration value for '{field}': {detail}")]
    InvalidValue { field: String, detail: String },

    /// The requested exchange is not in the registry.
    #[error("unknown exchange '{name}' (available: {})", .available.join(", "))]
    UnknownExchange {
        name: String,
        available: Vec<String>,
    },

    /// Generic I/O error reading the config file.
    #[error("configuration I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// External process errors
// ---------------------------------------------------------------------------

/// Errors from running external commands.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// The program was not found on `$PATH`.
    #[error("program not found: {0}")]
    BinaryNotFound(String),

    /// A command exited with a non-zero status.
    #[error("command `{command}` failed (exit {exit_code}): {stderr}")]
    CommandFailed {
        command: String,
        exit_code: i32,
        stderr: String,
    },

    /// Spawning or waiting on the process failed.
    #[error("process I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// Git errors
// ---------------------------------------------------------------------------

/// Errors from git CLI operations.
#[derive(Debug, Error)]
pub enum GitError {
    /// Neither `main` nor `master` could be fetched and reset to.
    #[error("failed to update repository at '{path}': {detail}")]
    UpdateFailed { path: String, detail: String },

    /// Cloning the SDK repository failed.
    #[error("failed to clone '{url}': {detail}")]
    CloneFailed { url: String, detail: String },

    /// Push was rejected or failed.
    #[error("git push failed for branch '{branch}': {detail}")]
    PushFailed { branch: String, detail: String },

    /// Any other failing git invocation.
    #[error(transparent)]
    Process(#[from] ProcessError),
}

// ---------------------------------------------------------------------------
// GitHub API errors
// ---------------------------------------------------------------------------

/// Errors from GitHub REST API interactions.
#[derive(Debug, Error)]
pub enum GitHubError {
    /// HTTP-level transport error (network, TLS, etc.).
    #[error("GitHub HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// The API returned a non-success status code.
    #[error("GitHub API error (HTTP {status}): {body}")]
    ApiError { status: u16, body: String },

    /// Authentication token is missing or invalid.
    #[error("GitHub authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Rate limit exceeded.
    #[error("GitHub rate limit exceeded, resets at {reset_at}")]
    RateLimited { reset_at: String },
}

// ---------------------------------------------------------------------------
// Transform errors
// ---------------------------------------------------------------------------

/// Errors from compiling transform rules.
#[derive(Debug, Error)]
pub enum TransformError {
    /// A rule's pattern did not compile after package substitution.
    #[error("invalid pattern for rule '{rule}' ({exchange}): {detail}")]
    InvalidPattern {
        exchange: String,
        rule: &'static str,
        detail: String,
    },
}

// ---------------------------------------------------------------------------
// Sync errors
// ---------------------------------------------------------------------------

/// Errors from a sync run. All of these abort the run.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The SDK checkout has no examples directory.
    #[error("source directory not found: {}", .0.display())]
    SourceMissing(PathBuf),

    /// A lint, format or build step exited non-zero.
    #[error("verification step '{step}' failed (exit {exit_code})")]
    VerificationFailed { step: String, exit_code: i32 },

    /// Filesystem error while copying examples.
    #[error("I/O error at '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("sync configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("sync git error: {0}")]
    Git(#[from] GitError),

    #[error("sync process error: {0}")]
    Process(#[from] ProcessError),

    #[error("sync transform error: {0}")]
    Transform(#[from] TransformError),
}

impl SyncError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

// ---------------------------------------------------------------------------
// Index errors
// ---------------------------------------------------------------------------

/// Errors from building the examples index.
#[derive(Debug, Error)]
pub enum IndexError {
    /// The examples directory does not exist.
    #[error("examples directory not found: {}", .0.display())]
    ExamplesMissing(PathBuf),

    /// Reading or writing a file failed.
    #[error("index I/O error at '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization failed.
    #[error("index serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}
