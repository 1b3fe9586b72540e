//! Lint, format and build verification of the destination repository.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{error, info, instrument};

use crate::config::{CommandSpec, VerifyConfig};
use crate::errors::{ProcessError, SyncError};
use crate::process::{Invocation, ProcessRunner};

/// Runs the configured check commands, then the build commands, stopping at
/// the first failure.
pub struct Verifier {
    runner: Arc<dyn ProcessRunner>,
    repo_root: PathBuf,
    config: VerifyConfig,
}

impl Verifier {
    pub fn new(runner: Arc<dyn ProcessRunner>, repo_root: &Path, config: VerifyConfig) -> Self {
        Self {
            runner,
            repo_root: repo_root.to_path_buf(),
            config,
        }
    }

    #[instrument(skip(self), fields(root = %self.repo_root.display()))]
    pub async fn run(&self) -> Result<(), SyncError> {
        info!("running checks");
        for spec in &self.config.checks {
            self.run_step(spec).await?;
        }
        info!("building");
        for spec in &self.config.build {
            self.run_step(spec).await?;
        }
        info!("verification passed");
        Ok(())
    }

    async fn run_step(&self, spec: &CommandSpec) -> Result<(), SyncError> {
        let invocation = Invocation::from_argv(&spec.command)
            .ok_or_else(|| SyncError::VerificationFailed {
                step: spec.name.clone(),
                exit_code: -1,
            })?
            .current_dir(&self.repo_root)
            .inherit_output();

        info!(step = %spec.name, command = %invocation, "running");
        match self.runner.run_checked(&invocation).await {
            Ok(_) => Ok(()),
            Err(ProcessError::CommandFailed { exit_code, .. }) => {
                error!(step = %spec.name, exit_code, "verification step failed");
                Err(SyncError::VerificationFailed {
                    step: spec.name.clone(),
                    exit_code,
                })
            }
            Err(e) => Err(e.into()),
        }
    }
}
