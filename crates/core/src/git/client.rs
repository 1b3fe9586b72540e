//! Git operations via the `git` command line.
//!
//! Every call goes through a [`ProcessRunner`] so tests can script git's
//! answers.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::errors::{GitError, ProcessError};
use crate::process::{CommandOutput, Invocation, ProcessRunner};

/// Branches tried, in order, when updating an existing checkout.
pub const DEFAULT_BRANCH_CANDIDATES: &[&str] = &["main", "master"];

/// Thin wrapper over the `git` CLI bound to one working directory.
#[derive(Clone)]
pub struct GitCli {
    runner: Arc<dyn ProcessRunner>,
    repo_path: PathBuf,
}

impl GitCli {
    pub fn new(runner: Arc<dyn ProcessRunner>, repo_path: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            repo_path: repo_path.into(),
        }
    }

    pub fn repo_path(&self) -> &Path {
        &self.repo_path
    }

    fn git<I, S>(&self, args: I) -> Invocation
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Invocation::new("git")
            .args(args)
            .current_dir(&self.repo_path)
    }

    async fn run(&self, invocation: Invocation) -> Result<CommandOutput, GitError> {
        Ok(self.runner.run_checked(&invocation).await?)
    }

    /// Clone `url` into `dest`. The parent of `dest` must exist.
    #[instrument(skip(runner))]
    pub async fn clone_repo(
        runner: Arc<dyn ProcessRunner>,
        url: &str,
        dest: &Path,
    ) -> Result<Self, GitError> {
        info!("cloning repository");
        let parent = dest.parent().unwrap_or_else(|| Path::new("."));
        let invocation = Invocation::new("git")
            .arg("clone")
            .arg(url)
            .arg(dest.to_string_lossy())
            .current_dir(parent);
        match runner.run_checked(&invocation).await {
            Ok(_) => Ok(Self::new(runner, dest)),
            Err(ProcessError::CommandFailed { stderr, .. }) => Err(GitError::CloneFailed {
                url: url.to_string(),
                detail: stderr.trim().to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    /// `git fetch <remote>` followed by `git reset --hard <remote>/<branch>`.
    #[instrument(skip(self), fields(repo = %self.repo_path.display()))]
    pub async fn fetch_and_reset(&self, remote: &str, branch: &str) -> Result<(), GitError> {
        self.run(self.git(["fetch", remote])).await?;
        let target = format!("{remote}/{branch}");
        self.run(self.git(["reset", "--hard", target.as_str()]))
            .await?;
        debug!(branch, "reset to remote branch");
        Ok(())
    }

    /// Hard-reset to the remote's `main`, falling back to `master`.
    ///
    /// Returns the branch that worked.
    pub async fn update_to_default_branch(&self, remote: &str) -> Result<&'static str, GitError> {
        let mut last_error = None;
        for &branch in DEFAULT_BRANCH_CANDIDATES {
            match self.fetch_and_reset(remote, branch).await {
                Ok(()) => {
                    info!(branch, "updated checkout");
                    return Ok(branch);
                }
                Err(e) => {
                    warn!(branch, error = %e, "update failed, trying next branch");
                    last_error = Some(e);
                }
            }
        }
        Err(GitError::UpdateFailed {
            path: self.repo_path.display().to_string(),
            detail: last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "no branch candidates".to_string()),
        })
    }

    /// `git status --porcelain -- <paths>`; empty output means clean.
    pub async fn status_porcelain(&self, paths: &[&str]) -> Result<String, GitError> {
        let out = self
            .run(self.git(["status", "--porcelain", "--"]).args(paths.iter().copied()))
            .await?;
        Ok(out.stdout)
    }

    /// Remove `path` from the index only. Failures are logged and ignored.
    pub async fn rm_cached(&self, path: &str) {
        let invocation = self.git(["rm", "-r", "--cached", "--ignore-unmatch", "-q", path]);
        if let Err(e) = self.runner.run_checked(&invocation).await {
            warn!(path, error = %e, "could not untrack path, continuing");
        }
    }

    pub async fn add(&self, paths: &[&str]) -> Result<(), GitError> {
        self.run(self.git(["add", "--"]).args(paths.iter().copied()))
            .await?;
        Ok(())
    }

    /// Paths currently staged for commit.
    pub async fn staged_files(&self) -> Result<Vec<String>, GitError> {
        let out = self
            .run(self.git(["diff", "--cached", "--name-only"]))
            .await?;
        Ok(out
            .stdout
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect())
    }

    /// Create and switch to `branch`; if it already exists, switch to it.
    #[instrument(skip(self))]
    pub async fn checkout_new_branch(&self, branch: &str) -> Result<(), GitError> {
        if let Err(e) = self.run(self.git(["checkout", "-b", branch])).await {
            warn!(branch, error = %e, "branch creation failed, checking out existing branch");
            self.run(self.git(["checkout", branch])).await?;
        }
        Ok(())
    }

    pub async fn commit(&self, message: &str) -> Result<(), GitError> {
        self.run(self.git(["commit", "-m", message])).await?;
        info!("created commit");
        Ok(())
    }

    /// `git push -u <remote> <branch>`.
    #[instrument(skip(self))]
    pub async fn push_upstream(&self, remote: &str, branch: &str) -> Result<(), GitError> {
        match self
            .runner
            .run_checked(&self.git(["push", "-u", remote, branch]))
            .await
        {
            Ok(_) => {
                info!("pushed branch");
                Ok(())
            }
            Err(ProcessError::CommandFailed { stderr, .. }) => Err(GitError::PushFailed {
                branch: branch.to_string(),
                detail: stderr.trim().to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    /// URL of `remote`, or `None` if it is not configured.
    pub async fn remote_url(&self, remote: &str) -> Option<String> {
        let key = format!("remote.{remote}.url");
        match self.run(self.git(["config", "--get", key.as_str()])).await {
            Ok(out) => Some(out.stdout.trim().to_string()).filter(|s| !s.is_empty()),
            Err(e) => {
                debug!(remote, error = %e, "no remote url");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::testing::ScriptedRunner;

    fn cli(runner: &Arc<ScriptedRunner>) -> GitCli {
        GitCli::new(runner.clone(), "/work/sdk")
    }

    #[tokio::test]
    async fn test_update_prefers_main() {
        let runner = Arc::new(ScriptedRunner::new());
        let branch = cli(&runner).update_to_default_branch("origin").await.unwrap();
        assert_eq!(branch, "main");
        assert_eq!(
            runner.commands(),
            vec!["git fetch origin", "git reset --hard origin/main"]
        );
        assert_eq!(
            runner.calls()[0].cwd.as_deref(),
            Some(Path::new("/work/sdk"))
        );
    }

    #[tokio::test]
    async fn test_update_falls_back_to_master() {
        let runner = Arc::new(ScriptedRunner::new());
        runner.respond(
            &["git", "reset", "--hard", "origin/main"],
            CommandOutput::failed(128, "unknown revision"),
        );
        let branch = cli(&runner).update_to_default_branch("origin").await.unwrap();
        assert_eq!(branch, "master");
        assert!(runner.ran("git reset --hard origin/master"));
    }

    #[tokio::test]
    async fn test_update_fails_when_both_branches_fail() {
        let runner = Arc::new(ScriptedRunner::new());
        runner.respond(&["git", "fetch"], CommandOutput::failed(128, "offline"));
        let err = cli(&runner)
            .update_to_default_branch("origin")
            .await
            .unwrap_err();
        assert!(matches!(err, GitError::UpdateFailed { .. }));
        assert!(!runner.ran("git reset"));
    }

    #[tokio::test]
    async fn test_clone_failure_is_clone_failed() {
        let runner = Arc::new(ScriptedRunner::new());
        runner.respond(&["git", "clone"], CommandOutput::failed(128, "not found\n"));
        let result = GitCli::clone_repo(
            runner.clone(),
            "https://github.com/acme/missing.git",
            Path::new("/work/missing"),
        )
        .await;
        match result {
            Err(GitError::CloneFailed { url, detail }) => {
                assert_eq!(url, "https://github.com/acme/missing.git");
                assert_eq!(detail, "not found");
            }
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("clone should fail"),
        }
        assert_eq!(runner.calls()[0].cwd.as_deref(), Some(Path::new("/work")));
    }

    #[tokio::test]
    async fn test_checkout_falls_back_to_existing_branch() {
        let runner = Arc::new(ScriptedRunner::new());
        runner.respond(
            &["git", "checkout", "-b"],
            CommandOutput::failed(128, "already exists"),
        );
        cli(&runner).checkout_new_branch("sync/x").await.unwrap();
        assert_eq!(
            runner.commands(),
            vec!["git checkout -b sync/x", "git checkout sync/x"]
        );
    }

    #[tokio::test]
    async fn test_rm_cached_ignores_failure() {
        let runner = Arc::new(ScriptedRunner::new());
        runner.respond(&["git", "rm"], CommandOutput::failed(1, "fatal"));
        cli(&runner).rm_cached("examples/binance").await;
        assert_eq!(
            runner.commands(),
            vec!["git rm -r --cached --ignore-unmatch -q examples/binance"]
        );
    }

    #[tokio::test]
    async fn test_staged_files_and_remote_url() {
        let runner = Arc::new(ScriptedRunner::new());
        runner.respond(
            &["git", "diff", "--cached"],
            CommandOutput::ok("examples/OKX/a.ts\n\nexamples/OKX/b.ts\n"),
        );
        runner.respond(
            &["git", "config", "--get"],
            CommandOutput::ok("git@github.com:acme/site.git\n"),
        );
        let git = cli(&runner);
        assert_eq!(
            git.staged_files().await.unwrap(),
            vec!["examples/OKX/a.ts", "examples/OKX/b.ts"]
        );
        assert_eq!(
            git.remote_url("origin").await.as_deref(),
            Some("git@github.com:acme/site.git")
        );
    }

    #[tokio::test]
    async fn test_push_failure_is_push_failed() {
        let runner = Arc::new(ScriptedRunner::new());
        runner.respond(&["git", "push"], CommandOutput::failed(1, "rejected"));
        let err = cli(&runner)
            .push_upstream("origin", "sync/okx-examples-1")
            .await
            .unwrap_err();
        assert!(matches!(err, GitError::PushFailed { ref branch, .. } if branch == "sync/okx-examples-1"));
    }
}
