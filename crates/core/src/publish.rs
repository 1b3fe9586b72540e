//! Pull request creation with graceful fallback.
//!
//! Tries the GitHub API (when a token and an `owner/repo` slug are known),
//! then the `gh` CLI, and finally hands back a compare link for a human to
//! click. None of these failures abort a sync.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::config::GitHubConfig;
use crate::git::github::NewPullRequest;
use crate::git::remote_url::{compare_url, derive_git_base_url, parse_repo_slug};
use crate::git::{GitCli, GitHubClient};
use crate::process::{Invocation, ProcessRunner};

/// How the pull request ended up being opened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "via", rename_all = "snake_case")]
pub enum PrOutcome {
    /// Created through the REST API.
    Created { url: String },
    /// Created by `gh pr create`; `url` is what `gh` printed, if anything.
    CreatedViaCli { url: Option<String> },
    /// Nothing worked; `url` opens GitHub's compare view.
    ManualLink { url: String },
}

impl PrOutcome {
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Created { url } | Self::ManualLink { url } => Some(url.as_str()),
            Self::CreatedViaCli { url } => url.as_deref(),
        }
    }
}

pub fn pr_title(exchange: &str) -> String {
    format!("Sync {exchange} examples from SDK")
}

pub fn pr_body(exchange: &str) -> String {
    format!(
        "This PR syncs examples from the {exchange} SDK repository.\n\n\
         Automatically generated by sync-examples."
    )
}

/// Markdown block appended to the CI step summary for a manual PR.
pub fn step_summary_markdown(exchange: &str, branch: &str, title: &str, url: &str) -> String {
    format!(
        "\n## 🔗 Create Pull Request\n\n\
         Click the link below to create a pull request:\n\n\
         [**👉 Create PR: {title}**]({url})\n\n\
         **Branch:** `{branch}`  \n\
         **Exchange:** {exchange}\n\n\
         ---\n"
    )
}

/// Opens the sync pull request for a pushed branch.
pub struct Publisher<'a> {
    runner: Arc<dyn ProcessRunner>,
    github: Option<&'a GitHubClient>,
    config: &'a GitHubConfig,
    repo_root: PathBuf,
}

impl<'a> Publisher<'a> {
    pub fn new(
        runner: Arc<dyn ProcessRunner>,
        github: Option<&'a GitHubClient>,
        config: &'a GitHubConfig,
        repo_root: &Path,
    ) -> Self {
        Self {
            runner,
            github,
            config,
            repo_root: repo_root.to_path_buf(),
        }
    }

    #[instrument(skip(self))]
    pub async fn publish(&self, exchange: &str, branch: &str) -> PrOutcome {
        let title = pr_title(exchange);
        let body = pr_body(exchange);
        let base = self.config.base_branch.as_str();

        let git = GitCli::new(self.runner.clone(), &self.repo_root);
        let slug = git
            .remote_url(&self.config.remote)
            .await
            .and_then(|url| parse_repo_slug(&url));
        debug!(slug = ?slug, "resolved repository slug");

        if let (Some(client), Some(slug)) = (self.github, slug.as_deref()) {
            let request = NewPullRequest {
                title: &title,
                body: &body,
                head: branch,
                base,
            };
            match client.create_pull_request(slug, &request).await {
                Ok(pr) => return PrOutcome::Created { url: pr.html_url },
                Err(e) => warn!(error = %e, "API pull request creation failed, trying gh"),
            }
        }

        if let Some(outcome) = self.create_with_gh(&title, &body, base).await {
            return outcome;
        }

        let url = compare_url(
            &derive_git_base_url(&self.config.api_url),
            slug.as_deref(),
            base,
            branch,
        );
        warn!(url = %url, "could not create pull request automatically");
        if let Some(path) = &self.config.step_summary {
            let markdown = step_summary_markdown(exchange, branch, &title, &url);
            if let Err(e) = append_step_summary(path, &markdown) {
                warn!(path = %path.display(), error = %e, "could not write step summary");
            }
        }
        PrOutcome::ManualLink { url }
    }

    async fn create_with_gh(&self, title: &str, body: &str, base: &str) -> Option<PrOutcome> {
        let mut invocation = Invocation::new("gh")
            .args(["pr", "create", "--title", title, "--body", body, "--base", base])
            .current_dir(&self.repo_root);
        if let Some(token) = &self.config.token {
            invocation = invocation.env("GH_TOKEN", token.as_str());
        }
        match self.runner.run_checked(&invocation).await {
            Ok(out) => {
                let url = out
                    .stdout
                    .lines()
                    .map(str::trim)
                    .rfind(|l| l.starts_with("https://"))
                    .map(str::to_string);
                info!(url = ?url, "created pull request with gh");
                Some(PrOutcome::CreatedViaCli { url })
            }
            Err(e) => {
                warn!(error = %e, "gh pr create failed");
                None
            }
        }
    }
}

fn append_step_summary(path: &Path, markdown: &str) -> std::io::Result<()> {
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;
    file.write_all(markdown.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::testing::ScriptedRunner;
    use crate::process::CommandOutput;

    fn github_config(summary: Option<PathBuf>) -> GitHubConfig {
        GitHubConfig {
            step_summary: summary,
            ..GitHubConfig::default()
        }
    }

    #[test]
    fn test_titles() {
        assert_eq!(pr_title("okx"), "Sync okx examples from SDK");
        assert!(pr_body("okx").contains("okx SDK repository"));
    }

    #[tokio::test]
    async fn test_gh_success() {
        let runner = Arc::new(ScriptedRunner::new());
        runner.respond(
            &["git", "config", "--get", "remote.origin.url"],
            CommandOutput::ok("https://github.com/acme/site.git\n"),
        );
        runner.respond(
            &["gh", "pr", "create"],
            CommandOutput::ok("Creating pull request\nhttps://github.com/acme/site/pull/7\n"),
        );
        let mut config = github_config(None);
        config.token = Some("ghp_x".into());

        let outcome = Publisher::new(runner.clone(), None, &config, Path::new("/repo"))
            .publish("okx", "sync/okx-examples-1")
            .await;
        assert_eq!(
            outcome,
            PrOutcome::CreatedViaCli {
                url: Some("https://github.com/acme/site/pull/7".into())
            }
        );

        let gh = runner
            .calls()
            .into_iter()
            .find(|c| c.program == "gh")
            .unwrap();
        assert_eq!(
            gh.args,
            vec![
                "pr",
                "create",
                "--title",
                "Sync okx examples from SDK",
                "--body",
                pr_body("okx").as_str(),
                "--base",
                "main"
            ]
        );
        assert_eq!(gh.envs, vec![("GH_TOKEN".to_string(), "ghp_x".to_string())]);
    }

    #[tokio::test]
    async fn test_manual_link_and_step_summary() {
        let dir = tempfile::tempdir().unwrap();
        let summary = dir.path().join("summary.md");
        std::fs::write(&summary, "# Existing\n").unwrap();

        let runner = Arc::new(ScriptedRunner::new());
        runner.respond(
            &["git", "config"],
            CommandOutput::ok("git@github.com:acme/site.git\n"),
        );
        runner.respond(&["gh"], CommandOutput::failed(4, "not logged in"));
        let config = github_config(Some(summary.clone()));

        let outcome = Publisher::new(runner.clone(), None, &config, Path::new("/repo"))
            .publish("kraken", "sync/kraken-examples-9")
            .await;
        let expected = "https://github.com/acme/site/compare/main...sync/kraken-examples-9?expand=1";
        assert_eq!(
            outcome,
            PrOutcome::ManualLink {
                url: expected.into()
            }
        );

        let written = std::fs::read_to_string(&summary).unwrap();
        assert!(written.starts_with("# Existing\n"));
        assert!(written.contains(expected));
        assert!(written.contains("`sync/kraken-examples-9`"));
        assert!(written.contains("**Exchange:** kraken"));
    }

    #[tokio::test]
    async fn test_manual_link_placeholder_without_remote() {
        let runner = Arc::new(ScriptedRunner::new());
        runner.respond(&["git", "config"], CommandOutput::failed(1, ""));
        runner.respond(&["gh"], CommandOutput::failed(1, ""));
        let config = github_config(None);

        let outcome = Publisher::new(runner.clone(), None, &config, Path::new("/repo"))
            .publish("gate", "b")
            .await;
        assert_eq!(
            outcome.url(),
            Some("https://github.com/YOUR_ORG/YOUR_REPO/compare/main...b?expand=1")
        );
    }

    #[tokio::test]
    async fn test_missing_gh_binary_degrades() {
        struct NoGh;
        #[async_trait::async_trait]
        impl ProcessRunner for NoGh {
            async fn run(
                &self,
                invocation: &Invocation,
            ) -> Result<CommandOutput, crate::errors::ProcessError> {
                if invocation.program == "gh" {
                    return Err(crate::errors::ProcessError::BinaryNotFound("gh".into()));
                }
                Ok(CommandOutput::ok("https://github.com/acme/site\n"))
            }
        }
        let config = github_config(None);
        let outcome = Publisher::new(Arc::new(NoGh), None, &config, Path::new("/repo"))
            .publish("bitget", "sync/bitget-examples-1")
            .await;
        assert!(matches!(outcome, PrOutcome::ManualLink { .. }));
        assert_eq!(
            outcome.url(),
            Some("https://github.com/acme/site/compare/main...sync/bitget-examples-1?expand=1")
        );
    }
}
