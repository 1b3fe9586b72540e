//! One-shot sync of an exchange SDK's examples into this repository.
//!
//! [`SyncEngine::run`] drives a single exchange through these stages:
//!
//! 1. Resolve the exchange key against the registry.
//! 2. Clone or hard-update the SDK checkout.
//! 3. Remove stale case-variant destination folders.
//! 4. Mirror the SDK's examples, rewriting imports and install comments.
//! 5. Run lint, format and build.
//! 6. If the scoped paths changed, branch, commit, push and open a PR.
//!
//! Every stage runs sequentially and any failure before publishing aborts
//! the run. Pull request creation itself never fails a run.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::collector::{collect_files, FileEntry};
use crate::config::{SyncPaths, ToolConfig};
use crate::errors::SyncError;
use crate::exchange::{self, ExchangeConfig};
use crate::git::{GitCli, GitHubClient};
use crate::process::{ProcessRunner, SystemRunner};
use crate::publish::{PrOutcome, Publisher};
use crate::transform::{TransformStep, Transformer};
use crate::verify::Verifier;

/// Remote of the SDK checkouts.
const SDK_REMOTE: &str = "origin";

/// Directory inside an SDK checkout that holds its examples.
const SDK_EXAMPLES_DIR: &str = "examples";

// ---------------------------------------------------------------------------
// Run options and results
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncOptions {
    /// Skip lint, format and build.
    pub skip_build: bool,
    /// Stop after copying; no change detection, commit or pull request.
    pub skip_pr: bool,
}

/// What a sync run touched.
#[derive(Debug, Clone, Serialize)]
pub struct SyncRun {
    pub exchange: &'static str,
    pub sdk_dir: PathBuf,
    pub source_dir: PathBuf,
    pub dest_dir: PathBuf,
    pub files_copied: usize,
    pub files_transformed: usize,
    /// Case-variant destination folders that were removed.
    pub removed_variants: Vec<String>,
    /// Scoped paths that `git status` reported as changed.
    pub changed_paths: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SyncOutcome {
    /// Files were mirrored but publishing was skipped.
    DryRun,
    /// The destination already matched upstream.
    NoChanges,
    Published {
        branch: String,
        pull_request: PrOutcome,
    },
}

impl fmt::Display for SyncOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DryRun => write!(f, "copied (publishing skipped)"),
            Self::NoChanges => write!(f, "no changes"),
            Self::Published { branch, .. } => write!(f, "published {branch}"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub run: SyncRun,
    pub outcome: SyncOutcome,
}

pub fn branch_name(exchange: &str, unix_millis: i64) -> String {
    format!("sync/{exchange}-examples-{unix_millis}")
}

pub fn commit_message(exchange: &str) -> String {
    format!("chore: sync {exchange} examples from SDK and rebuild")
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

pub struct SyncEngine {
    config: ToolConfig,
    paths: SyncPaths,
    runner: Arc<dyn ProcessRunner>,
    github: Option<GitHubClient>,
}

impl SyncEngine {
    /// Create an engine. A GitHub API client is built when a token was
    /// resolved into `config`.
    pub fn new(config: ToolConfig, paths: SyncPaths, runner: Arc<dyn ProcessRunner>) -> Self {
        let github = config.github.token.as_deref().and_then(|token| {
            match GitHubClient::new(&config.github.api_url, token) {
                Ok(client) => Some(client),
                Err(e) => {
                    warn!(error = %e, "could not build GitHub client, API disabled");
                    None
                }
            }
        });
        info!(
            repo_root = %paths.repo_root.display(),
            sdk_root = %paths.sdk_root.display(),
            api = github.is_some(),
            "initializing sync engine"
        );
        Self {
            config,
            paths,
            runner,
            github,
        }
    }

    /// Engine backed by real child processes.
    pub fn with_system_runner(config: ToolConfig, paths: SyncPaths) -> Self {
        Self::new(config, paths, Arc::new(SystemRunner))
    }

    pub fn config(&self) -> &ToolConfig {
        &self.config
    }

    pub fn paths(&self) -> &SyncPaths {
        &self.paths
    }

    /// Sync `exchange` (case-insensitive registry key).
    #[instrument(skip(self))]
    pub async fn run(&self, exchange: &str, options: SyncOptions) -> Result<SyncReport, SyncError> {
        let exchange = exchange::lookup(exchange)?;
        info!(
            exchange = exchange.key,
            package = exchange.package_name,
            dest = exchange.dest_folder,
            "starting sync"
        );

        let sdk_dir = self.paths.sdk_checkout(exchange);
        self.acquire_source(exchange, &sdk_dir).await?;

        let source_dir = sdk_dir.join(SDK_EXAMPLES_DIR);
        if !source_dir.is_dir() {
            return Err(SyncError::SourceMissing(source_dir));
        }

        let removed_variants = self.remove_case_variants(exchange).await?;

        let dest_dir = self.paths.destination(exchange);
        let transformer = Transformer::new(exchange.key, exchange.package_name)?;
        let stats = mirror_examples(exchange, &transformer, &source_dir, &dest_dir)?;

        let mut run = SyncRun {
            exchange: exchange.key,
            sdk_dir,
            source_dir,
            dest_dir,
            files_copied: stats.copied,
            files_transformed: stats.transformed,
            removed_variants,
            changed_paths: Vec::new(),
        };

        if options.skip_build {
            info!("skipping lint and build");
        } else {
            Verifier::new(
                self.runner.clone(),
                &self.paths.repo_root,
                self.config.verify.clone(),
            )
            .run()
            .await?;
        }

        if options.skip_pr {
            info!("skipping change detection and pull request");
            return Ok(SyncReport {
                run,
                outcome: SyncOutcome::DryRun,
            });
        }

        let git = GitCli::new(self.runner.clone(), &self.paths.repo_root);
        run.changed_paths = self.changed_paths(&git, exchange).await?;
        if run.changed_paths.is_empty() {
            info!("no changes detected, nothing to commit");
            return Ok(SyncReport {
                run,
                outcome: SyncOutcome::NoChanges,
            });
        }

        let outcome = self.publish(&git, exchange, &run.changed_paths).await?;
        Ok(SyncReport { run, outcome })
    }

    /// Clone the SDK, or hard-reset an existing checkout to its default
    /// branch.
    async fn acquire_source(&self, exchange: &ExchangeConfig, sdk_dir: &Path) -> Result<(), SyncError> {
        if sdk_dir.exists() {
            info!(path = %sdk_dir.display(), "updating SDK checkout");
            GitCli::new(self.runner.clone(), sdk_dir)
                .update_to_default_branch(SDK_REMOTE)
                .await?;
            return Ok(());
        }

        let url = self.config.sdk.clone_url(exchange);
        if let Some(parent) = sdk_dir.parent() {
            std::fs::create_dir_all(parent).map_err(|e| SyncError::io(parent, e))?;
        }
        info!(url = %url, path = %sdk_dir.display(), "cloning SDK");
        GitCli::clone_repo(self.runner.clone(), &url, sdk_dir).await?;
        Ok(())
    }

    /// Delete every destination folder whose name matches the canonical one
    /// ignoring case, and untrack the non-canonical ones so a rename lands
    /// in the commit.
    async fn remove_case_variants(&self, exchange: &ExchangeConfig) -> Result<Vec<String>, SyncError> {
        let root = &self.paths.examples_root;
        if !root.is_dir() {
            return Ok(Vec::new());
        }

        let mut variants = Vec::new();
        for entry in std::fs::read_dir(root).map_err(|e| SyncError::io(root, e))? {
            let entry = entry.map_err(|e| SyncError::io(root, e))?;
            let name = entry.file_name().to_string_lossy().to_string();
            if !name.eq_ignore_ascii_case(exchange.dest_folder) || !entry.path().is_dir() {
                continue;
            }
            let path = entry.path();
            std::fs::remove_dir_all(&path).map_err(|e| SyncError::io(&path, e))?;
            debug!(path = %path.display(), "removed destination folder");
            if name != exchange.dest_folder {
                variants.push(name);
            }
        }

        if !variants.is_empty() {
            let git = GitCli::new(self.runner.clone(), &self.paths.repo_root);
            for name in &variants {
                info!(folder = %name, canonical = exchange.dest_folder, "removing case-variant folder");
                git.rm_cached(&format!("{}/{}", self.paths.examples_rel, name))
                    .await;
            }
        }
        Ok(variants)
    }

    /// Pathspecs under the destination (and public dir, if built) with
    /// pending changes.
    async fn changed_paths(&self, git: &GitCli, exchange: &ExchangeConfig) -> Result<Vec<String>, SyncError> {
        let mut candidates = vec![self.paths.destination_pathspec(exchange)];
        if self.paths.public_dir.is_dir() {
            candidates.push(format!("{}/", self.paths.public_rel));
        }

        let mut changed = Vec::new();
        for pathspec in candidates {
            let status = git.status_porcelain(&[pathspec.as_str()]).await?;
            if status.trim().is_empty() {
                debug!(pathspec = %pathspec, "unchanged");
            } else {
                debug!(pathspec = %pathspec, entries = status.lines().count(), "changed");
                changed.push(pathspec);
            }
        }
        Ok(changed)
    }

    async fn publish(
        &self,
        git: &GitCli,
        exchange: &ExchangeConfig,
        changed: &[String],
    ) -> Result<SyncOutcome, SyncError> {
        let pathspecs: Vec<&str> = changed.iter().map(String::as_str).collect();
        git.add(&pathspecs).await?;

        let staged = git.staged_files().await?;
        if staged.is_empty() {
            info!("nothing staged after add, nothing to commit");
            return Ok(SyncOutcome::NoChanges);
        }
        info!(files = staged.len(), "staged changes");

        let branch = branch_name(exchange.key, Utc::now().timestamp_millis());
        git.checkout_new_branch(&branch).await?;
        git.commit(&commit_message(exchange.key)).await?;
        git.push_upstream(&self.config.github.remote, &branch).await?;

        let pull_request = Publisher::new(
            self.runner.clone(),
            self.github.as_ref(),
            &self.config.github,
            &self.paths.repo_root,
        )
        .publish(exchange.key, &branch)
        .await;

        Ok(SyncOutcome::Published {
            branch,
            pull_request,
        })
    }
}

// ---------------------------------------------------------------------------
// Mirroring
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct MirrorStats {
    copied: usize,
    transformed: usize,
}

/// Replace `dest` with a transformed copy of `source`.
fn mirror_examples(
    exchange: &ExchangeConfig,
    transformer: &Transformer,
    source: &Path,
    dest: &Path,
) -> Result<MirrorStats, SyncError> {
    if dest.exists() {
        std::fs::remove_dir_all(dest).map_err(|e| SyncError::io(dest, e))?;
    }
    std::fs::create_dir_all(dest).map_err(|e| SyncError::io(dest, e))?;

    let files = collect_files(source, exchange.exclude_folders).map_err(|e| SyncError::io(source, e))?;
    info!(count = files.len(), from = %source.display(), to = %dest.display(), "copying examples");

    let mut stats = MirrorStats::default();
    let mut rule_hits: BTreeMap<TransformStep, usize> = BTreeMap::new();

    for path in files {
        let entry = FileEntry::load(source, &path).map_err(|e| SyncError::io(&path, e))?;
        let target = dest.join(&entry.relative_path);
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent).map_err(|e| SyncError::io(parent, e))?;
        }

        let bytes = if entry.is_source_code() {
            match String::from_utf8(entry.content) {
                Ok(text) => {
                    let (rewritten, report) = transformer.transform_with_report(&text);
                    for (step, n) in report.steps() {
                        *rule_hits.entry(step).or_default() += n;
                    }
                    stats.transformed += 1;
                    rewritten.into_bytes()
                }
                Err(e) => {
                    warn!(path = %path.display(), "source file is not UTF-8, copying verbatim");
                    e.into_bytes()
                }
            }
        } else {
            entry.content
        };

        std::fs::write(&target, bytes).map_err(|e| SyncError::io(&target, e))?;
        stats.copied += 1;
    }

    for (step, hits) in &rule_hits {
        if *hits == 0 && *step != TransformStep::BlankLines {
            debug!(
                exchange = exchange.key,
                rule = %step,
                "rule matched nothing in any file; upstream examples may have changed"
            );
        }
    }

    info!(
        copied = stats.copied,
        transformed = stats.transformed,
        "examples copied"
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{ConfigError, GitError};
    use crate::process::testing::ScriptedRunner;
    use crate::process::CommandOutput;

    const BINANCE_EXAMPLE: &str = "import { MainClient } from '../src/index';\n\
                                   \n\
                                   // or\n\
                                   // import { MainClient } from 'binance';\n\
                                   \n\
                                   const client = new MainClient();\n";

    struct Fixture {
        _dir: tempfile::TempDir,
        repo_root: PathBuf,
        sdk_root: PathBuf,
        summary: PathBuf,
    }

    impl Fixture {
        /// A destination repo plus a binance SDK checkout with examples.
        fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            let repo_root = dir.path().join("site");
            let sdk_root = dir.path().join("sdks");
            std::fs::create_dir_all(repo_root.join("examples")).unwrap();
            let examples = sdk_root.join("binance/examples");
            std::fs::create_dir_all(examples.join("rest")).unwrap();
            std::fs::create_dir_all(examples.join("apidoc")).unwrap();
            std::fs::write(examples.join("rest/time.ts"), BINANCE_EXAMPLE).unwrap();
            std::fs::write(examples.join("README.md"), "// from '../src/index'\n").unwrap();
            std::fs::write(examples.join("apidoc/index.html"), "<html/>").unwrap();
            let summary = dir.path().join("summary.md");
            Self {
                _dir: dir,
                repo_root,
                sdk_root,
                summary,
            }
        }

        fn engine(&self, runner: &Arc<ScriptedRunner>) -> SyncEngine {
            let mut config = ToolConfig::default();
            config.paths.sdk_root = self.sdk_root.clone();
            config.github.step_summary = Some(self.summary.clone());
            let paths = SyncPaths::new(&self.repo_root, &config.paths);
            SyncEngine::new(config, paths, runner.clone())
        }

        fn dest(&self) -> PathBuf {
            self.repo_root.join("examples/Binance")
        }
    }

    fn changes_pending(runner: &ScriptedRunner) {
        runner.respond(
            &["git", "status", "--porcelain", "--", "examples/Binance/"],
            CommandOutput::ok("?? examples/Binance/\n"),
        );
        runner.respond(
            &["git", "diff", "--cached", "--name-only"],
            CommandOutput::ok("examples/Binance/rest/time.ts\n"),
        );
        runner.respond(
            &["git", "config", "--get"],
            CommandOutput::ok("https://github.com/acme/site.git\n"),
        );
    }

    const BUILD_ONLY: SyncOptions = SyncOptions {
        skip_build: true,
        skip_pr: false,
    };

    #[tokio::test]
    async fn test_unknown_exchange_has_no_side_effects() {
        let fx = Fixture::new();
        let runner = Arc::new(ScriptedRunner::new());
        let err = fx
            .engine(&runner)
            .run("ftx", SyncOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SyncError::Config(ConfigError::UnknownExchange { .. })
        ));
        assert!(runner.calls().is_empty());
        assert!(!fx.dest().exists());
    }

    #[tokio::test]
    async fn test_existing_checkout_is_updated_and_examples_mirrored() {
        let fx = Fixture::new();
        let runner = Arc::new(ScriptedRunner::new());
        let report = fx
            .engine(&runner)
            .run(
                "Binance",
                SyncOptions {
                    skip_build: true,
                    skip_pr: true,
                },
            )
            .await
            .unwrap();

        assert_eq!(report.outcome, SyncOutcome::DryRun);
        assert_eq!(report.run.exchange, "binance");
        assert_eq!(report.run.files_copied, 2);
        assert_eq!(report.run.files_transformed, 1);
        assert_eq!(
            runner.commands(),
            vec!["git fetch origin", "git reset --hard origin/main"]
        );

        let time = std::fs::read_to_string(fx.dest().join("rest/time.ts")).unwrap();
        assert_eq!(
            time,
            "import { MainClient } from 'binance';\n\nconst client = new MainClient();\n"
        );
        // Non-source files are byte-for-byte copies.
        assert_eq!(
            std::fs::read_to_string(fx.dest().join("README.md")).unwrap(),
            "// from '../src/index'\n"
        );
        assert!(!fx.dest().join("apidoc").exists());
    }

    #[tokio::test]
    async fn test_stale_destination_files_are_removed() {
        let fx = Fixture::new();
        std::fs::create_dir_all(fx.dest().join("old")).unwrap();
        std::fs::write(fx.dest().join("old/gone.ts"), "x").unwrap();
        let runner = Arc::new(ScriptedRunner::new());
        fx.engine(&runner)
            .run(
                "binance",
                SyncOptions {
                    skip_build: true,
                    skip_pr: true,
                },
            )
            .await
            .unwrap();
        assert!(!fx.dest().join("old").exists());
        assert!(fx.dest().join("rest/time.ts").exists());
    }

    #[tokio::test]
    async fn test_non_utf8_source_is_copied_verbatim() {
        let fx = Fixture::new();
        let bytes = vec![0x66, 0x72, 0xff, 0xfe, 0x0a];
        std::fs::write(fx.sdk_root.join("binance/examples/rest/raw.ts"), &bytes).unwrap();
        let runner = Arc::new(ScriptedRunner::new());
        let report = fx
            .engine(&runner)
            .run(
                "binance",
                SyncOptions {
                    skip_build: true,
                    skip_pr: true,
                },
            )
            .await
            .unwrap();
        assert_eq!(std::fs::read(fx.dest().join("rest/raw.ts")).unwrap(), bytes);
        assert_eq!(report.run.files_transformed, 1);
        assert_eq!(report.run.files_copied, 3);
    }

    #[tokio::test]
    async fn test_case_variant_folders_are_replaced() {
        let fx = Fixture::new();
        let examples = fx.repo_root.join("examples");
        std::fs::create_dir_all(examples.join("binance")).unwrap();
        std::fs::write(examples.join("binance/legacy.ts"), "x").unwrap();
        std::fs::create_dir_all(fx.dest()).unwrap();
        std::fs::write(fx.dest().join("current.ts"), "x").unwrap();
        std::fs::create_dir_all(examples.join("Bybit")).unwrap();

        let runner = Arc::new(ScriptedRunner::new());
        let report = fx
            .engine(&runner)
            .run(
                "binance",
                SyncOptions {
                    skip_build: true,
                    skip_pr: true,
                },
            )
            .await
            .unwrap();

        let mut names: Vec<String> = std::fs::read_dir(&examples)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        assert_eq!(names, vec!["Binance", "Bybit"]);
        assert!(!fx.dest().join("current.ts").exists());
        assert_eq!(report.run.removed_variants, vec!["binance"]);

        let untracked: Vec<String> = runner
            .commands()
            .into_iter()
            .filter(|c| c.starts_with("git rm"))
            .collect();
        assert_eq!(
            untracked,
            vec!["git rm -r --cached --ignore-unmatch -q examples/binance"]
        );
    }

    #[tokio::test]
    async fn test_missing_checkout_is_cloned() {
        let fx = Fixture::new();
        std::fs::remove_dir_all(fx.sdk_root.join("binance")).unwrap();
        let runner = Arc::new(ScriptedRunner::new());
        let err = fx
            .engine(&runner)
            .run("binance", SyncOptions::default())
            .await
            .unwrap_err();

        // The scripted clone creates nothing, so the source check trips.
        assert!(matches!(err, SyncError::SourceMissing(_)));
        let clone = &runner.calls()[0];
        assert_eq!(clone.args[0], "clone");
        assert_eq!(clone.args[1], "https://github.com/tiagosiebler/binance.git");
        assert_eq!(clone.cwd.as_deref(), Some(fx.sdk_root.as_path()));
    }

    #[tokio::test]
    async fn test_update_failure_is_fatal() {
        let fx = Fixture::new();
        let runner = Arc::new(ScriptedRunner::new());
        runner.respond(&["git", "fetch"], CommandOutput::failed(128, "offline"));
        let err = fx
            .engine(&runner)
            .run("binance", SyncOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::Git(GitError::UpdateFailed { .. })));
        assert!(!fx.dest().exists());
    }

    #[tokio::test]
    async fn test_master_fallback() {
        let fx = Fixture::new();
        let runner = Arc::new(ScriptedRunner::new());
        runner.respond(
            &["git", "reset", "--hard", "origin/main"],
            CommandOutput::failed(128, "unknown revision"),
        );
        fx.engine(&runner)
            .run(
                "binance",
                SyncOptions {
                    skip_build: true,
                    skip_pr: true,
                },
            )
            .await
            .unwrap();
        assert!(runner.ran("git reset --hard origin/master"));
        assert!(fx.dest().join("rest/time.ts").exists());
    }

    #[tokio::test]
    async fn test_verification_failure_commits_nothing() {
        let fx = Fixture::new();
        let runner = Arc::new(ScriptedRunner::new());
        changes_pending(&runner);
        runner.respond(&["npm", "run", "buildfast"], CommandOutput::failed(2, ""));
        let err = fx
            .engine(&runner)
            .run("binance", SyncOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SyncError::VerificationFailed { ref step, exit_code: 2 } if step == "buildfast"
        ));
        assert!(!runner.ran("git status"));
        assert!(!runner.ran("git commit"));
        assert!(!runner.ran("git push"));
    }

    #[tokio::test]
    async fn test_no_changes_creates_no_branch() {
        let fx = Fixture::new();
        let runner = Arc::new(ScriptedRunner::new());
        let report = fx
            .engine(&runner)
            .run("binance", BUILD_ONLY)
            .await
            .unwrap();
        assert_eq!(report.outcome, SyncOutcome::NoChanges);
        assert!(report.run.changed_paths.is_empty());
        assert!(runner.ran("git status --porcelain -- examples/Binance/"));
        assert!(!runner.ran("git add"));
        assert!(!runner.ran("git checkout"));
        assert!(!runner.ran("git push"));
    }

    #[tokio::test]
    async fn test_nothing_staged_is_no_changes() {
        let fx = Fixture::new();
        let runner = Arc::new(ScriptedRunner::new());
        runner.respond(
            &["git", "status", "--porcelain"],
            CommandOutput::ok(" M examples/Binance/rest/time.ts\n"),
        );
        let report = fx
            .engine(&runner)
            .run("binance", BUILD_ONLY)
            .await
            .unwrap();
        assert_eq!(report.outcome, SyncOutcome::NoChanges);
        assert!(runner.ran("git add -- examples/Binance/"));
        assert!(!runner.ran("git checkout"));
    }

    #[tokio::test]
    async fn test_changes_are_published_with_gh() {
        let fx = Fixture::new();
        std::fs::create_dir_all(fx.repo_root.join("public")).unwrap();
        let runner = Arc::new(ScriptedRunner::new());
        changes_pending(&runner);
        runner.respond(
            &["gh", "pr", "create"],
            CommandOutput::ok("https://github.com/acme/site/pull/3\n"),
        );

        let report = fx
            .engine(&runner)
            .run("binance", SyncOptions::default())
            .await
            .unwrap();

        let SyncOutcome::Published {
            branch,
            pull_request,
        } = report.outcome
        else {
            panic!("expected a published outcome");
        };
        assert!(branch.starts_with("sync/binance-examples-"));
        assert_eq!(
            pull_request,
            PrOutcome::CreatedViaCli {
                url: Some("https://github.com/acme/site/pull/3".into())
            }
        );
        // public/ was checked but is clean, so only the destination is staged.
        assert_eq!(report.run.changed_paths, vec!["examples/Binance/"]);

        let commands = runner.commands();
        let pos = |prefix: &str| {
            commands
                .iter()
                .position(|c| c.starts_with(prefix))
                .unwrap_or_else(|| panic!("missing command {prefix}"))
        };
        assert!(commands.contains(&"git status --porcelain -- public/".to_string()));
        assert!(pos("npm run buildfast") < pos("git status"));
        assert!(pos("git add -- examples/Binance/") < pos("git diff --cached"));
        assert!(pos("git diff --cached") < pos("git checkout -b sync/binance-examples-"));
        assert!(pos("git checkout -b") < pos("git commit"));
        assert!(commands.contains(
            &"git commit -m chore: sync binance examples from SDK and rebuild".to_string()
        ));
        assert!(commands.contains(&format!("git push -u origin {branch}")));
        assert!(pos("git push") < pos("gh pr create"));
    }

    #[tokio::test]
    async fn test_pr_failure_degrades_to_manual_link() {
        let fx = Fixture::new();
        let runner = Arc::new(ScriptedRunner::new());
        changes_pending(&runner);
        runner.respond(&["gh"], CommandOutput::failed(1, "gh: not authenticated"));

        let report = fx
            .engine(&runner)
            .run("binance", BUILD_ONLY)
            .await
            .unwrap();
        let SyncOutcome::Published {
            branch,
            pull_request,
        } = report.outcome
        else {
            panic!("expected a published outcome");
        };
        let expected =
            format!("https://github.com/acme/site/compare/main...{branch}?expand=1");
        assert_eq!(
            pull_request,
            PrOutcome::ManualLink {
                url: expected.clone()
            }
        );
        let summary = std::fs::read_to_string(&fx.summary).unwrap();
        assert!(summary.contains(&expected));
    }

    #[test]
    fn test_names() {
        assert_eq!(
            branch_name("okx", 1_700_000_000_000),
            "sync/okx-examples-1700000000000"
        );
        assert_eq!(
            commit_message("okx"),
            "chore: sync okx examples from SDK and rebuild"
        );
    }
}
