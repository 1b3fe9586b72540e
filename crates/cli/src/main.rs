//! `sync-examples`: mirror one exchange SDK's examples into this repository.
//!
//! ```text
//! sync-examples <exchange> [--skip-build] [--skip-pr]
//! ```
//!
//! Clones or updates the SDK next to this repository, copies its examples
//! with imports rewritten to the published package, runs lint and build,
//! and opens a pull request when anything changed.

mod style;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use tracing_subscriber::EnvFilter;

use examplesync_core::config::{SyncPaths, ToolConfig};
use examplesync_core::exchange::{self, EXCHANGES};
use examplesync_core::{PrOutcome, SyncEngine, SyncOptions, SyncOutcome, SyncReport};

// ---------------------------------------------------------------------------
// CLI argument definitions
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "sync-examples",
    version,
    about = "Sync an exchange SDK's examples into this repository and open a PR"
)]
struct Cli {
    /// Exchange key, e.g. binance, okx, kraken (see --list).
    exchange: Option<String>,

    /// Skip lint, format and build.
    #[arg(long)]
    skip_build: bool,

    /// Copy only; do not commit, push or open a pull request.
    #[arg(long)]
    skip_pr: bool,

    /// Root of the examples repository (default: current directory).
    #[arg(long)]
    repo_root: Option<PathBuf>,

    /// Configuration file (default: <repo-root>/sync-examples.toml if present).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// List supported exchanges and exit.
    #[arg(long)]
    list: bool,

    /// Write a commented default configuration file and exit.
    #[arg(long, value_name = "PATH")]
    init_config: Option<PathBuf>,

    /// Verbose logging (debug level).
    #[arg(short, long)]
    verbose: bool,
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .without_time()
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", style::error(&format!("Error: {:#}", e)));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    if cli.list {
        print_exchanges();
        return Ok(());
    }
    if let Some(output) = &cli.init_config {
        return cmd_init_config(output);
    }

    let Some(name) = cli.exchange.as_deref() else {
        eprintln!("{}", Cli::command().render_usage());
        eprintln!();
        print_exchanges();
        anyhow::bail!("no exchange given");
    };
    if let Err(e) = exchange::lookup(name) {
        print_exchanges();
        return Err(e.into());
    }

    let repo_root = match cli.repo_root {
        Some(root) => root,
        None => std::env::current_dir().context("failed to determine current directory")?,
    };
    tracing::debug!(repo_root = %repo_root.display(), "resolved repository root");
    let config = ToolConfig::load_and_resolve(cli.config.as_deref(), &repo_root)
        .context("failed to load configuration")?;
    let paths = SyncPaths::new(&repo_root, &config.paths);

    let options = SyncOptions {
        skip_build: cli.skip_build,
        skip_pr: cli.skip_pr,
    };
    let report = SyncEngine::with_system_runner(config, paths)
        .run(name, options)
        .await
        .with_context(|| format!("sync of '{}' failed", name))?;

    print_report(&report);
    Ok(())
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

fn print_exchanges() {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Exchange", "SDK repository", "npm package", "Folder"]);
    for ex in EXCHANGES {
        table.add_row(vec![ex.key, ex.repo_name, ex.package_name, ex.dest_folder]);
    }
    eprintln!("{}", style::header("Supported exchanges"));
    eprintln!("{table}");
}

fn print_report(report: &SyncReport) {
    let run = &report.run;
    println!();
    println!(
        "{}",
        style::success(&format!(
            "{} examples copied to {} ({} files, {} rewritten)",
            run.exchange,
            run.dest_dir.display(),
            run.files_copied,
            run.files_transformed
        ))
    );
    for variant in &run.removed_variants {
        println!(
            "{}",
            style::warn(&format!("removed case-variant folder '{}'", variant))
        );
    }

    match &report.outcome {
        SyncOutcome::DryRun => {
            println!("{}", style::dim("Publishing skipped (--skip-pr)."));
        }
        SyncOutcome::NoChanges => {
            println!("{}", style::success("No changes detected, nothing to commit."));
        }
        SyncOutcome::Published {
            branch,
            pull_request,
        } => {
            println!("{}", style::success(&format!("Pushed branch {}", branch)));
            match pull_request {
                PrOutcome::Created { url } => {
                    println!("{}", style::success("Pull request created"));
                    println!("   {}", style::link(url));
                }
                PrOutcome::CreatedViaCli { url } => {
                    println!("{}", style::success("Pull request created with gh"));
                    if let Some(url) = url {
                        println!("   {}", style::link(url));
                    }
                }
                PrOutcome::ManualLink { url } => {
                    println!(
                        "{}",
                        style::warn("Could not create the pull request automatically. Open it here:")
                    );
                    println!("   {}", style::link(url));
                    println!("   {}", style::dim(&format!("Branch: {}", branch)));
                }
            }
        }
    }
}

fn cmd_init_config(output: &Path) -> Result<()> {
    if output.exists() {
        anyhow::bail!(
            "file already exists: {}. Use a different path or remove the existing file.",
            output.display()
        );
    }
    std::fs::write(output, ToolConfig::default_template())
        .context("failed to write config file")?;
    println!(
        "{}",
        style::success(&format!(
            "Default configuration written to {}",
            output.display()
        ))
    );
    Ok(())
}
