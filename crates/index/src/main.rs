//! `build-examples-index`: write `examples-index.json` and the static viewer
//! into the public directory.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use console::Style;
use tracing_subscriber::EnvFilter;

use examplesync_core::index::{build_index, write_site, SiteOutput};

#[derive(Parser, Debug)]
#[command(
    name = "build-examples-index",
    version,
    about = "Build the browsable examples index"
)]
struct Cli {
    /// Root of the examples repository (default: current directory).
    #[arg(long)]
    repo_root: Option<PathBuf>,

    /// Examples directory, relative to the repository root.
    #[arg(long, default_value = "examples")]
    examples_dir: String,

    /// Output directory, relative to the repository root.
    #[arg(long, default_value = "public")]
    out: String,

    /// Verbose logging (debug level).
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .without_time()
        .init();

    match run(&cli) {
        Ok(output) => {
            println!(
                "{} wrote {}",
                Style::new().green().apply_to("✓"),
                output.index_path.display()
            );
            for asset in &output.missing_assets {
                println!("{} {} not found, not copied", Style::new().yellow().apply_to("⚠"), asset);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{} Error: {:#}", Style::new().red().apply_to("✗"), e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<SiteOutput> {
    let repo_root = match &cli.repo_root {
        Some(root) => root.clone(),
        None => std::env::current_dir().context("failed to determine current directory")?,
    };
    let tree = build_index(&repo_root, &cli.examples_dir).context("failed to build examples index")?;
    tracing::info!(files = tree.file_count(), "indexed examples");
    write_site(&repo_root, &cli.out, tree).context("failed to write site output")
}
