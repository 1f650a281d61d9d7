//! Page-Mirror main entry point
//!
//! This is the command-line interface for the Page-Mirror page downloader.

use anyhow::Context;
use clap::Parser;
use page_mirror::config::{load_config, Config, FailurePolicy};
use page_mirror::{LoadResult, PageLoader};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Page-Mirror: download a web page and the resources it embeds
///
/// The page is saved as `<name>.html` next to a `<name>_files` directory
/// holding its same-host stylesheets, scripts and images.
#[derive(Parser, Debug)]
#[command(name = "page-mirror")]
#[command(version)]
#[command(about = "Download the specified address from the Internet", long_about = None)]
struct Cli {
    /// Address of the page to download
    #[arg(value_name = "URL")]
    url: String,

    /// Output directory (defaults to the current directory)
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Keep going when individual resources fail to download
    #[arg(long)]
    best_effort: bool,

    /// Maximum number of resources downloaded at the same time
    #[arg(long, value_name = "N")]
    max_concurrent: Option<usize>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all log output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    match run(cli).await {
        Ok(result) => {
            println!("{}", result.filepath.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Logs go to stderr; stdout only carries the saved file path.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("off")
    } else {
        match verbose {
            0 => EnvFilter::new("error"),
            1 => EnvFilter::new("page_mirror=info,warn"),
            2 => EnvFilter::new("page_mirror=debug,info"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Builds the configuration from the optional file and flags, then loads the page
async fn run(cli: Cli) -> anyhow::Result<LoadResult> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?
        }
        None => Config::default(),
    };

    if cli.best_effort {
        config.loader.failure_policy = FailurePolicy::BestEffort;
    }
    if let Some(max_concurrent) = cli.max_concurrent {
        config.loader.max_concurrent_fetches = max_concurrent;
    }

    let output = match cli.output {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to determine the current directory")?,
    };

    let loader = PageLoader::new(config)?;
    let result = loader.load(&cli.url, &output).await?;

    for outcome in result.report.failed() {
        eprintln!(
            "warning: {} was not saved as {}",
            outcome.resource.url, outcome.resource.file_name
        );
    }

    Ok(result)
}
