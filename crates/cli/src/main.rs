//! Curvelet Dataset Builder - Main Entry Point

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use curvelet_cli::{build_dataset, init_logging, inspect_image, Settings};
use dataset_builder::{EntryOrder, MismatchPolicy};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "curvelet-dataset")]
#[command(about = "Build curvelet feature datasets from labeled image corpora")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the feature table of a corpus.
    Build(BuildArgs),

    /// Print the feature vector of one image as JSON.
    Inspect(InspectArgs),
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OrderArg {
    Directory,
    Name,
}

impl From<OrderArg> for EntryOrder {
    fn from(arg: OrderArg) -> Self {
        match arg {
            OrderArg::Directory => EntryOrder::Directory,
            OrderArg::Name => EntryOrder::Name,
        }
    }
}

#[derive(Debug, Args)]
struct BuildArgs {
    /// Corpus root holding the two label directories.
    #[arg(long)]
    root: PathBuf,

    /// Path of the CSV table to write.
    #[arg(long)]
    output: PathBuf,

    /// Settings file (TOML or JSON).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of worker sessions.
    #[arg(long)]
    workers: Option<usize>,

    /// Path to write the run summary (JSON).
    #[arg(long)]
    summary: Option<PathBuf>,

    /// File visiting order within each label directory.
    #[arg(long, value_enum)]
    order: Option<OrderArg>,

    /// Count rows with a differing feature length as failures instead of aborting.
    #[arg(long)]
    skip_mismatched: bool,
}

#[derive(Debug, Args)]
struct InspectArgs {
    /// Path to the input image.
    #[arg(long)]
    image: PathBuf,

    /// Settings file (TOML or JSON).
    #[arg(long)]
    config: Option<PathBuf>,
}

fn load_settings(path: Option<&PathBuf>) -> Result<Settings> {
    Settings::load(path.map(PathBuf::as_path)).context("failed to load settings")
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Build(args) => {
            let mut settings = load_settings(args.config.as_ref())?;
            if let Some(workers) = args.workers {
                settings.run.workers = workers;
            }
            if let Some(summary) = args.summary {
                settings.run.summary = Some(summary);
            }
            if let Some(order) = args.order {
                settings.dataset.order = order.into();
            }
            if args.skip_mismatched {
                settings.run.mismatch_policy = MismatchPolicy::SkipRow;
            }
            init_logging(&settings.logging.level, settings.logging.json)?;

            info!("=== Curvelet Dataset Builder v{} ===", env!("CARGO_PKG_VERSION"));

            let report = build_dataset(&settings, &args.root, &args.output).await?;
            println!("{}", serde_json::to_string_pretty(&report.summary)?);
        }
        Commands::Inspect(args) => {
            let settings = load_settings(args.config.as_ref())?;
            init_logging(&settings.logging.level, settings.logging.json)?;

            let inspection = inspect_image(&settings, &args.image)?;
            println!("{}", serde_json::to_string_pretty(&inspection)?);
        }
    }

    Ok(())
}
