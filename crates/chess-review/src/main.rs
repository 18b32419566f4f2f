//! Chess Review - classifies every move of a game from engine output.
//!
//! Reads a JSON game with the engine's multi-PV candidates per ply,
//! labels each move and prints per-colour statistics with the six
//! positional indices.

mod review;

use std::path::PathBuf;

use chess_analysis::{AnalysisConfig, MoveClassifier};
use clap::Parser;
use review::ReviewInput;
use tracing_subscriber::EnvFilter;

/// Chess Review - move classification from multi-PV engine output.
#[derive(Parser)]
#[command(name = "chess-review")]
#[command(about = "Classifies the moves of a game and prints review statistics")]
struct Args {
    /// JSON game with engine candidates per ply
    #[arg(long, short)]
    input: PathBuf,

    /// TOML configuration; defaults apply when the file is missing
    #[arg(long, default_value = "review.toml")]
    config: PathBuf,

    /// Overrides the formula directory from the configuration
    #[arg(long)]
    formulas: Option<PathBuf>,

    /// Recompute plies that already carry an analysis
    #[arg(long)]
    reanalyse: bool,

    /// Print the review as JSON instead of a text table
    #[arg(long)]
    json: bool,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(long, short)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut config = AnalysisConfig::load(&args.config)?;
    if let Some(dir) = args.formulas {
        config.formula_dir = dir;
    }
    tracing::info!("Config: {:?}", args.config);
    tracing::info!("Formula directory: {:?}", config.formula_dir);

    let classifier = MoveClassifier::new(&config);
    if classifier.formulas().is_empty() {
        tracing::warn!("No formulas loaded, every index will read 0");
    }

    let input = ReviewInput::read(&args.input)?;
    let review = review::run(&classifier, input, args.reanalyse)?;

    if args.json {
        println!("{}", review.to_json()?);
    } else {
        print!("{}", review.to_text());
    }
    Ok(())
}
