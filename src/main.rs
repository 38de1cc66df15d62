//! # Train and score the baseline on a percent-change file
//! market-direction evaluate --data coconut_challenge.csv
//!
//! # Use a different window and guess, save the report
//! market-direction evaluate -d coconut_challenge.csv -w 10 -g up -o report.json
//!
//! # Show shape and label distribution
//! market-direction inspect --data coconut_challenge.csv

use std::fs;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use market_direction::data::{Direction, ObservationLoader};
use market_direction::evaluation::evaluate;
use market_direction::forecast::{ConstantGuess, Forecaster};
use market_direction::windowing::window_and_label;
use market_direction::ForecastConfig;

const SEPARATOR: &str = "============================================================";

#[derive(Parser)]
#[command(name = "market-direction")]
#[command(about = "Windowed next-move direction labeling and baseline forecasting")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to a JSON configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Train the constant-guess forecaster and report per-class accuracy
    Evaluate {
        /// Path to the percent-change CSV file
        #[arg(short, long, default_value = "coconut_challenge.csv")]
        data: PathBuf,

        /// Time points per window
        #[arg(short, long)]
        window_size: Option<usize>,

        /// Direction to guess: up, flat or down
        #[arg(short, long)]
        guess: Option<String>,

        /// Write the accuracy report as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print data shape and per-market label distribution
    Inspect {
        /// Path to the percent-change CSV file
        #[arg(short, long, default_value = "coconut_challenge.csv")]
        data: PathBuf,

        /// Time points per window
        #[arg(short, long)]
        window_size: Option<usize>,
    },
}

fn load_config(path: Option<&PathBuf>) -> Result<ForecastConfig> {
    match path {
        Some(path) => ForecastConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => Ok(ForecastConfig::default()),
    }
}

fn cmd_evaluate(
    mut config: ForecastConfig,
    data: PathBuf,
    window_size: Option<usize>,
    guess: Option<String>,
    output: Option<PathBuf>,
) -> Result<()> {
    if let Some(window_size) = window_size {
        config.window.window_size = window_size;
    }
    if let Some(guess) = guess {
        config.forecaster.guess =
            Direction::from_str(&guess).ok_or_else(|| anyhow!("Invalid guess: {}", guess))?;
    }

    let loader = ObservationLoader::new(config.loader.clone());
    let loaded = loader
        .load(&data)
        .with_context(|| format!("Failed to load {}", data.display()))?;

    let labeled = window_and_label(&loaded.observations, config.window.window_size)
        .context("Failed to window observations")?;
    info!(
        "Built {} windows of {} time points",
        labeled.len(),
        labeled.window_size
    );

    let mut forecaster = ConstantGuess::new(config.forecaster.clone());
    forecaster.train(&labeled)?;
    let report = evaluate(&forecaster, &labeled)?;

    println!("{}", report.summary("Training"));

    if let Some(output) = output {
        if let Some(parent) = output.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(&report)?;
        fs::write(&output, content)
            .with_context(|| format!("Failed to write {}", output.display()))?;
        info!("Report written to {}", output.display());
    }

    Ok(())
}

fn cmd_inspect(
    mut config: ForecastConfig,
    data: PathBuf,
    window_size: Option<usize>,
) -> Result<()> {
    if let Some(window_size) = window_size {
        config.window.window_size = window_size;
    }

    let loaded = ObservationLoader::new(config.loader.clone())
        .load(&data)
        .with_context(|| format!("Failed to load {}", data.display()))?;
    let (num_time_points, num_markets) = loaded.observations.shape();

    let labeled = window_and_label(&loaded.observations, config.window.window_size)
        .context("Failed to window observations")?;

    println!("{}", SEPARATOR);
    println!("{}", data.display());
    println!("{}", SEPARATOR);
    println!("  Time points: {}", num_time_points);
    println!("  Markets: {}", num_markets);
    println!("  Skipped rows: {}", loaded.skipped_rows);
    if let (Some(first), Some(last)) = (loaded.row_labels.first(), loaded.row_labels.last()) {
        println!("  Range: {} to {}", first, last);
    }
    println!("  Windows: {} (size {})", labeled.len(), labeled.window_size);
    println!();

    for market in 0..num_markets {
        let count = |direction: Direction| {
            labeled
                .labels
                .iter()
                .filter(|l| l.get(market) == Some(direction))
                .count()
        };
        println!(
            "  Market {}: +1 = {}, 0 = {}, -1 = {}",
            market + 1,
            count(Direction::Up),
            count(Direction::Flat),
            count(Direction::Down)
        );
    }

    Ok(())
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("market_direction=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref())?;

    match cli.command {
        Commands::Evaluate {
            data,
            window_size,
            guess,
            output,
        } => cmd_evaluate(config, data, window_size, guess, output)?,
        Commands::Inspect { data, window_size } => cmd_inspect(config, data, window_size)?,
    }

    Ok(())
}
