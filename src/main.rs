use anyhow::{Context, Result};
use clap::Parser;
use smooth_snake::game::{Cell, GameConfig, JsonFileStore};
use smooth_snake::modes::HumanMode;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "smooth_snake")]
#[command(version, about = "Snake with smooth, frame-rate independent motion")]
struct Cli {
    /// JSON game config; missing fields use defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Side length of the square grid (overrides the config file)
    #[arg(long)]
    grid_size: Option<i32>,

    /// File holding the high score table
    #[arg(long, default_value = "smooth_snake_scores.json")]
    scores: PathBuf,

    /// Write logs to this file (the terminal is taken by the game)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(path) = &cli.log_file {
        init_logging(path)?;
    }

    let mut config = match &cli.config {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };
    if let Some(size) = cli.grid_size {
        let centre = (size / 2).max(1);
        config.grid_size = size;
        config.start_cell = Cell::new(centre, centre);
    }
    config
        .validate()
        .map_err(|msg| anyhow::anyhow!("Invalid game config: {}", msg))?;

    tracing::info!(grid_size = config.grid_size, scores = ?cli.scores, "starting");

    let mut human_mode = HumanMode::new(config, JsonFileStore::new(cli.scores))?;
    human_mode.run().await?;

    Ok(())
}

fn init_logging(path: &Path) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("Failed to create log file {:?}", path))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}
