use anyhow::Result;
use clap::Parser;
use curling_core::GameConfig;
use log::info;
use std::path::PathBuf;
use std::time::Duration;

mod runner;

/// Curling table game driven by an overhead camera
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Frame file written by the capture process
    #[arg(short, long, default_value = "image.jpg")]
    frame: PathBuf,

    /// JSON game configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Milliseconds between detection ticks
    #[arg(short, long, default_value_t = 200)]
    interval: u64,

    /// Stop after this many ticks
    #[arg(long)]
    max_ticks: Option<u64>,

    /// Write the game snapshot here as JSON
    #[arg(short, long)]
    snapshot: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };

    let options = runner::RunOptions {
        frame_path: args.frame,
        interval: Duration::from_millis(args.interval),
        max_ticks: args.max_ticks,
        snapshot_path: args.snapshot,
    };

    let session = runner::run(config, &options)?;
    let (first, second) = session.engine().scores();
    info!("Final score P1 {} - P2 {}", first, second);
    Ok(())
}
