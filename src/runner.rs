//! Periodic tick loop over the shared frame file

use anyhow::{Context, Result};
use curling_core::{GameConfig, GameSession, TickOutcome, TurnEngine, TurnEvent};
use curling_cv::{utils::ImageUtils, PositionDetector};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

/// Options for one run of the game loop
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub frame_path: PathBuf,
    pub interval: Duration,
    pub max_ticks: Option<u64>,
    pub snapshot_path: Option<PathBuf>,
}

/// Drive a session until the game is over or the tick limit is hit.
pub fn run(config: GameConfig, options: &RunOptions) -> Result<GameSession<PositionDetector>> {
    let mut session = GameSession::new(PositionDetector::default(), TurnEngine::new(config));
    let mut ticks = 0u64;

    info!(
        "Watching {:?} every {}ms",
        options.frame_path,
        options.interval.as_millis()
    );

    loop {
        if options.max_ticks.is_some_and(|limit| ticks >= limit) {
            info!("Tick limit reached after {} ticks", ticks);
            break;
        }
        ticks += 1;

        let frame = match ImageUtils::load_frame(&options.frame_path) {
            Ok(frame) => Some(frame),
            Err(e) => {
                warn!("{:#}", e);
                None
            }
        };

        let outcome = session.tick(frame.as_ref());
        report(&outcome);

        if let Some(path) = &options.snapshot_path {
            if matches!(outcome, TickOutcome::Committed(_) | TickOutcome::TurnEnded(_)) {
                export_snapshot(&session, path)?;
            }
        }

        if session.engine().is_finished() {
            break;
        }
        thread::sleep(options.interval);
    }

    if let Some(path) = &options.snapshot_path {
        export_snapshot(&session, path)?;
    }
    Ok(session)
}

fn report(outcome: &TickOutcome) {
    match outcome {
        TickOutcome::Committed(record) => info!(
            "{} token stored for turn {} ({})",
            record.owner,
            record.turn + 1,
            record
                .distance_to_target
                .map_or_else(|| "no target".to_string(), |d| format!("{:.1}px", d))
        ),
        TickOutcome::TurnEnded(TurnEvent::RoundEnded { round, scored, scores }) => info!(
            "Round {} won by {} ({} - {})",
            round,
            scored.map_or_else(|| "nobody".to_string(), |p| p.to_string()),
            scores[0],
            scores[1]
        ),
        TickOutcome::TurnEnded(TurnEvent::GameOver { winner, scores, .. }) => info!(
            "Game over, winner {} ({} - {})",
            winner.map_or_else(|| "none".to_string(), |p| p.to_string()),
            scores[0],
            scores[1]
        ),
        other => debug!("{:?}", other),
    }
}

/// Write the current display snapshot as pretty JSON.
pub fn export_snapshot(session: &GameSession<PositionDetector>, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(&session.snapshot())
        .context("Failed to serialize snapshot")?;
    std::fs::write(path, json).with_context(|| format!("Failed to write snapshot: {:?}", path))?;
    Ok(())
}
