//! market-sim: run the configured bot population and print the leaderboard
//!
//! Usage: `market-sim [config.json]`

use anyhow::Context;
use simulation::export::write_to_file;
use simulation::{SimulationClock, SimulationConfig};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let config = match std::env::args().nth(1) {
        Some(path) => SimulationConfig::from_file(&path)
            .with_context(|| format!("loading config from {path}"))?,
        None => SimulationConfig::default(),
    };

    info!(
        symbols = config.symbols.len(),
        bots = config.bots.len(),
        max_ticks = ?config.max_ticks,
        tick_interval_ms = config.tick_interval_ms,
        "starting market simulation"
    );

    let mut clock = SimulationClock::new(config)?;
    clock.register_bots()?;

    let stop = clock.stop_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, stopping at next tick boundary");
            stop.stop();
        }
    });

    clock.start()?;
    clock.run().await?;

    info!(summary = %clock.metrics().summary(), "simulation finished");
    for entry in clock.leaderboard() {
        info!(
            rank = entry.rank,
            competitor = %entry.competitor_id,
            sharpe = ?entry.sharpe,
            window_sharpe = ?entry.window_sharpe,
            samples = entry.samples,
            "leaderboard"
        );
    }

    if let Some(path) = clock.config().report_path.clone() {
        write_to_file(&clock.report(), &path).with_context(|| format!("writing report to {path}"))?;
        info!(path = %path, "report written");
    }

    Ok(())
}
