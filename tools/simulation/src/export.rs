//! Run report export
//!
//! Serializes metrics, the leaderboard and per-competitor results to JSON
//! for external consumption.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use types::ids::{CompetitorId, Symbol};

use scoring::LeaderboardEntry;

use crate::metrics::SimMetrics;
use crate::state::SimulationState;

/// Final standing of one competitor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompetitorSummary {
    pub competitor_id: CompetitorId,
    pub cash: Decimal,
    pub inventory: BTreeMap<Symbol, Decimal>,
    pub equity: Decimal,
    pub total_pnl: Decimal,
    pub samples: usize,
    pub sharpe: Option<f64>,
    pub window_sharpe: Option<f64>,
}

/// Combined export of a finished (or interrupted) run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub version: String,
    pub ticks: u64,
    pub metrics: SimMetrics,
    pub leaderboard: Vec<LeaderboardEntry>,
    pub competitors: Vec<CompetitorSummary>,
}

/// Build a run report from the simulation state.
pub fn build_report(state: &SimulationState) -> RunReport {
    let competitors = state
        .engine
        .ledger()
        .iter()
        .map(|c| {
            let report = state.scoring.report(&c.id);
            CompetitorSummary {
                competitor_id: c.id.clone(),
                cash: c.cash,
                inventory: c.inventory.clone(),
                equity: c.last_equity,
                total_pnl: c.total_pnl(),
                samples: report.map(|r| r.samples).unwrap_or(0),
                sharpe: report.and_then(|r| r.full_run),
                window_sharpe: report.and_then(|r| r.window),
            }
        })
        .collect();

    RunReport {
        version: crate::VERSION.to_string(),
        ticks: state.tick.value(),
        metrics: state.metrics.clone(),
        leaderboard: state.scoring.leaderboard(),
        competitors,
    }
}

/// Export a run report as JSON.
pub fn export_json(report: &RunReport) -> String {
    serde_json::to_string_pretty(report).unwrap_or_default()
}

/// Write a run report to a file path.
pub fn write_to_file(report: &RunReport, path: impl AsRef<Path>) -> std::io::Result<()> {
    std::fs::write(path, export_json(report))
}
