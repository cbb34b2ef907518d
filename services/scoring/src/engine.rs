//! Scoring engine
//!
//! Stores each competitor's per-tick return series and caches Sharpe
//! reports, recomputed every `recompute_interval` ticks or on demand.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use tracing::{debug, warn};
use types::errors::ScoringUndefined;
use types::ids::{CompetitorId, Tick};

use crate::sharpe::sharpe_ratio;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub risk_free_rate_per_tick: f64,
    /// Trailing samples used for the window figure
    pub sharpe_window: usize,
    /// Ticks between automatic recomputes
    pub recompute_interval: u64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            risk_free_rate_per_tick: 0.0,
            sharpe_window: 100,
            recompute_interval: 1,
        }
    }
}

/// Cached Sharpe figures for one competitor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SharpeReport {
    pub competitor_id: CompetitorId,
    /// Sharpe over the trailing window
    pub window: Option<f64>,
    /// Sharpe over every sample of the run
    pub full_run: Option<f64>,
    /// Why `full_run` is undefined, if it is
    pub undefined: Option<ScoringUndefined>,
    pub samples: usize,
    pub computed_at: Option<Tick>,
}

impl SharpeReport {
    fn empty(competitor_id: CompetitorId) -> Self {
        Self {
            competitor_id,
            window: None,
            full_run: None,
            undefined: Some(ScoringUndefined::InsufficientSamples { count: 0 }),
            samples: 0,
            computed_at: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub competitor_id: CompetitorId,
    pub sharpe: Option<f64>,
    pub window_sharpe: Option<f64>,
    pub samples: usize,
}

#[derive(Debug, Clone)]
pub struct ScoringEngine {
    config: ScoringConfig,
    /// Return series in registration order
    series: Vec<(CompetitorId, Vec<f64>)>,
    index: HashMap<CompetitorId, usize>,
    reports: Vec<SharpeReport>,
    ticks_since_recompute: u64,
}

impl ScoringEngine {
    pub fn new(config: ScoringConfig) -> Self {
        Self {
            config,
            series: Vec::new(),
            index: HashMap::new(),
            reports: Vec::new(),
            ticks_since_recompute: 0,
        }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Start tracking a competitor; returns false if already tracked
    pub fn register(&mut self, id: CompetitorId) -> bool {
        if self.index.contains_key(&id) {
            return false;
        }
        self.index.insert(id.clone(), self.series.len());
        self.reports.push(SharpeReport::empty(id.clone()));
        self.series.push((id, Vec::new()));
        true
    }

    /// Append one per-tick return
    ///
    /// Non-finite values are dropped. Returns false for unknown competitors.
    pub fn record(&mut self, id: &CompetitorId, tick: Tick, ret: f64) -> bool {
        let Some(&i) = self.index.get(id) else {
            return false;
        };
        if !ret.is_finite() {
            warn!(competitor = %id, tick = %tick, "dropping non-finite return");
            return false;
        }
        self.series[i].1.push(ret);
        true
    }

    /// Close out a tick, recomputing if the interval has elapsed
    pub fn end_tick(&mut self, tick: Tick) {
        self.ticks_since_recompute += 1;
        if self.ticks_since_recompute >= self.config.recompute_interval.max(1) {
            self.recompute(tick);
        }
    }

    /// Recompute every cached report from the full series
    pub fn recompute(&mut self, tick: Tick) {
        let rf = self.config.risk_free_rate_per_tick;
        let window = self.config.sharpe_window;

        for ((id, returns), report) in self.series.iter().zip(self.reports.iter_mut()) {
            let full = sharpe_ratio(returns, rf);
            let tail = &returns[returns.len().saturating_sub(window)..];

            report.competitor_id = id.clone();
            report.full_run = full.ok();
            report.undefined = full.err();
            report.window = sharpe_ratio(tail, rf).ok();
            report.samples = returns.len();
            report.computed_at = Some(tick);
        }
        self.ticks_since_recompute = 0;
        debug!(tick = %tick, competitors = self.reports.len(), "scores recomputed");
    }

    /// Cached report for one competitor
    pub fn report(&self, id: &CompetitorId) -> Option<&SharpeReport> {
        self.index.get(id).map(|&i| &self.reports[i])
    }

    /// Cached reports in registration order
    pub fn reports(&self) -> &[SharpeReport] {
        &self.reports
    }

    pub fn returns(&self, id: &CompetitorId) -> Option<&[f64]> {
        self.index.get(id).map(|&i| self.series[i].1.as_slice())
    }

    /// Competitors by full-run Sharpe, best first
    ///
    /// Undefined scores sort last; ties keep registration order.
    pub fn leaderboard(&self) -> Vec<LeaderboardEntry> {
        let mut ranked: Vec<&SharpeReport> = self.reports.iter().collect();
        ranked.sort_by(|a, b| compare_scores(a.full_run, b.full_run));

        ranked
            .into_iter()
            .enumerate()
            .map(|(i, report)| LeaderboardEntry {
                rank: i + 1,
                competitor_id: report.competitor_id.clone(),
                sharpe: report.full_run,
                window_sharpe: report.window,
                samples: report.samples,
            })
            .collect()
    }
}

fn compare_scores(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

impl Default for ScoringEngine {
    fn default() -> Self {
        Self::new(ScoringConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> CompetitorId {
        CompetitorId::new(s)
    }

    fn feed(engine: &mut ScoringEngine, who: &str, returns: &[f64]) {
        for (t, r) in returns.iter().enumerate() {
            engine.record(&id(who), Tick::new(t as u64), *r);
        }
    }

    #[test]
    fn test_zero_returns_undefined_not_fault() {
        let mut engine = ScoringEngine::default();
        engine.register(id("flat"));
        for t in 0..10 {
            engine.record(&id("flat"), Tick::new(t), 0.0);
            engine.end_tick(Tick::new(t));
        }

        let report = engine.report(&id("flat")).unwrap();
        assert_eq!(report.full_run, None);
        assert_eq!(report.window, None);
        assert_eq!(report.undefined, Some(ScoringUndefined::ZeroVariance));
        assert_eq!(report.samples, 10);
    }

    #[test]
    fn test_recompute_interval_caches() {
        let mut engine = ScoringEngine::new(ScoringConfig {
            recompute_interval: 3,
            ..ScoringConfig::default()
        });
        engine.register(id("a"));
        feed(&mut engine, "a", &[0.01, 0.02]);

        engine.end_tick(Tick::new(0));
        engine.end_tick(Tick::new(1));
        assert_eq!(engine.report(&id("a")).unwrap().computed_at, None);

        engine.end_tick(Tick::new(2));
        let report = engine.report(&id("a")).unwrap();
        assert_eq!(report.computed_at, Some(Tick::new(2)));
        assert!(report.full_run.is_some());
    }

    #[test]
    fn test_window_uses_trailing_samples() {
        let mut engine = ScoringEngine::new(ScoringConfig {
            sharpe_window: 3,
            ..ScoringConfig::default()
        });
        engine.register(id("a"));
        // Varied history, then a flat tail
        feed(&mut engine, "a", &[0.05, -0.03, 0.02, 0.01, 0.01, 0.01]);
        engine.recompute(Tick::new(5));

        let report = engine.report(&id("a")).unwrap();
        assert!(report.full_run.is_some());
        assert_eq!(report.window, None);
    }

    #[test]
    fn test_single_sample_window_is_undefined() {
        let mut engine = ScoringEngine::new(ScoringConfig {
            sharpe_window: 1,
            ..ScoringConfig::default()
        });
        engine.register(id("a"));
        feed(&mut engine, "a", &[0.05, -0.03, 0.02]);
        engine.recompute(Tick::new(2));

        let report = engine.report(&id("a")).unwrap();
        assert!(report.full_run.is_some());
        assert_eq!(report.window, None);
        assert_eq!(
            sharpe_ratio(&[0.02], 0.0),
            Err(ScoringUndefined::InsufficientSamples { count: 1 })
        );
    }

    #[test]
    fn test_leaderboard_order() {
        let mut engine = ScoringEngine::default();
        for who in ["undefined", "low", "high", "tie"] {
            engine.register(id(who));
        }
        feed(&mut engine, "low", &[0.01, -0.01, 0.0]);
        feed(&mut engine, "high", &[0.02, 0.01, 0.03]);
        feed(&mut engine, "tie", &[0.02, 0.01, 0.03]);
        engine.recompute(Tick::new(3));

        let board = engine.leaderboard();
        let names: Vec<&str> = board.iter().map(|e| e.competitor_id.as_str()).collect();
        assert_eq!(names, vec!["high", "tie", "low", "undefined"]);
        assert_eq!(board[0].rank, 1);
        assert_eq!(board[3].sharpe, None);
    }

    #[test]
    fn test_unknown_and_non_finite() {
        let mut engine = ScoringEngine::default();
        engine.register(id("a"));
        assert!(!engine.register(id("a")));
        assert!(!engine.record(&id("b"), Tick::ZERO, 0.1));
        assert!(!engine.record(&id("a"), Tick::ZERO, f64::NAN));
        assert_eq!(engine.returns(&id("a")).unwrap().len(), 0);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_leaderboard_defined_scores_descend(
                series in prop::collection::vec(prop::collection::vec(-0.1f64..0.1, 0..20), 1..8),
            ) {
                let mut engine = ScoringEngine::default();
                for (i, returns) in series.iter().enumerate() {
                    let name = format!("c{i}");
                    engine.register(id(&name));
                    feed(&mut engine, &name, returns);
                }
                engine.recompute(Tick::new(1));

                let board = engine.leaderboard();
                prop_assert_eq!(board.len(), series.len());

                let mut seen_undefined = false;
                let mut prev = f64::INFINITY;
                for entry in &board {
                    match entry.sharpe {
                        Some(s) => {
                            prop_assert!(!seen_undefined, "defined score after undefined");
                            prop_assert!(s <= prev);
                            prev = s;
                        }
                        None => seen_undefined = true,
                    }
                }
            }
        }
    }
}
