//! Scoring Service
//!
//! Ranks competitors by Sharpe ratio over their per-tick returns. Figures
//! are recomputed from the stored series rather than updated incrementally,
//! and use the sample standard deviation throughout.

pub mod sharpe;
pub mod engine;

pub use engine::{LeaderboardEntry, ScoringConfig, ScoringEngine, SharpeReport};
pub use sharpe::sharpe_ratio;
