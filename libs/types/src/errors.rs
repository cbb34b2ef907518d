//! Error types for the market simulation
//!
//! Comprehensive error taxonomy using thiserror

use crate::ids::{CompetitorId, Tick};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Order rejected at submission; no engine state was changed
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OrderError {
    #[error("Invalid price: {0}")]
    InvalidPrice(String),

    #[error("Invalid quantity: {0}")]
    InvalidQuantity(String),

    #[error("Unknown symbol: {symbol}")]
    UnknownSymbol { symbol: String },

    #[error("Unknown competitor: {competitor_id}")]
    UnknownCompetitor { competitor_id: String },

    #[error("Insufficient cash: required {required}, available {available}")]
    InsufficientCash { required: Decimal, available: Decimal },

    #[error("Order would match the submitter's own resting order")]
    SelfMatch,

    #[error("Tick regression: current {current}, requested {requested}")]
    TickRegression { current: Tick, requested: Tick },
}

/// Errors surfaced by the simulation's mutating API
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimulationError {
    #[error("Invalid order: {0}")]
    InvalidOrder(#[from] OrderError),

    #[error("Clock stopped at tick {tick}")]
    ClockStopped { tick: Tick },

    #[error("Clock is not running (state: {state})")]
    NotRunning { state: String },

    #[error("Invalid state transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Competitor already registered: {0}")]
    DuplicateCompetitor(CompetitorId),
}

/// Contained failure of a competitor's strategy for one tick
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StrategyFault {
    #[error("Strategy exceeded its time budget of {budget:?}")]
    Timeout { budget: Duration },

    #[error("Strategy panicked: {message}")]
    Panicked { message: String },

    #[error("Previous invocation still running")]
    StillRunning,

    #[error("Too many quotes: {count} exceeds limit {limit}")]
    TooManyQuotes { count: usize, limit: usize },
}

impl StrategyFault {
    /// Short label used for metrics keys
    pub fn kind(&self) -> &'static str {
        match self {
            StrategyFault::Timeout { .. } => "timeout",
            StrategyFault::Panicked { .. } => "panicked",
            StrategyFault::StillRunning => "still_running",
            StrategyFault::TooManyQuotes { .. } => "too_many_quotes",
        }
    }
}

/// Why a Sharpe ratio is not defined
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum ScoringUndefined {
    #[error("Insufficient samples: {count} (need at least 2)")]
    InsufficientSamples { count: usize },

    #[error("Zero variance in returns")]
    ZeroVariance,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_error_converts_into_simulation_error() {
        let err: SimulationError = OrderError::SelfMatch.into();
        assert_eq!(err, SimulationError::InvalidOrder(OrderError::SelfMatch));
        assert!(err.to_string().contains("own resting order"));
    }

    #[test]
    fn test_fault_kind_labels() {
        assert_eq!(StrategyFault::StillRunning.kind(), "still_running");
        let fault = StrategyFault::Timeout { budget: Duration::from_millis(50) };
        assert_eq!(fault.kind(), "timeout");
    }
}
