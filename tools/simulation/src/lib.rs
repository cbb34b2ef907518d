//! Competitive Market Simulation
//!
//! Tick-driven simulation in which competitor strategies quote into shared
//! order books and are ranked by the Sharpe ratio of their per-tick returns.
//!
//! # Modules
//! - `config`: JSON configuration with defaults and validation
//! - `strategy`: Quote contract, market view, `Strategy` trait
//! - `runner`: Bounded, panic-isolated strategy invocation
//! - `clock`: Lifecycle state machine and the tick pipeline
//! - `state`: Authoritative simulation state
//! - `snapshot`: Versioned, checksummed per-tick snapshots
//! - `feed`: Read-only dashboard queries over published snapshots
//! - `reference`: GBM reference prices
//! - `bots`: Liquidity bot and noise trader
//! - `metrics`: Counters and tick latency histograms
//! - `replay`: Instruction journal and deterministic replay validation
//! - `export`: Run report JSON export

pub mod config;
pub mod strategy;
pub mod runner;
pub mod clock;
pub mod state;
pub mod snapshot;
pub mod feed;
pub mod reference;
pub mod bots;
pub mod metrics;
pub mod replay;
pub mod export;

pub use clock::{ClockState, SimulationClock, StopHandle, TickSummary};
pub use config::{BotConfig, ConfigError, SimulationConfig, SymbolConfig};
pub use feed::{MarketFeed, OrderBookView};
pub use snapshot::MarketSnapshot;
pub use strategy::{CompetitorView, MarketView, Quote, Strategy};

/// Crate version constant
pub const VERSION: &str = "1.0.0";
