//! Simulation configuration
//!
//! Loaded from JSON; every field has a default so a partial file (or no
//! file at all) yields a runnable setup.

use matching_engine::{EngineConfig, SelfMatchPolicy, DEFAULT_ORDER_LIMIT};
use rust_decimal::Decimal;
use scoring::ScoringConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use types::ids::Symbol;

use crate::bots::liquidity::LiquidityBotConfig;
use crate::bots::noise::NoiseTraderConfig;

/// Ceiling on `max_price * max_order_quantity`, so cash and equity sums
/// stay far from the decimal range
pub const MAX_ORDER_NOTIONAL: u64 = 1_000_000_000_000_000_000;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// One traded instrument and its reference price process
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolConfig {
    pub symbol: Symbol,
    pub reference_price: Decimal,
    /// GBM drift per unit time
    pub drift: f64,
    /// GBM volatility per unit time
    pub volatility: f64,
    /// Time advanced per tick
    #[serde(default = "default_time_step")]
    pub time_step: f64,
}

fn default_time_step() -> f64 {
    0.01
}

impl SymbolConfig {
    pub fn new(symbol: &str, reference_price: u64, drift: f64, volatility: f64) -> Self {
        Self {
            symbol: Symbol::new(symbol),
            reference_price: Decimal::from(reference_price),
            drift,
            volatility,
            time_step: default_time_step(),
        }
    }
}

/// Built-in bot population entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BotConfig {
    Liquidity(LiquidityBotConfig),
    Noise(NoiseTraderConfig),
}

impl BotConfig {
    pub fn name(&self) -> &str {
        match self {
            BotConfig::Liquidity(c) => &c.name,
            BotConfig::Noise(c) => &c.name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub tick_interval_ms: u64,
    pub max_ticks: Option<u64>,
    pub risk_free_rate_per_tick: f64,
    pub self_match_policy: SelfMatchPolicy,
    pub strategy_time_budget_ms: u64,
    pub sharpe_window: usize,
    pub sharpe_recompute_interval: u64,
    pub snapshot_depth: usize,
    pub starting_cash: Decimal,
    pub enforce_cash: bool,
    pub max_price: Decimal,
    pub max_order_quantity: Decimal,
    pub max_quotes_per_tick: usize,
    pub seed: u64,
    pub symbols: Vec<SymbolConfig>,
    pub bots: Vec<BotConfig>,
    pub report_path: Option<String>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 100,
            max_ticks: Some(1000),
            risk_free_rate_per_tick: 0.0,
            self_match_policy: SelfMatchPolicy::Allow,
            strategy_time_budget_ms: 50,
            sharpe_window: 100,
            sharpe_recompute_interval: 1,
            snapshot_depth: 30,
            starting_cash: Decimal::from(100_000),
            enforce_cash: false,
            max_price: Decimal::from(DEFAULT_ORDER_LIMIT),
            max_order_quantity: Decimal::from(DEFAULT_ORDER_LIMIT),
            max_quotes_per_tick: 64,
            seed: 42,
            symbols: vec![
                SymbolConfig::new("NVR", 150, 0.01, 0.05),
                SymbolConfig::new("CPMD", 175, 0.0005, 0.25),
                SymbolConfig::new("MFH", 200, 0.0007, 0.12),
                SymbolConfig::new("ANG", 60, 0.003, 0.012),
                SymbolConfig::new("TVW", 10, 0.009, 0.32),
            ],
            bots: default_bots(),
            report_path: None,
        }
    }
}

fn default_bots() -> Vec<BotConfig> {
    let mut bots: Vec<BotConfig> = (1..=4)
        .map(|i| {
            BotConfig::Liquidity(LiquidityBotConfig {
                name: format!("liquidity-{i}"),
                ..LiquidityBotConfig::default()
            })
        })
        .collect();
    bots.extend((1..=2).map(|i| {
        BotConfig::Noise(NoiseTraderConfig {
            name: format!("noise-{i}"),
            ..NoiseTraderConfig::default()
        })
    }));
    bots
}

impl SimulationConfig {
    /// Load and validate a JSON config file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&raw)
    }

    /// Parse and validate a JSON config
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: SimulationConfig = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| Err(ConfigError::Invalid(msg));

        if self.symbols.is_empty() {
            return invalid("at least one symbol is required".into());
        }
        let mut seen = HashSet::new();
        for s in &self.symbols {
            if !seen.insert(&s.symbol) {
                return invalid(format!("duplicate symbol {}", s.symbol));
            }
            if s.reference_price <= Decimal::ZERO {
                return invalid(format!("reference price for {} must be positive", s.symbol));
            }
            if !(s.volatility >= 0.0 && s.volatility.is_finite()) {
                return invalid(format!("volatility for {} must be non-negative", s.symbol));
            }
            if !(s.time_step > 0.0 && s.time_step.is_finite()) {
                return invalid(format!("time step for {} must be positive", s.symbol));
            }
        }

        let mut names = HashSet::new();
        for bot in &self.bots {
            if !names.insert(bot.name()) {
                return invalid(format!("duplicate bot name {}", bot.name()));
            }
        }

        if self.strategy_time_budget_ms == 0 {
            return invalid("strategy_time_budget_ms must be positive".into());
        }
        if self.sharpe_window < 2 {
            return invalid("sharpe_window must cover at least 2 samples".into());
        }
        if self.max_price <= Decimal::ZERO || self.max_order_quantity <= Decimal::ZERO {
            return invalid("max_price and max_order_quantity must be positive".into());
        }
        match self.max_price.checked_mul(self.max_order_quantity) {
            Some(n) if n <= Decimal::from(MAX_ORDER_NOTIONAL) => {}
            _ => {
                return invalid(format!(
                    "max_price * max_order_quantity must not exceed {MAX_ORDER_NOTIONAL}"
                ))
            }
        }
        if self.snapshot_depth == 0 {
            return invalid("snapshot_depth must be positive".into());
        }
        if self.starting_cash <= Decimal::ZERO {
            return invalid("starting_cash must be positive".into());
        }
        if self.max_ticks == Some(0) {
            return invalid("max_ticks must be positive when set".into());
        }
        Ok(())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn strategy_time_budget(&self) -> Duration {
        Duration::from_millis(self.strategy_time_budget_ms)
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            self_match_policy: self.self_match_policy,
            enforce_cash: self.enforce_cash,
            max_price: self.max_price,
            max_order_quantity: self.max_order_quantity,
        }
    }

    pub fn scoring_config(&self) -> ScoringConfig {
        ScoringConfig {
            risk_free_rate_per_tick: self.risk_free_rate_per_tick,
            sharpe_window: self.sharpe_window,
            recompute_interval: self.sharpe_recompute_interval,
        }
    }
}
