//! Performance metrics for the simulation
//!
//! Tracks orders, trades, cancels, strategy faults, tick latency histograms,
//! and throughput.

use matching_engine::SubmitReport;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use types::errors::StrategyFault;

/// Latency histogram bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatencyBucket {
    pub label: String,
    pub lower_ns: u64,
    pub upper_ns: u64,
    pub count: u64,
}

/// Aggregated simulation metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimMetrics {
    pub ticks: u64,
    pub orders_accepted: u64,
    pub orders_rejected: u64,
    pub cancels: u64,
    /// Cancels that found nothing to remove
    pub cancel_misses: u64,
    pub self_match_cancels: u64,
    pub trades: u64,
    pub traded_quantity: Decimal,
    /// Notional traded, sum of price * quantity
    pub traded_volume: Decimal,
    pub strategy_faults: BTreeMap<String, u64>,
    pub tick_latency_buckets: Vec<LatencyBucket>,
    pub elapsed_ns: u64,
}

impl SimMetrics {
    /// Create empty metrics with default latency buckets.
    pub fn new() -> Self {
        Self {
            ticks: 0,
            orders_accepted: 0,
            orders_rejected: 0,
            cancels: 0,
            cancel_misses: 0,
            self_match_cancels: 0,
            trades: 0,
            traded_quantity: Decimal::ZERO,
            traded_volume: Decimal::ZERO,
            strategy_faults: BTreeMap::new(),
            tick_latency_buckets: default_buckets(),
            elapsed_ns: 0,
        }
    }

    /// Record an accepted submission and the trades it produced.
    pub fn record_submit(&mut self, report: &SubmitReport) {
        self.orders_accepted += 1;
        self.self_match_cancels += report.self_match_cancels.len() as u64;
        for trade in &report.trades {
            self.trades += 1;
            self.traded_quantity = self.traded_quantity.saturating_add(trade.quantity.as_decimal());
            self.traded_volume = self.traded_volume.saturating_add(trade.value());
        }
    }

    pub fn record_rejection(&mut self) {
        self.orders_rejected += 1;
    }

    pub fn record_cancel(&mut self, removed: bool) {
        if removed {
            self.cancels += 1;
        } else {
            self.cancel_misses += 1;
        }
    }

    pub fn record_fault(&mut self, fault: &StrategyFault) {
        *self.strategy_faults.entry(fault.kind().to_string()).or_insert(0) += 1;
    }

    pub fn total_faults(&self) -> u64 {
        self.strategy_faults.values().sum()
    }

    /// Record one completed tick and its wall-clock latency.
    pub fn record_tick(&mut self, latency_ns: u64) {
        self.ticks += 1;
        self.elapsed_ns = self.elapsed_ns.saturating_add(latency_ns);
        for bucket in &mut self.tick_latency_buckets {
            if latency_ns >= bucket.lower_ns && latency_ns < bucket.upper_ns {
                bucket.count += 1;
                return;
            }
        }
        // Overflow bucket (last)
        if let Some(last) = self.tick_latency_buckets.last_mut() {
            last.count += 1;
        }
    }

    /// Throughput: ticks per second of pipeline time.
    pub fn ticks_per_second(&self) -> f64 {
        if self.elapsed_ns == 0 {
            return 0.0;
        }
        self.ticks as f64 / (self.elapsed_ns as f64 / 1_000_000_000.0)
    }

    /// Build a summary string.
    pub fn summary(&self) -> String {
        format!(
            "Ticks: {} | Orders: {} accepted, {} rejected | Cancels: {} | Trades: {} | \
             Volume: {} | Faults: {} | Throughput: {:.0} ticks/s",
            self.ticks,
            self.orders_accepted,
            self.orders_rejected,
            self.cancels,
            self.trades,
            self.traded_volume,
            self.total_faults(),
            self.ticks_per_second(),
        )
    }
}

impl Default for SimMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Default tick latency histogram buckets.
fn default_buckets() -> Vec<LatencyBucket> {
    let bucket = |label: &str, lower_ns: u64, upper_ns: u64| LatencyBucket {
        label: label.into(),
        lower_ns,
        upper_ns,
        count: 0,
    };
    vec![
        bucket("<100μs", 0, 100_000),
        bucket("100μs-1ms", 100_000, 1_000_000),
        bucket("1-10ms", 1_000_000, 10_000_000),
        bucket("10-50ms", 10_000_000, 50_000_000),
        bucket("50-100ms", 50_000_000, 100_000_000),
        bucket("100ms-1s", 100_000_000, 1_000_000_000),
        bucket(">1s", 1_000_000_000, u64::MAX),
    ]
}
