//! Noise trader bot
//!
//! Generates random orders with deterministic seeded RNG: a mix of market
//! orders and limit orders placed a random distance from the mark, to
//! simulate uninformed retail flow.

use rand::Rng;
use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use types::ids::Symbol;
use types::order::Side;

use super::tick_rng;
use crate::strategy::{CompetitorView, MarketView, Quote, Strategy};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseTraderConfig {
    pub name: String,
    /// Chance of trading at all on a given tick
    pub trade_probability: f64,
    pub min_size: u64,
    pub max_size: u64,
    /// Probability of market order (0.0 to 1.0)
    pub market_order_ratio: f64,
    /// Maximum distance from the mark for limit orders (in bps)
    pub max_limit_distance_bps: u32,
    /// Limit orders cross the mark with this probability
    pub aggressive_ratio: f64,
    /// Absolute position limit per symbol; beyond it only reducing orders
    pub max_position: Decimal,
}

impl Default for NoiseTraderConfig {
    fn default() -> Self {
        Self {
            name: "noise".to_string(),
            trade_probability: 0.5,
            min_size: 1,
            max_size: 25,
            market_order_ratio: 0.3,
            max_limit_distance_bps: 50,
            aggressive_ratio: 0.5,
            max_position: Decimal::from(250),
        }
    }
}

pub struct NoiseTrader {
    config: NoiseTraderConfig,
    seed: u64,
}

impl NoiseTrader {
    pub fn new(config: NoiseTraderConfig, seed: u64) -> Self {
        Self { config, seed }
    }

    pub fn config(&self) -> &NoiseTraderConfig {
        &self.config
    }
}

impl Strategy for NoiseTrader {
    fn quote(&self, market: &MarketView, own: &CompetitorView) -> Vec<Quote> {
        let mut rng = tick_rng(self.seed, market.tick);

        if !rng.gen_bool(self.config.trade_probability.clamp(0.0, 1.0)) {
            return vec![];
        }

        let symbols: Vec<&Symbol> = market.symbols().collect();
        if symbols.is_empty() {
            return vec![];
        }
        let symbol = symbols[rng.gen_range(0..symbols.len())].clone();
        let Some(mark) = market.mark(&symbol) else {
            return vec![];
        };
        let mark = mark.as_decimal();

        // Random side, forced toward flat once at the position limit
        let position = own.position(&symbol);
        let side = if position >= self.config.max_position {
            Side::Ask
        } else if position <= -self.config.max_position {
            Side::Bid
        } else if rng.gen_bool(0.5) {
            Side::Bid
        } else {
            Side::Ask
        };

        let lo = self.config.min_size.max(1);
        let hi = self.config.max_size.max(lo);
        let size = Decimal::from(rng.gen_range(lo..=hi));

        if rng.gen_bool(self.config.market_order_ratio.clamp(0.0, 1.0)) {
            return vec![Quote::market(symbol, side, size)];
        }

        let bps: u32 = rng.gen_range(1..=self.config.max_limit_distance_bps.max(1));
        let distance = mark * Decimal::from(bps) / Decimal::from(10_000);
        let aggressive = rng.gen_bool(self.config.aggressive_ratio.clamp(0.0, 1.0));

        let price = match (side, aggressive) {
            (Side::Bid, true) | (Side::Ask, false) => mark + distance,
            (Side::Bid, false) | (Side::Ask, true) => mark - distance,
        }
        .round_dp(2);

        if price <= Decimal::ZERO {
            return vec![];
        }
        vec![Quote::limit(symbol, side, price, size)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::MarketSnapshot;
    use matching_engine::BookSnapshot;
    use std::collections::BTreeMap;
    use std::sync::Arc;
    use types::ids::{CompetitorId, Tick};
    use types::numeric::Price;

    fn market(tick: u64) -> MarketView {
        let sym = Symbol::new("NVR");
        let mut snapshot = MarketSnapshot::empty();
        snapshot.books.insert(
            sym.clone(),
            BookSnapshot {
                symbol: sym.clone(),
                bids: vec![],
                asks: vec![],
            },
        );
        snapshot.reference_prices.insert(sym, Price::from_u64(50_000));
        MarketView::new(Tick::new(tick), Arc::new(snapshot))
    }

    fn own(position: i64) -> CompetitorView {
        let mut inventory = BTreeMap::new();
        inventory.insert(Symbol::new("NVR"), Decimal::from(position));
        CompetitorView {
            id: CompetitorId::new("retail"),
            cash: Decimal::from(100_000),
            inventory,
            equity: Decimal::from(100_000),
            open_orders: vec![],
        }
    }

    fn always_trades() -> NoiseTraderConfig {
        NoiseTraderConfig {
            trade_probability: 1.0,
            ..NoiseTraderConfig::default()
        }
    }

    #[test]
    fn test_deterministic_output() {
        let t1 = NoiseTrader::new(always_trades(), 42);
        let t2 = NoiseTrader::new(always_trades(), 42);
        for tick in 0..20 {
            assert_eq!(t1.quote(&market(tick), &own(0)), t2.quote(&market(tick), &own(0)));
        }
    }

    #[test]
    fn test_order_validity() {
        let trader = NoiseTrader::new(always_trades(), 123);
        let max_distance = Decimal::from(50_000) * Decimal::from(50) / Decimal::from(10_000);

        for tick in 0..100 {
            let quotes = trader.quote(&market(tick), &own(0));
            assert_eq!(quotes.len(), 1);
            match &quotes[0] {
                Quote::Limit { price, quantity, .. } => {
                    assert!(*quantity >= Decimal::ONE && *quantity <= Decimal::from(25));
                    assert!((*price - Decimal::from(50_000)).abs() <= max_distance);
                }
                Quote::Market { quantity, .. } => assert!(*quantity >= Decimal::ONE),
                other => panic!("unexpected quote {other:?}"),
            }
        }
    }

    #[test]
    fn test_different_seeds_different_output() {
        let t1 = NoiseTrader::new(always_trades(), 1);
        let t2 = NoiseTrader::new(always_trades(), 2);
        let same = (0..10)
            .filter(|t| t1.quote(&market(*t), &own(0)) == t2.quote(&market(*t), &own(0)))
            .count();
        // Extremely unlikely all 10 are the same
        assert!(same < 10);
    }

    #[test]
    fn test_position_limit_forces_reducing_side() {
        let trader = NoiseTrader::new(always_trades(), 9);
        for tick in 0..30 {
            for q in trader.quote(&market(tick), &own(250)) {
                match q {
                    Quote::Limit { side, .. } | Quote::Market { side, .. } => {
                        assert_eq!(side, Side::Ask)
                    }
                    Quote::Cancel { .. } => {}
                }
            }
        }
    }

    #[test]
    fn test_never_trading() {
        let trader = NoiseTrader::new(
            NoiseTraderConfig {
                trade_probability: 0.0,
                ..NoiseTraderConfig::default()
            },
            1,
        );
        assert!(trader.quote(&market(0), &own(0)).is_empty());
    }
}
