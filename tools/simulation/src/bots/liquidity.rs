//! Liquidity bot: laddered quotes, inventory skew, stale-order cleanup
//!
//! Each tick the bot cancels its own orders older than `max_order_age`,
//! picks one symbol round-robin and either sends a market order (with
//! `market_order_probability`) or lays a ladder of `levels` bids and asks
//! around the mark price. Ladder offsets grow by exponentially distributed
//! steps; quotes are skewed against inventory so a long bot leans toward
//! selling.

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Exp, Normal};
use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use types::ids::Symbol;
use types::order::Side;

use super::tick_rng;
use crate::strategy::{CompetitorView, MarketView, Quote, Strategy};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LiquidityBotConfig {
    pub name: String,
    /// Price levels quoted per side
    pub levels: usize,
    /// Distance of the innermost level from the mark, in price units
    pub base_spread: f64,
    /// Mean extra distance between successive levels
    pub level_spacing: f64,
    pub mean_quantity: f64,
    pub quantity_std_dev: f64,
    pub market_order_probability: f64,
    /// Absolute position limit per symbol
    pub max_position: Decimal,
    /// Share of cash that resting bids may commit
    pub max_balance_use_fraction: Decimal,
    /// Ticks after which an own order is cancelled
    pub max_order_age: u64,
    pub max_open_orders: usize,
}

impl Default for LiquidityBotConfig {
    fn default() -> Self {
        Self {
            name: "liquidity".to_string(),
            levels: 3,
            base_spread: 0.5,
            level_spacing: 0.5,
            mean_quantity: 80.0,
            quantity_std_dev: 18.0,
            market_order_probability: 0.33,
            max_position: Decimal::from(1000),
            max_balance_use_fraction: Decimal::new(3, 1),
            max_order_age: 30,
            max_open_orders: 24,
        }
    }
}

pub struct LiquidityBot {
    config: LiquidityBotConfig,
    seed: u64,
}

impl LiquidityBot {
    pub fn new(config: LiquidityBotConfig, seed: u64) -> Self {
        Self { config, seed }
    }

    pub fn config(&self) -> &LiquidityBotConfig {
        &self.config
    }

    /// Price shift applied to both sides; positive when long
    ///
    /// At the position limit the shift equals `base_spread`.
    pub fn inventory_skew(&self, position: Decimal) -> Decimal {
        if self.config.max_position <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        let ratio = position / self.config.max_position;
        ratio * Decimal::from_f64(self.config.base_spread).unwrap_or(Decimal::ZERO)
    }

    /// Remaining room to buy (`Side::Bid`) or sell under the position limit
    pub fn capacity(&self, side: Side, position: Decimal) -> Decimal {
        let room = match side {
            Side::Bid => self.config.max_position - position,
            Side::Ask => self.config.max_position + position,
        };
        room.max(Decimal::ZERO)
    }

    fn sample_quantity(&self, rng: &mut ChaCha8Rng) -> Decimal {
        let q = Normal::new(self.config.mean_quantity, self.config.quantity_std_dev)
            .map(|d| d.sample(rng))
            .unwrap_or(self.config.mean_quantity);
        Decimal::from(q.round().max(1.0) as u64)
    }

    /// Cumulative offsets of each ladder level from the mark
    fn ladder_offsets(&self, rng: &mut ChaCha8Rng) -> Vec<f64> {
        let step = if self.config.level_spacing > 0.0 {
            Exp::new(1.0 / self.config.level_spacing).ok()
        } else {
            None
        };
        let mut offset = self.config.base_spread;
        let mut offsets = Vec::with_capacity(self.config.levels);
        for _ in 0..self.config.levels {
            offsets.push(offset);
            offset += step.map(|d| d.sample(rng)).unwrap_or(0.0);
        }
        offsets
    }

    fn pick_symbol(&self, market: &MarketView) -> Option<Symbol> {
        let symbols: Vec<&Symbol> = market.symbols().collect();
        if symbols.is_empty() {
            return None;
        }
        let i = (market.tick.value().wrapping_add(self.seed) % symbols.len() as u64) as usize;
        Some(symbols[i].clone())
    }
}

impl Strategy for LiquidityBot {
    fn quote(&self, market: &MarketView, own: &CompetitorView) -> Vec<Quote> {
        let mut rng = tick_rng(self.seed, market.tick);

        let mut quotes: Vec<Quote> = own
            .open_orders
            .iter()
            .filter(|o| market.tick.since(o.submitted_at) >= self.config.max_order_age)
            .map(|o| Quote::cancel(o.order_id))
            .collect();
        let mut open = own.open_orders.len() - quotes.len();

        let Some(symbol) = self.pick_symbol(market) else {
            return quotes;
        };
        let Some(mark) = market.mark(&symbol) else {
            return quotes;
        };
        let mark = mark.as_decimal();
        let position = own.position(&symbol);

        if rng.gen_bool(self.config.market_order_probability.clamp(0.0, 1.0)) {
            let side = if rng.gen_bool(0.5) { Side::Bid } else { Side::Ask };
            let quantity = self.sample_quantity(&mut rng).min(self.capacity(side, position));
            if quantity > Decimal::ZERO {
                quotes.push(Quote::market(symbol, side, quantity));
            }
            return quotes;
        }

        let skew = self.inventory_skew(position);
        let mut bid_room = self.capacity(Side::Bid, position);
        let mut ask_room = self.capacity(Side::Ask, position);
        let mut cash_room = (own.cash * self.config.max_balance_use_fraction).max(Decimal::ZERO);

        for offset in self.ladder_offsets(&mut rng) {
            let offset = Decimal::from_f64(offset).unwrap_or(Decimal::ZERO);

            for side in [Side::Bid, Side::Ask] {
                if open >= self.config.max_open_orders {
                    return quotes;
                }
                let price = match side {
                    Side::Bid => mark - offset - skew,
                    Side::Ask => mark + offset - skew,
                }
                .round_dp(2);
                if price <= Decimal::ZERO {
                    continue;
                }

                let room = match side {
                    Side::Bid => bid_room.min((cash_room / price).floor()),
                    Side::Ask => ask_room,
                };
                let quantity = self.sample_quantity(&mut rng).min(room);
                if quantity <= Decimal::ZERO {
                    continue;
                }

                match side {
                    Side::Bid => {
                        bid_room -= quantity;
                        cash_room -= quantity * price;
                    }
                    Side::Ask => ask_room -= quantity,
                }
                quotes.push(Quote::limit(symbol.clone(), side, price, quantity));
                open += 1;
            }
        }

        quotes
    }
}
