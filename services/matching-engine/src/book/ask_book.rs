//! Ask (sell-side) order book
//!
//! Maintains sell orders sorted by price ascending (best ask first).

use std::collections::BTreeMap;
use types::ids::{OrderId, Tick};
use types::numeric::Price;

use super::price_level::{PriceLevel, RestingOrder};
use super::BookSide;

/// Ask (sell) side order book
///
/// Orders are sorted by price ascending, so the lowest ask is first.
#[derive(Debug, Clone, Default)]
pub struct AskBook {
    levels: BTreeMap<Price, PriceLevel>,
}

impl AskBook {
    pub fn new() -> Self {
        Self {
            levels: BTreeMap::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }
}

impl BookSide for AskBook {
    fn insert(&mut self, price: Price, order: RestingOrder, tick: Tick) {
        self.levels
            .entry(price)
            .or_insert_with(|| PriceLevel::new(tick))
            .insert(order, tick);
    }

    fn remove(&mut self, order_id: &OrderId, price: Price, tick: Tick) -> Option<RestingOrder> {
        let level = self.levels.get_mut(&price)?;
        let removed = level.remove(order_id, tick)?;
        if level.is_empty() {
            self.levels.remove(&price);
        }
        Some(removed)
    }

    fn best_price(&self) -> Option<Price> {
        self.levels.keys().next().copied()
    }

    fn best_level_mut(&mut self) -> Option<(Price, &mut PriceLevel)> {
        self.levels.iter_mut().next().map(|(price, level)| (*price, level))
    }

    fn prune(&mut self, price: Price) {
        if self.levels.get(&price).is_some_and(PriceLevel::is_empty) {
            self.levels.remove(&price);
        }
    }

    fn levels_best_first(&self) -> Box<dyn Iterator<Item = (&Price, &PriceLevel)> + '_> {
        Box::new(self.levels.iter())
    }

    fn level(&self, price: &Price) -> Option<&PriceLevel> {
        self.levels.get(price)
    }
}
