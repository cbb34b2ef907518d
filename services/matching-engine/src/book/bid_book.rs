//! Bid (buy-side) order book
//!
//! Maintains buy orders sorted by price descending (best bid first).
//! Uses BTreeMap for deterministic iteration order.

use std::collections::BTreeMap;
use types::ids::{OrderId, Tick};
use types::numeric::Price;

use super::price_level::{PriceLevel, RestingOrder};
use super::BookSide;

/// Bid (buy) side order book
///
/// Orders are sorted by price descending, so the highest bid is first.
/// At each price level, orders are maintained in FIFO order.
#[derive(Debug, Clone, Default)]
pub struct BidBook {
    /// Price levels keyed ascending; best bid is the last key
    levels: BTreeMap<Price, PriceLevel>,
}

impl BidBook {
    /// Create a new empty bid book
    pub fn new() -> Self {
        Self {
            levels: BTreeMap::new(),
        }
    }

    /// Check if the bid book is empty
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Get the total number of price levels
    pub fn level_count(&self) -> usize {
        self.levels.len()
    }
}

impl BookSide for BidBook {
    fn insert(&mut self, price: Price, order: RestingOrder, tick: Tick) {
        self.levels
            .entry(price)
            .or_insert_with(|| PriceLevel::new(tick))
            .insert(order, tick);
    }

    fn remove(&mut self, order_id: &OrderId, price: Price, tick: Tick) -> Option<RestingOrder> {
        let level = self.levels.get_mut(&price)?;
        let removed = level.remove(order_id, tick)?;
        // Remove empty price levels to keep book clean
        if level.is_empty() {
            self.levels.remove(&price);
        }
        Some(removed)
    }

    fn best_price(&self) -> Option<Price> {
        // BTreeMap iter is ascending, so we need the last key
        self.levels.keys().next_back().copied()
    }

    fn best_level_mut(&mut self) -> Option<(Price, &mut PriceLevel)> {
        self.levels.iter_mut().next_back().map(|(price, level)| (*price, level))
    }

    fn prune(&mut self, price: Price) {
        if self.levels.get(&price).is_some_and(PriceLevel::is_empty) {
            self.levels.remove(&price);
        }
    }

    fn levels_best_first(&self) -> Box<dyn Iterator<Item = (&Price, &PriceLevel)> + '_> {
        Box::new(self.levels.iter().rev())
    }

    fn level(&self, price: &Price) -> Option<&PriceLevel> {
        self.levels.get(price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::ids::CompetitorId;
    use types::numeric::Quantity;

    fn create_test_order(id: u64, qty: u64) -> RestingOrder {
        RestingOrder {
            order_id: OrderId::new(id),
            competitor_id: CompetitorId::new("alice"),
            remaining: Quantity::from_u64(qty),
            submitted_at: Tick::new(1),
        }
    }

    #[test]
    fn test_bid_book_best_bid() {
        let mut book = BidBook::new();
        book.insert(Price::from_u64(100), create_test_order(1, 1), Tick::new(1));
        book.insert(Price::from_u64(102), create_test_order(2, 2), Tick::new(1));
        book.insert(Price::from_u64(99), create_test_order(3, 3), Tick::new(1));

        assert_eq!(book.best_price(), Some(Price::from_u64(102)));
        assert_eq!(book.level_count(), 3);
    }

    #[test]
    fn test_bid_book_depth_snapshot() {
        let mut book = BidBook::new();
        book.insert(Price::from_u64(100), create_test_order(1, 1), Tick::new(1));
        book.insert(Price::from_u64(101), create_test_order(2, 2), Tick::new(2));
        book.insert(Price::from_u64(101), create_test_order(3, 3), Tick::new(3));
        book.insert(Price::from_u64(99), create_test_order(4, 4), Tick::new(4));

        let snapshot = book.depth_snapshot(2);
        assert_eq!(
            snapshot,
            vec![
                (Price::from_u64(101), Quantity::from_u64(5), Tick::new(3)),
                (Price::from_u64(100), Quantity::from_u64(1), Tick::new(1)),
            ]
        );
    }

    #[test]
    fn test_bid_book_remove_drops_empty_level() {
        let mut book = BidBook::new();
        book.insert(Price::from_u64(100), create_test_order(1, 1), Tick::new(1));

        assert!(book.remove(&OrderId::new(1), Price::from_u64(100), Tick::new(2)).is_some());
        assert!(book.is_empty());
        assert!(book.remove(&OrderId::new(1), Price::from_u64(100), Tick::new(2)).is_none());
    }
}
