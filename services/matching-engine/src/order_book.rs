//! Per-symbol order book
//!
//! Pairs a bid book and an ask book and runs continuous price-time priority
//! matching for incoming orders. A submission either fails validation with
//! nothing mutated, or runs to completion: after it returns the book is never
//! crossed and every emptied level has been removed.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;
use types::errors::OrderError;
use types::ids::{CompetitorId, OrderId, Symbol, Tick};
use types::numeric::{Price, Quantity};
use types::order::{Order, Side};
use types::trade::Trade;

use crate::book::{AskBook, BidBook, BookSide, RestingOrder};
use crate::events::{SelfMatchPolicy, SubmitReport, SubmitStatus};
use crate::matching::{crossing, MatchExecutor};

/// One aggregated price level as seen by readers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelSnapshot {
    pub price: Price,
    pub quantity: Quantity,
    /// Tick at which the level was last modified
    pub tick: Tick,
}

/// Point-in-time top-of-book view, best price first on both sides
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookSnapshot {
    pub symbol: Symbol,
    pub bids: Vec<LevelSnapshot>,
    pub asks: Vec<LevelSnapshot>,
}

/// A competitor's resting order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenOrder {
    pub order_id: OrderId,
    pub symbol: Symbol,
    pub side: Side,
    pub price: Price,
    pub remaining: Quantity,
    pub submitted_at: Tick,
}

/// Order book for a single symbol
#[derive(Debug, Clone)]
pub struct OrderBook {
    symbol: Symbol,
    bids: BidBook,
    asks: AskBook,
    /// Side and price of every resting order
    locations: HashMap<OrderId, (Side, Price)>,
    last_trade_price: Option<Price>,
}

impl OrderBook {
    pub fn new(symbol: Symbol) -> Self {
        Self {
            symbol,
            bids: BidBook::new(),
            asks: AskBook::new(),
            locations: HashMap::new(),
            last_trade_price: None,
        }
    }

    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    /// Submit an order: match what crosses, rest a limit remainder
    ///
    /// Execution happens at resting prices. The order's `submitted_at` tick
    /// stamps every level it touches.
    pub fn submit(
        &mut self,
        mut order: Order,
        executor: &mut MatchExecutor,
        policy: SelfMatchPolicy,
    ) -> Result<SubmitReport, OrderError> {
        if order.symbol != self.symbol {
            return Err(OrderError::UnknownSymbol {
                symbol: order.symbol.to_string(),
            });
        }
        if order.remaining_quantity.is_zero() {
            return Err(OrderError::InvalidQuantity("quantity must be positive".to_string()));
        }
        if policy == SelfMatchPolicy::Reject && self.would_self_match(&order) {
            return Err(OrderError::SelfMatch);
        }

        let tick = order.submitted_at;
        let Self {
            symbol,
            bids,
            asks,
            locations,
            last_trade_price,
        } = self;

        let (trades, self_match_cancels) = match order.side {
            Side::Bid => sweep(asks, locations, executor, symbol, &mut order, policy),
            Side::Ask => sweep(bids, locations, executor, symbol, &mut order, policy),
        };

        if let Some(last) = trades.last() {
            *last_trade_price = Some(last.price);
        }

        let mut rested = false;
        if let Some(price) = order.limit_price() {
            if !order.is_filled() {
                let entry = RestingOrder {
                    order_id: order.order_id,
                    competitor_id: order.competitor_id.clone(),
                    remaining: order.remaining_quantity,
                    submitted_at: tick,
                };
                match order.side {
                    Side::Bid => bids.insert(price, entry, tick),
                    Side::Ask => asks.insert(price, entry, tick),
                }
                locations.insert(order.order_id, (order.side, price));
                rested = true;
            }
        }

        let status = if order.is_filled() {
            SubmitStatus::Filled
        } else if trades.is_empty() && rested {
            SubmitStatus::Resting
        } else if trades.is_empty() {
            SubmitStatus::Unfilled
        } else {
            SubmitStatus::PartiallyFilled
        };

        Ok(SubmitReport {
            order_id: order.order_id,
            trades,
            status,
            remaining: order.remaining_quantity,
            rested,
            self_match_cancels,
        })
    }

    /// Dry run over the crossable queue: would this order reach one of the
    /// submitter's own resting orders before it is exhausted?
    fn would_self_match(&self, order: &Order) -> bool {
        let levels = match order.side {
            Side::Bid => self.asks.levels_best_first(),
            Side::Ask => self.bids.levels_best_first(),
        };

        let mut remaining = order.remaining_quantity;
        for (price, level) in levels {
            if !crossing::incoming_can_match(order.side, order.order_type, *price) {
                break;
            }
            for resting in level.iter() {
                if resting.competitor_id == order.competitor_id {
                    return true;
                }
                remaining = remaining.saturating_sub(resting.remaining);
                if remaining.is_zero() {
                    return false;
                }
            }
        }
        false
    }

    /// Cancel a resting order
    ///
    /// Returns false if the order is not (or no longer) in the book.
    pub fn cancel(&mut self, order_id: &OrderId, tick: Tick) -> bool {
        self.remove_order(order_id, tick).is_some()
    }

    /// Remove a resting order and return it
    pub fn remove_order(&mut self, order_id: &OrderId, tick: Tick) -> Option<RestingOrder> {
        let (side, price) = self.locations.remove(order_id)?;
        match side {
            Side::Bid => self.bids.remove(order_id, price, tick),
            Side::Ask => self.asks.remove(order_id, price, tick),
        }
    }

    /// Owner of a resting order
    pub fn owner_of(&self, order_id: &OrderId) -> Option<&CompetitorId> {
        let (side, price) = self.locations.get(order_id)?;
        let level = match side {
            Side::Bid => self.bids.level(price)?,
            Side::Ask => self.asks.level(price)?,
        };
        level
            .iter()
            .find(|entry| &entry.order_id == order_id)
            .map(|entry| &entry.competitor_id)
    }

    pub fn contains(&self, order_id: &OrderId) -> bool {
        self.locations.contains_key(order_id)
    }

    pub fn best_bid(&self) -> Option<Price> {
        self.bids.best_price()
    }

    pub fn best_ask(&self) -> Option<Price> {
        self.asks.best_price()
    }

    /// Midpoint of best bid and best ask, when both exist
    pub fn mid_price(&self) -> Option<Price> {
        Some(Price::midpoint(self.best_bid()?, self.best_ask()?))
    }

    pub fn last_trade_price(&self) -> Option<Price> {
        self.last_trade_price
    }

    /// Top `depth` levels per side
    pub fn snapshot(&self, depth: usize) -> BookSnapshot {
        let to_levels = |levels: Vec<(Price, Quantity, Tick)>| {
            levels
                .into_iter()
                .map(|(price, quantity, tick)| LevelSnapshot { price, quantity, tick })
                .collect()
        };
        BookSnapshot {
            symbol: self.symbol.clone(),
            bids: to_levels(self.bids.depth_snapshot(depth)),
            asks: to_levels(self.asks.depth_snapshot(depth)),
        }
    }

    /// Resting orders belonging to `competitor`, bids then asks, best first
    pub fn orders_of(&self, competitor: &CompetitorId) -> Vec<OpenOrder> {
        let mut out = Vec::new();
        let sides = [
            (Side::Bid, self.bids.levels_best_first()),
            (Side::Ask, self.asks.levels_best_first()),
        ];
        for (side, levels) in sides {
            for (price, level) in levels {
                for entry in level.iter().filter(|e| &e.competitor_id == competitor) {
                    out.push(OpenOrder {
                        order_id: entry.order_id,
                        symbol: self.symbol.clone(),
                        side,
                        price: *price,
                        remaining: entry.remaining,
                        submitted_at: entry.submitted_at,
                    });
                }
            }
        }
        out
    }

    /// Number of resting orders on both sides
    pub fn resting_order_count(&self) -> usize {
        self.locations.len()
    }

    /// Total resting quantity on one side
    pub fn side_depth(&self, side: Side) -> Quantity {
        let levels = match side {
            Side::Bid => self.bids.levels_best_first(),
            Side::Ask => self.asks.levels_best_first(),
        };
        levels.fold(Quantity::zero(), |acc, (_, level)| acc + level.total_quantity())
    }
}

/// Match `order` against the opposite side until it is filled or no longer
/// crosses. Returns the trades and any own orders cancelled on the way.
fn sweep<B: BookSide>(
    opposite: &mut B,
    locations: &mut HashMap<OrderId, (Side, Price)>,
    executor: &mut MatchExecutor,
    symbol: &Symbol,
    order: &mut Order,
    policy: SelfMatchPolicy,
) -> (Vec<Trade>, Vec<OrderId>) {
    let tick = order.submitted_at;
    let mut trades = Vec::new();
    let mut cancels = Vec::new();

    while !order.is_filled() {
        let Some((price, level)) = opposite.best_level_mut() else {
            break;
        };
        if !crossing::incoming_can_match(order.side, order.order_type, price) {
            break;
        }
        let Some(front) = level.peek_front().cloned() else {
            opposite.prune(price);
            continue;
        };

        if policy == SelfMatchPolicy::CancelResting && front.competitor_id == order.competitor_id {
            level.pop_front(tick);
            locations.remove(&front.order_id);
            debug!(
                symbol = %symbol,
                competitor = %front.competitor_id,
                order_id = %front.order_id,
                "self-match: cancelled resting order"
            );
            cancels.push(front.order_id);
        } else {
            let quantity = order.remaining_quantity.min(front.remaining);
            trades.push(executor.execute_trade(symbol, order, &front, price, quantity, tick));
            order.fill(quantity);
            if let Some(done) = level.fill_front(quantity, tick) {
                locations.remove(&done.order_id);
            }
        }

        opposite.prune(price);
    }

    (trades, cancels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::order::OrderType;

    fn limit(id: u64, who: &str, side: Side, price: u64, qty: u64, tick: u64) -> Order {
        Order::new(
            OrderId::new(id),
            CompetitorId::new(who),
            Symbol::new("NVR"),
            side,
            OrderType::Limit(Price::from_u64(price)),
            Quantity::from_u64(qty),
            Tick::new(tick),
        )
    }

    fn market(id: u64, who: &str, side: Side, qty: u64, tick: u64) -> Order {
        Order::new(
            OrderId::new(id),
            CompetitorId::new(who),
            Symbol::new("NVR"),
            side,
            OrderType::Market,
            Quantity::from_u64(qty),
            Tick::new(tick),
        )
    }

    fn book() -> (OrderBook, MatchExecutor) {
        (OrderBook::new(Symbol::new("NVR")), MatchExecutor::default())
    }

    #[test]
    fn test_bid_rests_on_empty_book() {
        let (mut book, mut ex) = book();
        let report = book
            .submit(limit(1, "a", Side::Bid, 100, 10, 0), &mut ex, SelfMatchPolicy::Allow)
            .unwrap();

        assert_eq!(report.status, SubmitStatus::Resting);
        assert!(report.trades.is_empty());

        let snap = book.snapshot(10);
        assert_eq!(
            snap.bids,
            vec![LevelSnapshot {
                price: Price::from_u64(100),
                quantity: Quantity::from_u64(10),
                tick: Tick::new(0),
            }]
        );
        assert!(snap.asks.is_empty());
    }

    #[test]
    fn test_crossing_bid_partially_fills_then_rests() {
        let (mut book, mut ex) = book();
        book.submit(limit(1, "a", Side::Ask, 101, 5, 0), &mut ex, SelfMatchPolicy::Allow)
            .unwrap();
        let report = book
            .submit(limit(2, "b", Side::Bid, 102, 8, 1), &mut ex, SelfMatchPolicy::Allow)
            .unwrap();

        assert_eq!(report.status, SubmitStatus::PartiallyFilled);
        assert_eq!(report.trades.len(), 1);
        assert_eq!(report.trades[0].price, Price::from_u64(101));
        assert_eq!(report.trades[0].quantity, Quantity::from_u64(5));
        assert_eq!(report.remaining, Quantity::from_u64(3));
        assert!(report.rested);

        assert_eq!(book.best_ask(), None);
        assert_eq!(book.best_bid(), Some(Price::from_u64(102)));
        assert_eq!(book.snapshot(1).bids[0].quantity, Quantity::from_u64(3));
        assert_eq!(book.last_trade_price(), Some(Price::from_u64(101)));
    }

    #[test]
    fn test_time_priority_within_level() {
        let (mut book, mut ex) = book();
        book.submit(limit(1, "early", Side::Ask, 100, 5, 1), &mut ex, SelfMatchPolicy::Allow)
            .unwrap();
        book.submit(limit(2, "late", Side::Ask, 100, 5, 2), &mut ex, SelfMatchPolicy::Allow)
            .unwrap();

        let report = book
            .submit(limit(3, "buyer", Side::Bid, 100, 6, 3), &mut ex, SelfMatchPolicy::Allow)
            .unwrap();

        assert_eq!(report.trades.len(), 2);
        assert_eq!(report.trades[0].seller_id, CompetitorId::new("early"));
        assert_eq!(report.trades[0].quantity, Quantity::from_u64(5));
        assert_eq!(report.trades[1].seller_id, CompetitorId::new("late"));
        assert_eq!(report.trades[1].quantity, Quantity::from_u64(1));
        assert!(!book.contains(&OrderId::new(1)));
        assert!(book.contains(&OrderId::new(2)));
    }

    #[test]
    fn test_sweeps_multiple_levels_at_resting_prices() {
        let (mut book, mut ex) = book();
        book.submit(limit(1, "a", Side::Bid, 99, 2, 0), &mut ex, SelfMatchPolicy::Allow)
            .unwrap();
        book.submit(limit(2, "a", Side::Bid, 100, 2, 0), &mut ex, SelfMatchPolicy::Allow)
            .unwrap();

        let report = book
            .submit(limit(3, "b", Side::Ask, 98, 3, 1), &mut ex, SelfMatchPolicy::Allow)
            .unwrap();

        let prices: Vec<Price> = report.trades.iter().map(|t| t.price).collect();
        assert_eq!(prices, vec![Price::from_u64(100), Price::from_u64(99)]);
        assert_eq!(report.status, SubmitStatus::Filled);
        assert_eq!(book.snapshot(5).bids.len(), 1);
    }

    #[test]
    fn test_market_order_never_rests() {
        let (mut book, mut ex) = book();
        let report = book
            .submit(market(1, "a", Side::Bid, 5, 0), &mut ex, SelfMatchPolicy::Allow)
            .unwrap();
        assert_eq!(report.status, SubmitStatus::Unfilled);
        assert!(!report.rested);
        assert_eq!(book.resting_order_count(), 0);

        book.submit(limit(2, "b", Side::Ask, 150, 2, 1), &mut ex, SelfMatchPolicy::Allow)
            .unwrap();
        let report = book
            .submit(market(3, "a", Side::Bid, 5, 1), &mut ex, SelfMatchPolicy::Allow)
            .unwrap();
        assert_eq!(report.status, SubmitStatus::PartiallyFilled);
        assert_eq!(report.remaining, Quantity::from_u64(3));
        assert!(book.best_bid().is_none());
    }

    #[test]
    fn test_self_match_allowed_by_default() {
        let (mut book, mut ex) = book();
        book.submit(limit(1, "a", Side::Ask, 100, 5, 0), &mut ex, SelfMatchPolicy::default())
            .unwrap();
        let report = book
            .submit(limit(2, "a", Side::Bid, 100, 5, 1), &mut ex, SelfMatchPolicy::default())
            .unwrap();
        assert_eq!(report.trades.len(), 1);
        assert!(report.trades[0].is_self_trade());
    }

    #[test]
    fn test_self_match_reject_leaves_book_untouched() {
        let (mut book, mut ex) = book();
        book.submit(limit(1, "b", Side::Ask, 100, 2, 0), &mut ex, SelfMatchPolicy::Reject)
            .unwrap();
        book.submit(limit(2, "a", Side::Ask, 101, 5, 0), &mut ex, SelfMatchPolicy::Reject)
            .unwrap();
        let before = book.snapshot(10);

        let result =
            book.submit(limit(3, "a", Side::Bid, 101, 4, 1), &mut ex, SelfMatchPolicy::Reject);
        assert_eq!(result, Err(OrderError::SelfMatch));
        assert_eq!(book.snapshot(10), before);
        assert_eq!(ex.peek_sequence(), 1);

        // Fully satisfied before reaching its own order
        let report = book
            .submit(limit(4, "a", Side::Bid, 101, 2, 1), &mut ex, SelfMatchPolicy::Reject)
            .unwrap();
        assert_eq!(report.status, SubmitStatus::Filled);
    }

    #[test]
    fn test_self_match_cancel_resting() {
        let (mut book, mut ex) = book();
        book.submit(limit(1, "a", Side::Ask, 100, 2, 0), &mut ex, SelfMatchPolicy::CancelResting)
            .unwrap();
        book.submit(limit(2, "b", Side::Ask, 100, 3, 0), &mut ex, SelfMatchPolicy::CancelResting)
            .unwrap();

        let report = book
            .submit(limit(3, "a", Side::Bid, 100, 3, 1), &mut ex, SelfMatchPolicy::CancelResting)
            .unwrap();

        assert_eq!(report.self_match_cancels, vec![OrderId::new(1)]);
        assert_eq!(report.trades.len(), 1);
        assert_eq!(report.trades[0].seller_id, CompetitorId::new("b"));
        assert_eq!(report.status, SubmitStatus::Filled);
        assert!(!book.contains(&OrderId::new(1)));
    }

    #[test]
    fn test_cancel_is_noop_after_fill() {
        let (mut book, mut ex) = book();
        book.submit(limit(1, "a", Side::Bid, 100, 5, 0), &mut ex, SelfMatchPolicy::Allow)
            .unwrap();
        assert_eq!(book.owner_of(&OrderId::new(1)), Some(&CompetitorId::new("a")));

        book.submit(limit(2, "b", Side::Ask, 100, 5, 1), &mut ex, SelfMatchPolicy::Allow)
            .unwrap();
        assert!(!book.cancel(&OrderId::new(1), Tick::new(2)));

        book.submit(limit(3, "a", Side::Bid, 99, 5, 2), &mut ex, SelfMatchPolicy::Allow)
            .unwrap();
        assert!(book.cancel(&OrderId::new(3), Tick::new(2)));
        assert!(book.best_bid().is_none());
    }

    #[test]
    fn test_orders_of_and_mid() {
        let (mut book, mut ex) = book();
        book.submit(limit(1, "a", Side::Bid, 99, 1, 0), &mut ex, SelfMatchPolicy::Allow)
            .unwrap();
        book.submit(limit(2, "a", Side::Ask, 102, 1, 0), &mut ex, SelfMatchPolicy::Allow)
            .unwrap();
        book.submit(limit(3, "b", Side::Ask, 101, 1, 0), &mut ex, SelfMatchPolicy::Allow)
            .unwrap();

        let mine = book.orders_of(&CompetitorId::new("a"));
        assert_eq!(mine.len(), 2);
        assert_eq!(mine[0].side, Side::Bid);
        assert_eq!(mine[1].price, Price::from_u64(102));

        assert_eq!(book.mid_price(), Some(Price::from_u64(100)));
        assert_eq!(book.side_depth(Side::Ask), Quantity::from_u64(2));
    }

    #[test]
    fn test_rejects_zero_quantity_and_wrong_symbol() {
        let (mut book, mut ex) = book();
        let result =
            book.submit(limit(1, "a", Side::Bid, 100, 0, 0), &mut ex, SelfMatchPolicy::Allow);
        assert!(matches!(result, Err(OrderError::InvalidQuantity(_))));

        let mut other = limit(2, "a", Side::Bid, 100, 1, 0);
        other.symbol = Symbol::new("CPMD");
        let result = book.submit(other, &mut ex, SelfMatchPolicy::Allow);
        assert!(matches!(result, Err(OrderError::UnknownSymbol { .. })));
        assert_eq!(book.resting_order_count(), 0);
    }
}
