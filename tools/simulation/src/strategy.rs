//! Strategy contract
//!
//! A strategy is a pure function over a read-only market view and the
//! competitor's own state, returning a typed list of quotes. Nothing a
//! strategy does can reach the engine except through its return value.

use matching_engine::{BookSnapshot, OpenOrder};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use types::ids::{CompetitorId, OrderId, Symbol, Tick};
use types::numeric::Price;
use types::order::Side;

use crate::snapshot::MarketSnapshot;

/// One instruction returned by a strategy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Quote {
    Limit {
        symbol: Symbol,
        side: Side,
        price: Decimal,
        quantity: Decimal,
    },
    Market {
        symbol: Symbol,
        side: Side,
        quantity: Decimal,
    },
    Cancel {
        order_id: OrderId,
    },
}

impl Quote {
    pub fn limit(symbol: impl Into<Symbol>, side: Side, price: Decimal, quantity: Decimal) -> Self {
        Quote::Limit {
            symbol: symbol.into(),
            side,
            price,
            quantity,
        }
    }

    pub fn market(symbol: impl Into<Symbol>, side: Side, quantity: Decimal) -> Self {
        Quote::Market {
            symbol: symbol.into(),
            side,
            quantity,
        }
    }

    pub fn cancel(order_id: OrderId) -> Self {
        Quote::Cancel { order_id }
    }

    pub fn is_cancel(&self) -> bool {
        matches!(self, Quote::Cancel { .. })
    }
}

/// Read-only market state handed to every strategy for one tick
///
/// Wraps the snapshot published at the end of the previous tick, so all
/// strategies in a tick see the same book.
#[derive(Debug, Clone)]
pub struct MarketView {
    pub tick: Tick,
    snapshot: Arc<MarketSnapshot>,
}

impl MarketView {
    pub fn new(tick: Tick, snapshot: Arc<MarketSnapshot>) -> Self {
        Self { tick, snapshot }
    }

    pub fn snapshot(&self) -> &MarketSnapshot {
        &self.snapshot
    }

    pub fn symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.snapshot.books.keys()
    }

    pub fn book(&self, symbol: &Symbol) -> Option<&BookSnapshot> {
        self.snapshot.books.get(symbol)
    }

    pub fn best_bid(&self, symbol: &Symbol) -> Option<Price> {
        self.book(symbol)?.bids.first().map(|l| l.price)
    }

    pub fn best_ask(&self, symbol: &Symbol) -> Option<Price> {
        self.book(symbol)?.asks.first().map(|l| l.price)
    }

    pub fn mid(&self, symbol: &Symbol) -> Option<Price> {
        Some(Price::midpoint(self.best_bid(symbol)?, self.best_ask(symbol)?))
    }

    pub fn last_trade_price(&self, symbol: &Symbol) -> Option<Price> {
        self.snapshot.last_trade_prices.get(symbol).copied()
    }

    pub fn reference_price(&self, symbol: &Symbol) -> Option<Price> {
        self.snapshot.reference_prices.get(symbol).copied()
    }

    /// Mid, else last trade, else reference price
    pub fn mark(&self, symbol: &Symbol) -> Option<Price> {
        self.mid(symbol)
            .or_else(|| self.last_trade_price(symbol))
            .or_else(|| self.reference_price(symbol))
    }
}

/// A competitor's own state as shown to its strategy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompetitorView {
    pub id: CompetitorId,
    pub cash: Decimal,
    pub inventory: BTreeMap<Symbol, Decimal>,
    /// Equity marked at the end of the previous tick
    pub equity: Decimal,
    pub open_orders: Vec<OpenOrder>,
}

impl CompetitorView {
    pub fn position(&self, symbol: &Symbol) -> Decimal {
        self.inventory.get(symbol).copied().unwrap_or(Decimal::ZERO)
    }
}

/// Competitor quoting logic
///
/// Called once per tick on the blocking pool; must return within the
/// configured time budget.
pub trait Strategy: Send + Sync {
    fn quote(&self, market: &MarketView, own: &CompetitorView) -> Vec<Quote>;
}

impl<F> Strategy for F
where
    F: Fn(&MarketView, &CompetitorView) -> Vec<Quote> + Send + Sync,
{
    fn quote(&self, market: &MarketView, own: &CompetitorView) -> Vec<Quote> {
        self(market, own)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use matching_engine::LevelSnapshot;
    use types::numeric::Quantity;

    fn view_with_book(bids: &[u64], asks: &[u64]) -> MarketView {
        let sym = Symbol::new("NVR");
        let level = |p: u64| LevelSnapshot {
            price: Price::from_u64(p),
            quantity: Quantity::from_u64(1),
            tick: Tick::ZERO,
        };
        let mut snapshot = MarketSnapshot::empty();
        snapshot.books.insert(
            sym.clone(),
            BookSnapshot {
                symbol: sym.clone(),
                bids: bids.iter().map(|p| level(*p)).collect(),
                asks: asks.iter().map(|p| level(*p)).collect(),
            },
        );
        snapshot.reference_prices.insert(sym, Price::from_u64(150));
        MarketView::new(Tick::new(3), Arc::new(snapshot))
    }

    #[test]
    fn test_mark_prefers_mid() {
        let view = view_with_book(&[99, 98], &[101]);
        let sym = Symbol::new("NVR");
        assert_eq!(view.best_bid(&sym), Some(Price::from_u64(99)));
        assert_eq!(view.mark(&sym), Some(Price::from_u64(100)));
    }

    #[test]
    fn test_mark_falls_back_to_reference() {
        let view = view_with_book(&[99], &[]);
        assert_eq!(view.mark(&Symbol::new("NVR")), Some(Price::from_u64(150)));
        assert_eq!(view.mark(&Symbol::new("TVW")), None);
    }

    #[test]
    fn test_quote_json_shape() {
        let q: Quote = serde_json::from_str(
            r#"{"type":"limit","symbol":"NVR","side":"bid","price":"100.5","quantity":"3"}"#,
        )
        .unwrap();
        assert_eq!(
            q,
            Quote::limit("NVR", Side::Bid, Decimal::new(1005, 1), Decimal::from(3))
        );
    }

    #[test]
    fn test_closure_is_strategy() {
        let s = |_: &MarketView, _: &CompetitorView| vec![Quote::cancel(OrderId::new(7))];
        let view = view_with_book(&[], &[]);
        let own = CompetitorView {
            id: CompetitorId::new("a"),
            cash: Decimal::ZERO,
            inventory: BTreeMap::new(),
            equity: Decimal::ZERO,
            open_orders: vec![],
        };
        assert_eq!(s.quote(&view, &own).len(), 1);
    }
}
