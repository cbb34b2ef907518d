//! Trade execution records
//!
//! Trades form an append-only log and are the source of truth for last
//! price and volume history.

use crate::ids::{CompetitorId, OrderId, Symbol, Tick, TradeId};
use crate::numeric::{notional, Price, Quantity};
use crate::order::Side;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An atomic exchange between a resting (maker) order and an incoming order
///
/// Execution price is always the resting order's price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub trade_id: TradeId,
    pub symbol: Symbol,
    pub price: Price,
    pub quantity: Quantity,

    pub buyer_id: CompetitorId,
    pub seller_id: CompetitorId,
    pub buyer_order_id: OrderId,
    pub seller_order_id: OrderId,

    /// Side of the incoming order that caused the match
    pub aggressor: Side,
    pub tick: Tick,
}

impl Trade {
    /// Trade notional (price × quantity)
    pub fn value(&self) -> Decimal {
        notional(self.price, self.quantity)
    }

    /// Whether both legs belong to the same competitor
    pub fn is_self_trade(&self) -> bool {
        self.buyer_id == self.seller_id
    }

    /// Signed inventory change for `competitor` (+q buyer, -q seller)
    pub fn inventory_delta(&self, competitor: &CompetitorId) -> Decimal {
        let mut delta = Decimal::ZERO;
        if &self.buyer_id == competitor {
            delta += self.quantity.as_decimal();
        }
        if &self.seller_id == competitor {
            delta -= self.quantity.as_decimal();
        }
        delta
    }
}
