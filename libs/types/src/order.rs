//! Order types
//!
//! `OrderRequest` is the unvalidated form a strategy or caller hands to the
//! engine. `Order` is the validated, engine-owned record; once placed it only
//! ever changes by having its remaining quantity reduced on a fill.

use crate::ids::{CompetitorId, OrderId, Symbol, Tick};
use crate::numeric::{Price, Quantity};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Order side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Buy order
    Bid,
    /// Sell order
    Ask,
}

impl Side {
    /// Get the opposite side
    pub fn opposite(&self) -> Self {
        match self {
            Side::Bid => Side::Ask,
            Side::Ask => Side::Bid,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Bid => write!(f, "bid"),
            Side::Ask => write!(f, "ask"),
        }
    }
}

/// Limit orders rest at their price; market orders sweep and never rest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "price", rename_all = "lowercase")]
pub enum OrderType {
    Limit(Price),
    Market,
}

/// Unvalidated order submission
///
/// `price = None` denotes a market order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub competitor_id: CompetitorId,
    pub symbol: Symbol,
    pub side: Side,
    pub price: Option<Decimal>,
    pub quantity: Decimal,
}

impl OrderRequest {
    pub fn limit(
        competitor_id: impl Into<CompetitorId>,
        symbol: impl Into<Symbol>,
        side: Side,
        price: Decimal,
        quantity: Decimal,
    ) -> Self {
        Self {
            competitor_id: competitor_id.into(),
            symbol: symbol.into(),
            side,
            price: Some(price),
            quantity,
        }
    }

    pub fn market(
        competitor_id: impl Into<CompetitorId>,
        symbol: impl Into<Symbol>,
        side: Side,
        quantity: Decimal,
    ) -> Self {
        Self {
            competitor_id: competitor_id.into(),
            symbol: symbol.into(),
            side,
            price: None,
            quantity,
        }
    }
}

/// Validated order owned by the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: OrderId,
    pub competitor_id: CompetitorId,
    pub symbol: Symbol,
    pub side: Side,
    pub order_type: OrderType,
    pub quantity: Quantity,
    pub remaining_quantity: Quantity,
    pub submitted_at: Tick,
}

impl Order {
    pub fn new(
        order_id: OrderId,
        competitor_id: CompetitorId,
        symbol: Symbol,
        side: Side,
        order_type: OrderType,
        quantity: Quantity,
        submitted_at: Tick,
    ) -> Self {
        Self {
            order_id,
            competitor_id,
            symbol,
            side,
            order_type,
            quantity,
            remaining_quantity: quantity,
            submitted_at,
        }
    }

    /// Limit price, or None for market orders
    pub fn limit_price(&self) -> Option<Price> {
        match self.order_type {
            OrderType::Limit(price) => Some(price),
            OrderType::Market => None,
        }
    }

    pub fn is_market(&self) -> bool {
        matches!(self.order_type, OrderType::Market)
    }

    pub fn filled_quantity(&self) -> Quantity {
        self.quantity - self.remaining_quantity
    }

    pub fn is_filled(&self) -> bool {
        self.remaining_quantity.is_zero()
    }

    /// Reduce remaining quantity by a fill
    ///
    /// # Panics
    /// Panics if the fill exceeds the remaining quantity
    pub fn fill(&mut self, quantity: Quantity) {
        assert!(
            quantity <= self.remaining_quantity,
            "Fill {} exceeds remaining {}",
            quantity,
            self.remaining_quantity
        );
        self.remaining_quantity = self.remaining_quantity - quantity;
    }
}
