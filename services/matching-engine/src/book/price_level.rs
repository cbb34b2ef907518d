//! Price level implementation with FIFO queue
//!
//! A price level contains all resting orders at a specific price point.
//! Orders are kept in arrival order to enforce time priority; a partial fill
//! reduces quantity in place and never moves an order within the queue.

use std::collections::VecDeque;
use types::ids::{CompetitorId, OrderId, Tick};
use types::numeric::Quantity;

/// Entry in the price level queue
#[derive(Debug, Clone, PartialEq)]
pub struct RestingOrder {
    pub order_id: OrderId,
    pub competitor_id: CompetitorId,
    pub remaining: Quantity,
    pub submitted_at: Tick,
}

/// A price level containing orders at a specific price
#[derive(Debug, Clone)]
pub struct PriceLevel {
    /// Queue of orders at this price level (FIFO order)
    orders: VecDeque<RestingOrder>,
    /// Total quantity available at this level
    total_quantity: Quantity,
    /// Tick of the last insert, fill or cancel at this level
    updated_at: Tick,
}

impl PriceLevel {
    /// Create a new empty price level
    pub fn new(tick: Tick) -> Self {
        Self {
            orders: VecDeque::new(),
            total_quantity: Quantity::zero(),
            updated_at: tick,
        }
    }

    /// Insert an order at the back of the queue (time priority)
    pub fn insert(&mut self, order: RestingOrder, tick: Tick) {
        self.total_quantity = self.total_quantity + order.remaining;
        self.orders.push_back(order);
        self.updated_at = tick;
    }

    /// Remove an order from the queue by OrderId
    pub fn remove(&mut self, order_id: &OrderId, tick: Tick) -> Option<RestingOrder> {
        let position = self.orders.iter().position(|entry| &entry.order_id == order_id)?;
        let entry = self.orders.remove(position)?;
        self.total_quantity = self.total_quantity.saturating_sub(entry.remaining);
        self.updated_at = tick;
        Some(entry)
    }

    /// Peek at the front order without removing it
    pub fn peek_front(&self) -> Option<&RestingOrder> {
        self.orders.front()
    }

    /// Pop the front order from the queue
    pub fn pop_front(&mut self, tick: Tick) -> Option<RestingOrder> {
        let entry = self.orders.pop_front()?;
        self.total_quantity = self.total_quantity.saturating_sub(entry.remaining);
        self.updated_at = tick;
        Some(entry)
    }

    /// Fill the front order by `quantity`
    ///
    /// Returns the front order if the fill exhausted it (it is removed from
    /// the queue), otherwise None.
    pub fn fill_front(&mut self, quantity: Quantity, tick: Tick) -> Option<RestingOrder> {
        let entry = self.orders.front_mut()?;
        let fill = quantity.min(entry.remaining);
        entry.remaining = entry.remaining - fill;
        self.total_quantity = self.total_quantity.saturating_sub(fill);
        self.updated_at = tick;

        if entry.remaining.is_zero() {
            self.orders.pop_front()
        } else {
            None
        }
    }

    /// Iterate orders in time priority
    pub fn iter(&self) -> impl Iterator<Item = &RestingOrder> {
        self.orders.iter()
    }

    /// Check if the price level is empty
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Get the total quantity at this price level
    pub fn total_quantity(&self) -> Quantity {
        self.total_quantity
    }

    /// Get the number of orders at this level
    pub fn order_count(&self) -> usize {
        self.orders.len()
    }

    pub fn updated_at(&self) -> Tick {
        self.updated_at
    }
}
