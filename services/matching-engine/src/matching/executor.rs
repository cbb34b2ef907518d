//! Trade execution logic
//!
//! Turns a fill between an incoming order and a resting order into a
//! `Trade`, issuing trade ids from a monotonically increasing counter.

use types::ids::{Symbol, Tick, TradeId};
use types::numeric::{Price, Quantity};
use types::order::{Order, Side};
use types::trade::Trade;

use crate::book::RestingOrder;

/// Match executor for handling trade generation
#[derive(Debug, Clone)]
pub struct MatchExecutor {
    sequence_counter: u64,
}

impl MatchExecutor {
    /// Create a new match executor with starting sequence number
    pub fn new(starting_sequence: u64) -> Self {
        Self {
            sequence_counter: starting_sequence,
        }
    }

    /// Get next sequence number (monotonically increasing)
    fn next_sequence(&mut self) -> u64 {
        let seq = self.sequence_counter;
        self.sequence_counter += 1;
        seq
    }

    /// Sequence number the next trade will receive
    pub fn peek_sequence(&self) -> u64 {
        self.sequence_counter
    }

    /// Execute a trade between an incoming order and a resting order
    ///
    /// `price` is the resting order's level price.
    pub fn execute_trade(
        &mut self,
        symbol: &Symbol,
        incoming: &Order,
        resting: &RestingOrder,
        price: Price,
        quantity: Quantity,
        tick: Tick,
    ) -> Trade {
        let trade_id = TradeId::new(self.next_sequence());

        let (buyer_id, buyer_order_id, seller_id, seller_order_id) = match incoming.side {
            Side::Bid => (
                incoming.competitor_id.clone(),
                incoming.order_id,
                resting.competitor_id.clone(),
                resting.order_id,
            ),
            Side::Ask => (
                resting.competitor_id.clone(),
                resting.order_id,
                incoming.competitor_id.clone(),
                incoming.order_id,
            ),
        };

        Trade {
            trade_id,
            symbol: symbol.clone(),
            price,
            quantity,
            buyer_id,
            seller_id,
            buyer_order_id,
            seller_order_id,
            aggressor: incoming.side,
            tick,
        }
    }
}

impl Default for MatchExecutor {
    fn default() -> Self {
        Self::new(1)
    }
}
