//! Outcome records emitted by the matching engine

use serde::{Deserialize, Serialize};
use types::ids::OrderId;
use types::numeric::Quantity;
use types::trade::Trade;

/// What happens when an incoming order would trade with the submitter's
/// own resting order
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelfMatchPolicy {
    /// Trade normally
    #[default]
    Allow,
    /// Reject the incoming order before anything is mutated
    Reject,
    /// Remove the submitter's resting order and keep matching
    CancelResting,
}

/// Final state of a submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmitStatus {
    /// Nothing matched; the whole quantity rests in the book
    Resting,
    /// Some quantity matched; a limit remainder rests, a market remainder is discarded
    PartiallyFilled,
    /// Fully matched
    Filled,
    /// Market order with no liquidity to take
    Unfilled,
}

/// Result of submitting an order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitReport {
    pub order_id: OrderId,
    pub trades: Vec<Trade>,
    pub status: SubmitStatus,
    /// Unfilled quantity (resting for limit orders, discarded for market orders)
    pub remaining: Quantity,
    /// Whether the remainder was added to the book
    pub rested: bool,
    /// Own resting orders removed under `SelfMatchPolicy::CancelResting`
    pub self_match_cancels: Vec<OrderId>,
}

impl SubmitReport {
    pub fn filled_quantity(&self) -> Quantity {
        self.trades.iter().fold(Quantity::zero(), |acc, t| acc + t.quantity)
    }
}
