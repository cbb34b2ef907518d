//! Crossing detection logic
//!
//! Determines when a bid and ask can match based on price compatibility

use types::numeric::Price;
use types::order::{OrderType, Side};

/// Check if a bid and ask can match at given prices
///
/// For a buy order to match with a sell order the buy price must be >= the
/// sell price.
pub fn can_match(bid_price: Price, ask_price: Price) -> bool {
    bid_price >= ask_price
}

/// Check if an incoming order can match against a resting level
///
/// Market orders cross any resting price.
pub fn incoming_can_match(
    incoming_side: Side,
    order_type: OrderType,
    resting_price: Price,
) -> bool {
    match order_type {
        OrderType::Market => true,
        OrderType::Limit(price) => match incoming_side {
            Side::Bid => can_match(price, resting_price),
            Side::Ask => can_match(resting_price, price),
        },
    }
}

/// Whether a book with these tops is crossed
pub fn is_crossed(best_bid: Option<Price>, best_ask: Option<Price>) -> bool {
    match (best_bid, best_ask) {
        (Some(bid), Some(ask)) => can_match(bid, ask),
        _ => false,
    }
}
