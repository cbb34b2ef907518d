//! Order book infrastructure module
//!
//! Contains price levels, bid book, and ask book implementations.

pub mod price_level;
pub mod bid_book;
pub mod ask_book;

pub use price_level::{PriceLevel, RestingOrder};
pub use bid_book::BidBook;
pub use ask_book::AskBook;

use types::ids::{OrderId, Tick};
use types::numeric::{Price, Quantity};

/// Operations the matcher needs from one side of the book
///
/// "Best" means highest price for bids and lowest for asks.
pub trait BookSide {
    /// Append an order to the level at `price`, creating it if needed
    fn insert(&mut self, price: Price, order: RestingOrder, tick: Tick);

    /// Remove an order, dropping its level if that empties it
    fn remove(&mut self, order_id: &OrderId, price: Price, tick: Tick) -> Option<RestingOrder>;

    fn best_price(&self) -> Option<Price>;

    fn best_level_mut(&mut self) -> Option<(Price, &mut PriceLevel)>;

    /// Drop the level at `price` if it has no orders left
    fn prune(&mut self, price: Price);

    /// Levels in priority order, best first
    fn levels_best_first(&self) -> Box<dyn Iterator<Item = (&Price, &PriceLevel)> + '_>;

    fn level(&self, price: &Price) -> Option<&PriceLevel>;

    /// Top `depth` levels as (price, aggregate quantity, last-modified tick)
    fn depth_snapshot(&self, depth: usize) -> Vec<(Price, Quantity, Tick)> {
        self.levels_best_first()
            .take(depth)
            .map(|(price, level)| (*price, level.total_quantity(), level.updated_at()))
            .collect()
    }
}
