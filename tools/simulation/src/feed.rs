//! Read-only dashboard feed
//!
//! Answers polls from the published snapshot only, so it can be queried at
//! any rate, from any task, without touching the tick pipeline.

use scoring::LeaderboardEntry;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::watch;
use types::ids::{Symbol, Tick};
use types::numeric::{Price, Quantity};

use crate::snapshot::MarketSnapshot;

/// `(price, quantity, tick_of_level)`
pub type LevelTriple = (Price, Quantity, Tick);

/// Top-of-book answer for one symbol, best price first on both sides
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderBookView {
    pub symbol: Symbol,
    pub version: u64,
    pub tick: Tick,
    pub bids: Vec<LevelTriple>,
    pub asks: Vec<LevelTriple>,
}

#[derive(Debug, Clone)]
pub struct MarketFeed {
    rx: watch::Receiver<Arc<MarketSnapshot>>,
}

impl MarketFeed {
    pub fn new(rx: watch::Receiver<Arc<MarketSnapshot>>) -> Self {
        Self { rx }
    }

    /// Most recently published snapshot
    pub fn latest(&self) -> Arc<MarketSnapshot> {
        self.rx.borrow().clone()
    }

    /// Top `depth` levels per side; None for an unknown symbol
    ///
    /// Depth is capped by the depth the snapshots were published with.
    pub fn order_book(&self, symbol: &Symbol, depth: usize) -> Option<OrderBookView> {
        let snapshot = self.latest();
        let book = snapshot.book(symbol)?;
        let triples = |levels: &[matching_engine::LevelSnapshot]| -> Vec<LevelTriple> {
            levels
                .iter()
                .take(depth)
                .map(|l| (l.price, l.quantity, l.tick))
                .collect()
        };

        Some(OrderBookView {
            symbol: symbol.clone(),
            version: snapshot.version,
            tick: snapshot.tick,
            bids: triples(&book.bids),
            asks: triples(&book.asks),
        })
    }

    pub fn leaderboard(&self) -> Vec<LeaderboardEntry> {
        self.latest().leaderboard.clone()
    }

    /// Wait for the next publish; false once the simulation is gone
    pub async fn changed(&mut self) -> bool {
        self.rx.changed().await.is_ok()
    }
}
