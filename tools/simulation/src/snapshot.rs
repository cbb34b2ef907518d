//! Per-tick market snapshots
//!
//! One immutable, versioned and checksummed snapshot is built at the end of
//! every tick and published through a `watch` channel. Readers only ever see
//! a whole snapshot, never live engine state.

use matching_engine::{BookSnapshot, MatchingEngine};
use scoring::LeaderboardEntry;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::watch;
use types::ids::{Symbol, Tick};
use types::numeric::Price;

/// Immutable view of every book at a tick boundary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    /// Monotonic publish counter; 0 is the pre-run snapshot
    pub version: u64,
    /// Ticks completed when the snapshot was taken
    pub tick: Tick,
    pub books: BTreeMap<Symbol, BookSnapshot>,
    pub last_trade_prices: BTreeMap<Symbol, Price>,
    pub reference_prices: BTreeMap<Symbol, Price>,
    pub leaderboard: Vec<LeaderboardEntry>,
    /// SHA-256 over version, tick and book levels
    pub checksum: String,
}

impl MarketSnapshot {
    /// Version 0 with no books
    pub fn empty() -> Self {
        let books = BTreeMap::new();
        let checksum = compute_checksum(0, Tick::ZERO, &books);
        Self {
            version: 0,
            tick: Tick::ZERO,
            books,
            last_trade_prices: BTreeMap::new(),
            reference_prices: BTreeMap::new(),
            leaderboard: Vec::new(),
            checksum,
        }
    }

    pub fn book(&self, symbol: &Symbol) -> Option<&BookSnapshot> {
        self.books.get(symbol)
    }
}

/// Builds versioned snapshots from engine state
pub struct SnapshotBuilder {
    version_counter: u64,
    depth: usize,
}

impl SnapshotBuilder {
    pub fn new(depth: usize) -> Self {
        Self {
            version_counter: 0,
            depth,
        }
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn current_version(&self) -> u64 {
        self.version_counter
    }

    /// Snapshot of the current engine state without bumping the version
    pub fn initial(
        &self,
        engine: &MatchingEngine,
        reference_prices: BTreeMap<Symbol, Price>,
    ) -> MarketSnapshot {
        self.assemble(self.version_counter, Tick::ZERO, engine, reference_prices, Vec::new())
    }

    /// Next versioned snapshot
    pub fn build(
        &mut self,
        tick: Tick,
        engine: &MatchingEngine,
        reference_prices: BTreeMap<Symbol, Price>,
        leaderboard: Vec<LeaderboardEntry>,
    ) -> MarketSnapshot {
        self.version_counter += 1;
        self.assemble(self.version_counter, tick, engine, reference_prices, leaderboard)
    }

    fn assemble(
        &self,
        version: u64,
        tick: Tick,
        engine: &MatchingEngine,
        reference_prices: BTreeMap<Symbol, Price>,
        leaderboard: Vec<LeaderboardEntry>,
    ) -> MarketSnapshot {
        let mut books = BTreeMap::new();
        let mut last_trade_prices = BTreeMap::new();
        for symbol in engine.symbols() {
            if let Some(book) = engine.snapshot(symbol, self.depth) {
                books.insert(symbol.clone(), book);
            }
            if let Some(price) = engine.last_trade_price(symbol) {
                last_trade_prices.insert(symbol.clone(), price);
            }
        }

        let checksum = compute_checksum(version, tick, &books);

        MarketSnapshot {
            version,
            tick,
            books,
            last_trade_prices,
            reference_prices,
            leaderboard,
            checksum,
        }
    }
}

/// Compute a SHA-256 checksum over the book levels.
///
/// Books are BTreeMap-ordered so the digest is deterministic.
fn compute_checksum(version: u64, tick: Tick, books: &BTreeMap<Symbol, BookSnapshot>) -> String {
    let mut hasher = Sha256::new();

    hasher.update(version.to_le_bytes());
    hasher.update(tick.value().to_le_bytes());

    for (symbol, book) in books {
        hasher.update(symbol.as_str().as_bytes());
        hasher.update(b"#");
        for level in &book.bids {
            hasher.update(level.price.to_string().as_bytes());
            hasher.update(b":");
            hasher.update(level.quantity.to_string().as_bytes());
            hasher.update(b"@");
            hasher.update(level.tick.value().to_le_bytes());
            hasher.update(b"|");
        }
        hasher.update(b"---");
        for level in &book.asks {
            hasher.update(level.price.to_string().as_bytes());
            hasher.update(b":");
            hasher.update(level.quantity.to_string().as_bytes());
            hasher.update(b"@");
            hasher.update(level.tick.value().to_le_bytes());
            hasher.update(b"|");
        }
        hasher.update(b"---");
    }

    format!("{:x}", hasher.finalize())
}

/// Verify that a snapshot's checksum matches its content.
pub fn verify_snapshot_integrity(snapshot: &MarketSnapshot) -> bool {
    snapshot.checksum == compute_checksum(snapshot.version, snapshot.tick, &snapshot.books)
}

/// Single-writer publisher for the latest snapshot
pub struct SnapshotPublisher {
    tx: watch::Sender<Arc<MarketSnapshot>>,
}

impl SnapshotPublisher {
    pub fn new(initial: MarketSnapshot) -> Self {
        let (tx, _rx) = watch::channel(Arc::new(initial));
        Self { tx }
    }

    /// Replace the published snapshot; succeeds with or without readers
    pub fn publish(&self, snapshot: MarketSnapshot) {
        self.tx.send_replace(Arc::new(snapshot));
    }

    pub fn latest(&self) -> Arc<MarketSnapshot> {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<MarketSnapshot>> {
        self.tx.subscribe()
    }
}
