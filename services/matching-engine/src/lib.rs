//! Matching Engine Service
//!
//! Continuous price-time priority matching over one order book per symbol,
//! with settlement of every trade into the competitors' ledger.
//!
//! **Key Invariants:**
//! - Price-time priority strictly enforced
//! - Deterministic matching (same inputs → same outputs, same ids)
//! - No crossed book survives a submission
//! - Rejected submissions leave no trace in engine state
//! - Conservation of inventory (every trade is +q buyer, -q seller)

pub mod book;
pub mod matching;
pub mod order_book;
pub mod ledger;
pub mod engine;
pub mod events;

pub use engine::{EngineConfig, MatchingEngine, DEFAULT_ORDER_LIMIT};
pub use events::{SelfMatchPolicy, SubmitReport, SubmitStatus};
pub use ledger::Ledger;
pub use order_book::{BookSnapshot, LevelSnapshot, OpenOrder, OrderBook};
