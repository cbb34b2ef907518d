//! Types library for the competitive market simulation
//!
//! This library provides the core type definitions shared by the matching
//! engine, the scoring engine and the simulation harness, keeping arithmetic
//! deterministic and identifiers replayable.
//!
//! # Modules
//! - `ids`: Identifiers (CompetitorId, OrderId, TradeId, Symbol, Tick)
//! - `numeric`: Fixed-point decimal types (Price, Quantity)
//! - `order`: Order requests and resting orders
//! - `trade`: Trade execution records
//! - `competitor`: Per-competitor cash, inventory and P&L history
//! - `errors`: Error taxonomy

pub mod ids;
pub mod numeric;
pub mod order;
pub mod trade;
pub mod competitor;
pub mod errors;

// Library version constant
pub const LIB_VERSION: &str = "1.0.0";

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::ids::*;
    pub use crate::numeric::*;
    pub use crate::order::*;
    pub use crate::trade::*;
    pub use crate::competitor::*;
    pub use crate::errors::*;
}
