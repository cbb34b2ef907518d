//! Instruction journal and deterministic replay validation
//!
//! The clock journals every accepted instruction. Re-applying a journal to
//! a fresh engine built from the same setup must reproduce the same books,
//! trades and ledger: same instructions, same final state.

use matching_engine::{EngineConfig, MatchingEngine};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use types::errors::SimulationError;
use types::ids::{CompetitorId, OrderId, Symbol, Tick};

use crate::state::apply_quote;
use crate::strategy::Quote;

/// One accepted instruction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub tick: Tick,
    pub competitor: CompetitorId,
    pub instruction: Quote,
}

/// Engine configuration, symbols and competitors as they were before the
/// first instruction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplaySetup {
    pub engine: EngineConfig,
    pub symbols: Vec<Symbol>,
    /// `(id, starting_cash)` in registration order
    pub competitors: Vec<(CompetitorId, Decimal)>,
}

impl ReplaySetup {
    /// Recover the setup of an existing engine
    pub fn capture(engine: &MatchingEngine) -> Self {
        Self {
            engine: *engine.config(),
            symbols: engine.symbols().cloned().collect(),
            competitors: engine
                .ledger()
                .iter()
                .map(|c| (c.id.clone(), c.starting_cash))
                .collect(),
        }
    }

    pub fn build_engine(&self) -> MatchingEngine {
        let mut engine = MatchingEngine::new(self.engine);
        for symbol in &self.symbols {
            engine.add_symbol(symbol.clone());
        }
        for (id, cash) in &self.competitors {
            engine.register_competitor(id.clone(), *cash);
        }
        engine
    }
}

/// Comparable digest of an engine's observable state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineFingerprint {
    pub trade_count: usize,
    pub next_order_id: OrderId,
    pub books: String,
    pub trades: String,
    pub ledger: String,
}

impl EngineFingerprint {
    /// Capture a fingerprint of the engine state.
    pub fn capture(engine: &MatchingEngine) -> Self {
        let mut books = Sha256::new();
        for symbol in engine.symbols() {
            if let Some(snapshot) = engine.snapshot(symbol, usize::MAX) {
                books.update(serde_json::to_vec(&snapshot).unwrap_or_default());
            }
        }

        let mut trades = Sha256::new();
        trades.update(serde_json::to_vec(engine.trades()).unwrap_or_default());

        let mut ledger = Sha256::new();
        for c in engine.ledger().iter() {
            ledger.update(c.id.as_str().as_bytes());
            ledger.update(b"=");
            ledger.update(c.cash.to_string().as_bytes());
            for (symbol, qty) in &c.inventory {
                ledger.update(symbol.as_str().as_bytes());
                ledger.update(b":");
                ledger.update(qty.to_string().as_bytes());
            }
            ledger.update(b"|");
        }

        Self {
            trade_count: engine.trades().len(),
            next_order_id: engine.next_order_id(),
            books: format!("{:x}", books.finalize()),
            trades: format!("{:x}", trades.finalize()),
            ledger: format!("{:x}", ledger.finalize()),
        }
    }
}

/// Re-apply a journal to a fresh engine
///
/// Fails if an instruction that was accepted originally is rejected now.
pub fn replay_journal(
    setup: &ReplaySetup,
    journal: &[JournalEntry],
) -> Result<MatchingEngine, SimulationError> {
    let mut engine = setup.build_engine();
    for entry in journal {
        if entry.tick != engine.current_tick() {
            engine.begin_tick(entry.tick)?;
        }
        apply_quote(&mut engine, &entry.competitor, &entry.instruction)?;
    }
    Ok(engine)
}

/// Result of replay validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayValidation {
    pub matches: bool,
    pub original: EngineFingerprint,
    pub replayed: EngineFingerprint,
}

/// Validate replay determinism: run the journal through a fresh engine
/// and compare fingerprints.
pub fn validate_replay(
    setup: &ReplaySetup,
    journal: &[JournalEntry],
    expected: &EngineFingerprint,
) -> Result<ReplayValidation, SimulationError> {
    let replayed = EngineFingerprint::capture(&replay_journal(setup, journal)?);
    Ok(ReplayValidation {
        matches: replayed == *expected,
        original: expected.clone(),
        replayed,
    })
}

/// Export journal as JSON.
pub fn export_journal(journal: &[JournalEntry]) -> String {
    serde_json::to_string_pretty(journal).unwrap_or_default()
}

/// Import journal from JSON.
pub fn import_journal(json: &str) -> Result<Vec<JournalEntry>, serde_json::Error> {
    serde_json::from_str(json)
}
