//! Authoritative simulation state
//!
//! Owned by the clock and mutated only by its sequential tick pipeline.

use matching_engine::{MatchingEngine, SubmitReport};
use scoring::ScoringEngine;
use types::errors::OrderError;
use types::ids::{CompetitorId, Symbol, Tick};
use types::numeric::Price;
use types::order::OrderRequest;

use crate::config::SimulationConfig;
use crate::metrics::SimMetrics;
use crate::reference::ReferenceModel;
use crate::replay::JournalEntry;
use crate::strategy::Quote;

/// What applying one quote did
#[derive(Debug, Clone, PartialEq)]
pub enum Applied {
    Submitted(SubmitReport),
    Cancelled { removed: bool },
}

pub struct SimulationState {
    pub engine: MatchingEngine,
    pub scoring: ScoringEngine,
    pub reference: ReferenceModel,
    pub metrics: SimMetrics,
    pub journal: Vec<JournalEntry>,
    /// Next tick to run; equals the number of completed ticks
    pub tick: Tick,
}

impl SimulationState {
    pub fn new(config: &SimulationConfig) -> Self {
        let mut engine = MatchingEngine::new(config.engine_config());
        for s in &config.symbols {
            engine.add_symbol(s.symbol.clone());
        }

        Self {
            engine,
            scoring: ScoringEngine::new(config.scoring_config()),
            reference: ReferenceModel::new(&config.symbols, config.seed),
            metrics: SimMetrics::new(),
            journal: Vec::new(),
            tick: Tick::ZERO,
        }
    }

    /// Mid, else last trade, else reference price
    pub fn mark_price(&self, symbol: &Symbol) -> Option<Price> {
        self.engine
            .mid_price(symbol)
            .or_else(|| self.engine.last_trade_price(symbol))
            .or_else(|| self.reference.price(symbol))
    }

    /// Apply one quote, journal it if accepted, and update metrics
    pub fn apply(
        &mut self,
        competitor: &CompetitorId,
        quote: Quote,
    ) -> Result<Applied, OrderError> {
        let result = apply_quote(&mut self.engine, competitor, &quote);
        match &result {
            Ok(Applied::Submitted(report)) => self.metrics.record_submit(report),
            Ok(Applied::Cancelled { removed }) => self.metrics.record_cancel(*removed),
            Err(_) => self.metrics.record_rejection(),
        }
        if result.is_ok() {
            self.journal.push(JournalEntry {
                tick: self.engine.current_tick(),
                competitor: competitor.clone(),
                instruction: quote,
            });
        }
        result
    }
}

/// Apply a quote to an engine on behalf of `competitor`
pub fn apply_quote(
    engine: &mut MatchingEngine,
    competitor: &CompetitorId,
    quote: &Quote,
) -> Result<Applied, OrderError> {
    let request = match quote {
        Quote::Cancel { order_id } => {
            return Ok(Applied::Cancelled {
                removed: engine.cancel(competitor, *order_id),
            })
        }
        Quote::Limit {
            symbol,
            side,
            price,
            quantity,
        } => OrderRequest::limit(competitor.clone(), symbol.clone(), *side, *price, *quantity),
        Quote::Market {
            symbol,
            side,
            quantity,
        } => OrderRequest::market(competitor.clone(), symbol.clone(), *side, *quantity),
    };
    engine.submit(request).map(Applied::Submitted)
}
