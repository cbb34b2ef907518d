//! Strategy runner
//!
//! Invokes every registered strategy once per tick, in parallel, on tokio's
//! blocking pool. Each invocation is bounded by the time budget; panics,
//! time-outs and oversized quote sets come back as `StrategyFault` values
//! and never reach the engine.

use futures::future::join_all;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::warn;
use types::errors::StrategyFault;
use types::ids::CompetitorId;

use crate::strategy::{CompetitorView, MarketView, Quote, Strategy};

/// Result of one strategy invocation
#[derive(Debug, Clone)]
pub struct StrategyOutcome {
    pub competitor_id: CompetitorId,
    pub result: Result<Vec<Quote>, StrategyFault>,
    pub elapsed: Duration,
}

impl StrategyOutcome {
    /// Quotes to apply; empty on fault
    pub fn quotes(&self) -> &[Quote] {
        match &self.result {
            Ok(quotes) => quotes,
            Err(_) => &[],
        }
    }
}

struct Slot {
    id: CompetitorId,
    strategy: Arc<dyn Strategy>,
    /// Set while an invocation is on the blocking pool
    busy: Arc<AtomicBool>,
}

/// Clears the busy flag when the invocation finishes, even by panic
struct BusyGuard(Arc<AtomicBool>);

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct StrategyRunner {
    slots: Vec<Slot>,
    budget: Duration,
    max_quotes: usize,
}

impl StrategyRunner {
    pub fn new(budget: Duration, max_quotes: usize) -> Self {
        Self {
            slots: Vec::new(),
            budget,
            max_quotes,
        }
    }

    /// Add a strategy; returns false if the id is taken
    pub fn register(&mut self, id: CompetitorId, strategy: Arc<dyn Strategy>) -> bool {
        if self.slots.iter().any(|s| s.id == id) {
            return false;
        }
        self.slots.push(Slot {
            id,
            strategy,
            busy: Arc::new(AtomicBool::new(false)),
        });
        true
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn budget(&self) -> Duration {
        self.budget
    }

    /// Run every strategy against the same market view
    ///
    /// Outcomes come back in registration order. Strategies without a
    /// matching entry in `views` are skipped.
    pub async fn collect(
        &self,
        market: Arc<MarketView>,
        mut views: HashMap<CompetitorId, CompetitorView>,
    ) -> Vec<StrategyOutcome> {
        let invocations = self.slots.iter().filter_map(|slot| {
            let own = views.remove(&slot.id)?;
            Some(self.invoke(slot, market.clone(), own))
        });
        join_all(invocations).await
    }

    async fn invoke(
        &self,
        slot: &Slot,
        market: Arc<MarketView>,
        own: CompetitorView,
    ) -> StrategyOutcome {
        let started = Instant::now();
        let result = self.run_bounded(slot, market, own).await;

        if let Err(fault) = &result {
            warn!(
                competitor = %slot.id,
                kind = fault.kind(),
                error = %fault,
                "strategy fault, no quotes this tick"
            );
        }

        StrategyOutcome {
            competitor_id: slot.id.clone(),
            result,
            elapsed: started.elapsed(),
        }
    }

    async fn run_bounded(
        &self,
        slot: &Slot,
        market: Arc<MarketView>,
        own: CompetitorView,
    ) -> Result<Vec<Quote>, StrategyFault> {
        if slot.busy.swap(true, Ordering::AcqRel) {
            return Err(StrategyFault::StillRunning);
        }
        let guard = BusyGuard(slot.busy.clone());
        let strategy = slot.strategy.clone();

        let handle = tokio::task::spawn_blocking(move || {
            let _guard = guard;
            strategy.quote(&market, &own)
        });

        let quotes = match tokio::time::timeout(self.budget, handle).await {
            Ok(Ok(quotes)) => quotes,
            Ok(Err(join_error)) => {
                return Err(StrategyFault::Panicked {
                    message: panic_message(join_error),
                })
            }
            Err(_) => return Err(StrategyFault::Timeout { budget: self.budget }),
        };

        if quotes.len() > self.max_quotes {
            return Err(StrategyFault::TooManyQuotes {
                count: quotes.len(),
                limit: self.max_quotes,
            });
        }
        Ok(quotes)
    }
}

fn panic_message(error: tokio::task::JoinError) -> String {
    if !error.is_panic() {
        return error.to_string();
    }
    let payload = error.into_panic();
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
