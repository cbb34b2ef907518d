//! Simulation clock
//!
//! Owns the simulation state and drives the tick pipeline:
//!
//! 1. collect quotes from every strategy against the pre-tick snapshot
//! 2. apply them in registration order, cancels before orders
//! 3. mark every competitor to market
//! 4. push per-tick returns into scoring
//! 5. advance the tick counter
//! 6. publish one immutable snapshot
//!
//! Lifecycle: `Idle -> Running -> (Paused <-> Running)* -> Stopped`.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};
use types::errors::SimulationError;
use types::ids::{CompetitorId, Symbol, Tick};
use types::numeric::Price;

use scoring::LeaderboardEntry;

use crate::bots::build_bots;
use crate::config::{ConfigError, SimulationConfig};
use crate::export::{build_report, RunReport};
use crate::feed::MarketFeed;
use crate::metrics::SimMetrics;
use crate::replay::{JournalEntry, ReplaySetup};
use crate::runner::StrategyRunner;
use crate::snapshot::{MarketSnapshot, SnapshotBuilder, SnapshotPublisher};
use crate::state::{Applied, SimulationState};
use crate::strategy::{CompetitorView, MarketView, Quote, Strategy};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClockState {
    Idle,
    Running,
    Paused,
    Stopped,
}

impl fmt::Display for ClockState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ClockState::Idle => "idle",
            ClockState::Running => "running",
            ClockState::Paused => "paused",
            ClockState::Stopped => "stopped",
        };
        write!(f, "{s}")
    }
}

/// Cooperative stop request, honoured at the next tick boundary
#[derive(Debug, Clone)]
pub struct StopHandle {
    requested: Arc<AtomicBool>,
}

impl StopHandle {
    pub fn stop(&self) {
        self.requested.store(true, Ordering::Release);
    }

    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::Acquire)
    }
}

/// What one `advance()` did
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickSummary {
    pub tick: Tick,
    pub orders_accepted: usize,
    pub orders_rejected: usize,
    pub cancels: usize,
    pub trades: usize,
    pub faults: usize,
    /// Clock state after the tick
    pub state: ClockState,
}

pub struct SimulationClock {
    config: SimulationConfig,
    state: SimulationState,
    runner: StrategyRunner,
    builder: SnapshotBuilder,
    publisher: SnapshotPublisher,
    lifecycle: ClockState,
    stop_requested: Arc<AtomicBool>,
}

impl SimulationClock {
    /// Build an idle clock and publish the version 0 snapshot
    pub fn new(config: SimulationConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let state = SimulationState::new(&config);
        let builder = SnapshotBuilder::new(config.snapshot_depth);
        let initial = builder.initial(&state.engine, state.reference.prices());
        let publisher = SnapshotPublisher::new(initial);
        let runner = StrategyRunner::new(config.strategy_time_budget(), config.max_quotes_per_tick);

        Ok(Self {
            config,
            state,
            runner,
            builder,
            publisher,
            lifecycle: ClockState::Idle,
            stop_requested: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Add a competitor; only while idle
    pub fn register(
        &mut self,
        id: impl Into<CompetitorId>,
        strategy: Arc<dyn Strategy>,
    ) -> Result<(), SimulationError> {
        let id = id.into();
        if self.lifecycle != ClockState::Idle {
            return Err(SimulationError::InvalidTransition {
                from: self.lifecycle.to_string(),
                to: "register".to_string(),
            });
        }
        if !self
            .state
            .engine
            .register_competitor(id.clone(), self.config.starting_cash)
        {
            return Err(SimulationError::DuplicateCompetitor(id));
        }
        self.state.scoring.register(id.clone());
        self.runner.register(id.clone(), strategy);

        info!(competitor = %id, cash = %self.config.starting_cash, "competitor registered");
        Ok(())
    }

    /// Register the configured bot population; returns how many were added
    pub fn register_bots(&mut self) -> Result<usize, SimulationError> {
        let bots = build_bots(&self.config.bots, self.config.seed);
        let count = bots.len();
        for (id, strategy) in bots {
            self.register(id, strategy)?;
        }
        Ok(count)
    }

    pub fn start(&mut self) -> Result<(), SimulationError> {
        self.transition(ClockState::Idle, ClockState::Running)
    }

    pub fn pause(&mut self) -> Result<(), SimulationError> {
        self.transition(ClockState::Running, ClockState::Paused)
    }

    pub fn resume(&mut self) -> Result<(), SimulationError> {
        self.transition(ClockState::Paused, ClockState::Running)
    }

    /// Stop immediately; idempotent
    pub fn stop(&mut self) {
        if self.lifecycle != ClockState::Stopped {
            info!(from = %self.lifecycle, tick = %self.state.tick, "clock stopped");
            self.lifecycle = ClockState::Stopped;
        }
    }

    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            requested: self.stop_requested.clone(),
        }
    }

    fn transition(&mut self, from: ClockState, to: ClockState) -> Result<(), SimulationError> {
        if self.lifecycle == ClockState::Stopped {
            return Err(SimulationError::ClockStopped {
                tick: self.state.tick,
            });
        }
        if self.lifecycle != from {
            return Err(SimulationError::InvalidTransition {
                from: self.lifecycle.to_string(),
                to: to.to_string(),
            });
        }
        info!(from = %from, to = %to, tick = %self.state.tick, "clock transition");
        self.lifecycle = to;
        Ok(())
    }

    fn honour_stop_request(&mut self) {
        if self.stop_requested.load(Ordering::Acquire) && self.lifecycle != ClockState::Stopped {
            info!(tick = %self.state.tick, "stop requested, stopping at tick boundary");
            self.lifecycle = ClockState::Stopped;
        }
    }

    /// Run one tick of the pipeline
    pub async fn advance(&mut self) -> Result<TickSummary, SimulationError> {
        self.honour_stop_request();
        match self.lifecycle {
            ClockState::Running => {}
            ClockState::Stopped => {
                return Err(SimulationError::ClockStopped {
                    tick: self.state.tick,
                })
            }
            other => {
                return Err(SimulationError::NotRunning {
                    state: other.to_string(),
                })
            }
        }

        let started = Instant::now();
        let tick = self.state.tick;
        self.state.engine.begin_tick(tick)?;

        let market = Arc::new(MarketView::new(tick, self.publisher.latest()));
        let outcomes = self.runner.collect(market, self.competitor_views()).await;

        let mut summary = TickSummary {
            tick,
            orders_accepted: 0,
            orders_rejected: 0,
            cancels: 0,
            trades: 0,
            faults: 0,
            state: self.lifecycle,
        };
        let trades_before = self.state.engine.trades().len();

        for outcome in outcomes {
            let quotes = match outcome.result {
                Ok(quotes) => quotes,
                Err(fault) => {
                    self.state.metrics.record_fault(&fault);
                    summary.faults += 1;
                    continue;
                }
            };
            let (cancels, orders): (Vec<Quote>, Vec<Quote>) =
                quotes.into_iter().partition(Quote::is_cancel);

            for quote in cancels.into_iter().chain(orders) {
                match self.state.apply(&outcome.competitor_id, quote) {
                    Ok(Applied::Submitted(_)) => summary.orders_accepted += 1,
                    Ok(Applied::Cancelled { removed }) => {
                        if removed {
                            summary.cancels += 1;
                        }
                    }
                    Err(error) => {
                        summary.orders_rejected += 1;
                        debug!(
                            competitor = %outcome.competitor_id,
                            tick = %tick,
                            error = %error,
                            "quote rejected"
                        );
                    }
                }
            }
        }
        summary.trades = self.state.engine.trades().len() - trades_before;

        self.mark_to_market(tick);
        self.state.scoring.end_tick(tick);
        self.state.reference.step();

        self.state.tick = tick.next();

        let snapshot = self.builder.build(
            self.state.tick,
            &self.state.engine,
            self.state.reference.prices(),
            self.state.scoring.leaderboard(),
        );
        self.publisher.publish(snapshot);

        self.state.metrics.record_tick(started.elapsed().as_nanos() as u64);

        if let Some(max) = self.config.max_ticks {
            if self.state.tick.value() >= max {
                info!(ticks = max, "max ticks reached");
                self.lifecycle = ClockState::Stopped;
            }
        }
        self.honour_stop_request();
        summary.state = self.lifecycle;

        debug!(
            tick = %tick,
            accepted = summary.orders_accepted,
            rejected = summary.orders_rejected,
            trades = summary.trades,
            faults = summary.faults,
            "tick complete"
        );
        Ok(summary)
    }

    /// Advance on a `tick_interval` timer until stopped or paused
    pub async fn run(&mut self) -> Result<(), SimulationError> {
        self.honour_stop_request();
        match self.lifecycle {
            ClockState::Idle => {
                return Err(SimulationError::NotRunning {
                    state: self.lifecycle.to_string(),
                })
            }
            ClockState::Stopped => {
                return Err(SimulationError::ClockStopped {
                    tick: self.state.tick,
                })
            }
            _ => {}
        }

        let period = self.config.tick_interval();
        let mut pacing = (!period.is_zero()).then(|| {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            interval
        });

        while self.lifecycle == ClockState::Running {
            match pacing.as_mut() {
                Some(interval) => {
                    interval.tick().await;
                }
                None => tokio::task::yield_now().await,
            }
            match self.advance().await {
                Ok(_) => {}
                Err(SimulationError::ClockStopped { .. }) => break,
                Err(e) => return Err(e),
            }
        }

        info!(tick = %self.state.tick, state = %self.lifecycle, "run loop finished");
        Ok(())
    }

    fn competitor_views(&self) -> HashMap<CompetitorId, CompetitorView> {
        self.state
            .engine
            .ledger()
            .iter()
            .map(|c| {
                let view = CompetitorView {
                    id: c.id.clone(),
                    cash: c.cash,
                    inventory: c.inventory.clone(),
                    equity: c.last_equity,
                    open_orders: self.state.engine.open_orders(&c.id),
                };
                (c.id.clone(), view)
            })
            .collect()
    }

    fn mark_to_market(&mut self, tick: Tick) {
        let marks: BTreeMap<Symbol, Price> = self
            .state
            .engine
            .symbols()
            .filter_map(|s| Some((s.clone(), self.state.mark_price(s)?)))
            .collect();

        for competitor in self.state.engine.ledger_mut().iter_mut() {
            let previous = competitor.last_equity;
            let equity = competitor.equity(|s| marks.get(s).copied());
            let pnl = competitor.record_pnl(tick, equity);

            let base = if previous > Decimal::ZERO {
                previous
            } else {
                competitor.starting_cash
            };
            let ret = pnl
                .checked_div(base)
                .and_then(|r| r.to_f64())
                .unwrap_or(0.0);
            self.state.scoring.record(&competitor.id, tick, ret);
        }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    pub fn clock_state(&self) -> ClockState {
        self.lifecycle
    }

    /// Next tick to run; equals the number of completed ticks
    pub fn tick(&self) -> Tick {
        self.state.tick
    }

    pub fn metrics(&self) -> &SimMetrics {
        &self.state.metrics
    }

    pub fn journal(&self) -> &[JournalEntry] {
        &self.state.journal
    }

    pub fn leaderboard(&self) -> Vec<LeaderboardEntry> {
        self.state.scoring.leaderboard()
    }

    pub fn latest_snapshot(&self) -> Arc<MarketSnapshot> {
        self.publisher.latest()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<MarketSnapshot>> {
        self.publisher.subscribe()
    }

    /// Read-only feed for dashboards and other tasks
    pub fn feed(&self) -> MarketFeed {
        MarketFeed::new(self.publisher.subscribe())
    }

    pub fn replay_setup(&self) -> ReplaySetup {
        ReplaySetup::capture(&self.state.engine)
    }

    pub fn report(&self) -> RunReport {
        build_report(&self.state)
    }
}
