//! Matching engine core
//!
//! Main coordinator for order books, trade execution and settlement.
//! Every mutation goes through `submit`, `cancel` or `begin_tick`; the
//! caller is expected to drive them from a single sequential pipeline.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info};
use types::errors::OrderError;
use types::ids::{CompetitorId, OrderId, Symbol, Tick};
use types::numeric::{Price, Quantity};
use types::order::{Order, OrderRequest, OrderType, Side};
use types::trade::Trade;

use crate::events::{SelfMatchPolicy, SubmitReport};
use crate::ledger::Ledger;
use crate::matching::MatchExecutor;
use crate::order_book::{BookSnapshot, OpenOrder, OrderBook};

/// Default ceiling for limit prices and order quantities
pub const DEFAULT_ORDER_LIMIT: u64 = 1_000_000;

/// Engine behaviour switches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub self_match_policy: SelfMatchPolicy,
    /// Reject limit bids whose notional exceeds the bidder's cash
    pub enforce_cash: bool,
    /// Highest accepted limit price
    pub max_price: Decimal,
    /// Largest accepted order quantity, market orders included
    pub max_order_quantity: Decimal,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            self_match_policy: SelfMatchPolicy::default(),
            enforce_cash: false,
            max_price: Decimal::from(DEFAULT_ORDER_LIMIT),
            max_order_quantity: Decimal::from(DEFAULT_ORDER_LIMIT),
        }
    }
}

/// Main matching engine
#[derive(Debug, Clone)]
pub struct MatchingEngine {
    config: EngineConfig,
    /// Order books per symbol
    books: BTreeMap<Symbol, OrderBook>,
    /// Trade executor with sequence generation
    executor: MatchExecutor,
    /// Append-only trade log
    trades: Vec<Trade>,
    ledger: Ledger,
    current_tick: Tick,
    next_order_id: u64,
    /// Symbol of every resting order, for cancels by id
    order_symbols: HashMap<OrderId, Symbol>,
}

impl MatchingEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            books: BTreeMap::new(),
            executor: MatchExecutor::new(1),
            trades: Vec::new(),
            ledger: Ledger::new(),
            current_tick: Tick::ZERO,
            next_order_id: 1,
            order_symbols: HashMap::new(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Open a book for `symbol`; returns false if it already exists
    pub fn add_symbol(&mut self, symbol: Symbol) -> bool {
        if self.books.contains_key(&symbol) {
            return false;
        }
        info!(symbol = %symbol, "order book opened");
        self.books.insert(symbol.clone(), OrderBook::new(symbol));
        true
    }

    pub fn symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.books.keys()
    }

    /// Register a competitor; returns false if the id is already known
    pub fn register_competitor(&mut self, id: CompetitorId, starting_cash: Decimal) -> bool {
        self.ledger.register(id, starting_cash)
    }

    /// Stamp subsequent submissions with `tick`
    pub fn begin_tick(&mut self, tick: Tick) -> Result<(), OrderError> {
        if tick < self.current_tick {
            return Err(OrderError::TickRegression {
                current: self.current_tick,
                requested: tick,
            });
        }
        self.current_tick = tick;
        Ok(())
    }

    pub fn current_tick(&self) -> Tick {
        self.current_tick
    }

    /// Validate and match an order request
    ///
    /// On error nothing in the engine has changed, including the order id
    /// counter.
    pub fn submit(&mut self, request: OrderRequest) -> Result<SubmitReport, OrderError> {
        let result = self.try_submit(request.clone());
        if let Err(e) = &result {
            debug!(
                competitor = %request.competitor_id,
                symbol = %request.symbol,
                side = %request.side,
                error = %e,
                "order rejected"
            );
        }
        result
    }

    fn try_submit(&mut self, request: OrderRequest) -> Result<SubmitReport, OrderError> {
        let order = self.validate(request)?;
        let order_id = order.order_id;
        let symbol = order.symbol.clone();

        let book = self
            .books
            .get_mut(&symbol)
            .ok_or_else(|| OrderError::UnknownSymbol {
                symbol: symbol.to_string(),
            })?;
        let report = book.submit(order, &mut self.executor, self.config.self_match_policy)?;

        // Accepted: commit the id and settle
        self.next_order_id += 1;
        for trade in &report.trades {
            self.ledger.settle(trade);
            let maker = match trade.aggressor {
                Side::Bid => trade.seller_order_id,
                Side::Ask => trade.buyer_order_id,
            };
            if !book.contains(&maker) {
                self.order_symbols.remove(&maker);
            }
        }
        for cancelled in &report.self_match_cancels {
            self.order_symbols.remove(cancelled);
        }
        if report.rested {
            self.order_symbols.insert(order_id, symbol);
        }
        self.trades.extend(report.trades.iter().cloned());

        Ok(report)
    }

    fn validate(&self, request: OrderRequest) -> Result<Order, OrderError> {
        if !self.books.contains_key(&request.symbol) {
            return Err(OrderError::UnknownSymbol {
                symbol: request.symbol.to_string(),
            });
        }
        let competitor = self
            .ledger
            .get(&request.competitor_id)
            .ok_or_else(|| OrderError::UnknownCompetitor {
                competitor_id: request.competitor_id.to_string(),
            })?;

        // Bounded quantities and prices keep every settlement product in range
        let quantity = Quantity::try_new(request.quantity)
            .filter(|q| !q.is_zero() && q.as_decimal() <= self.config.max_order_quantity)
            .ok_or_else(|| OrderError::InvalidQuantity(request.quantity.to_string()))?;

        let order_type = match request.price {
            Some(raw) => OrderType::Limit(
                Price::try_new(raw)
                    .filter(|p| p.as_decimal() <= self.config.max_price)
                    .ok_or_else(|| OrderError::InvalidPrice(raw.to_string()))?,
            ),
            None => OrderType::Market,
        };

        if let OrderType::Limit(price) = order_type {
            let required = price
                .as_decimal()
                .checked_mul(quantity.as_decimal())
                .ok_or_else(|| OrderError::InvalidQuantity(request.quantity.to_string()))?;
            if self.config.enforce_cash && request.side == Side::Bid && required > competitor.cash
            {
                return Err(OrderError::InsufficientCash {
                    required,
                    available: competitor.cash,
                });
            }
        }

        Ok(Order::new(
            OrderId::new(self.next_order_id),
            request.competitor_id,
            request.symbol,
            request.side,
            order_type,
            quantity,
            self.current_tick,
        ))
    }

    /// Cancel a resting order owned by `competitor`
    ///
    /// Unknown, already-filled and foreign orders return false.
    pub fn cancel(&mut self, competitor: &CompetitorId, order_id: OrderId) -> bool {
        let Some(symbol) = self.order_symbols.get(&order_id) else {
            return false;
        };
        let Some(book) = self.books.get_mut(symbol) else {
            return false;
        };
        if book.owner_of(&order_id) != Some(competitor) {
            return false;
        }
        let cancelled = book.cancel(&order_id, self.current_tick);
        if cancelled {
            self.order_symbols.remove(&order_id);
        }
        cancelled
    }

    pub fn book(&self, symbol: &Symbol) -> Option<&OrderBook> {
        self.books.get(symbol)
    }

    pub fn best_bid(&self, symbol: &Symbol) -> Option<Price> {
        self.books.get(symbol)?.best_bid()
    }

    pub fn best_ask(&self, symbol: &Symbol) -> Option<Price> {
        self.books.get(symbol)?.best_ask()
    }

    pub fn mid_price(&self, symbol: &Symbol) -> Option<Price> {
        self.books.get(symbol)?.mid_price()
    }

    pub fn last_trade_price(&self, symbol: &Symbol) -> Option<Price> {
        self.books.get(symbol)?.last_trade_price()
    }

    /// Get order book snapshot
    pub fn snapshot(&self, symbol: &Symbol, depth: usize) -> Option<BookSnapshot> {
        self.books.get(symbol).map(|book| book.snapshot(depth))
    }

    /// Resting orders of `competitor` across all books, in symbol order
    pub fn open_orders(&self, competitor: &CompetitorId) -> Vec<OpenOrder> {
        self.books
            .values()
            .flat_map(|book| book.orders_of(competitor))
            .collect()
    }

    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut Ledger {
        &mut self.ledger
    }

    /// Id the next accepted order will receive
    pub fn next_order_id(&self) -> OrderId {
        OrderId::new(self.next_order_id)
    }
}

impl Default for MatchingEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
