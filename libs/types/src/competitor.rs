//! Per-competitor portfolio state
//!
//! Cash and inventory are mutated only by trade settlement; equity and the
//! P&L history are updated once per tick when the clock marks to market.

use crate::ids::{CompetitorId, Symbol, Tick};
use crate::numeric::{Price, Quantity};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One mark-to-market sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PnlSample {
    pub tick: Tick,
    pub equity: Decimal,
    pub pnl: Decimal,
}

/// Competitor cash, inventory and P&L history
///
/// Inventory may go negative (short selling is permitted).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompetitorState {
    pub id: CompetitorId,
    pub starting_cash: Decimal,
    pub cash: Decimal,
    pub inventory: BTreeMap<Symbol, Decimal>,
    pub last_equity: Decimal,
    pub pnl_history: Vec<PnlSample>,
}

impl CompetitorState {
    pub fn new(id: CompetitorId, starting_cash: Decimal) -> Self {
        Self {
            id,
            starting_cash,
            cash: starting_cash,
            inventory: BTreeMap::new(),
            last_equity: starting_cash,
            pnl_history: Vec::new(),
        }
    }

    /// Signed position in `symbol`
    pub fn position(&self, symbol: &Symbol) -> Decimal {
        self.inventory.get(symbol).copied().unwrap_or(Decimal::ZERO)
    }

    /// Settle the buy leg of a trade
    ///
    /// The engine bounds price and quantity, so `price * quantity` fits.
    pub fn apply_buy(&mut self, symbol: &Symbol, price: Price, quantity: Quantity) {
        self.cash -= price.as_decimal() * quantity.as_decimal();
        *self.inventory.entry(symbol.clone()).or_insert(Decimal::ZERO) += quantity.as_decimal();
    }

    /// Settle the sell leg of a trade
    pub fn apply_sell(&mut self, symbol: &Symbol, price: Price, quantity: Quantity) {
        self.cash += price.as_decimal() * quantity.as_decimal();
        *self.inventory.entry(symbol.clone()).or_insert(Decimal::ZERO) -= quantity.as_decimal();
    }

    /// Cash plus inventory valued with `mark`
    ///
    /// Positions in symbols without a mark contribute nothing. Marks are
    /// not bounded like order prices, so the valuation saturates instead
    /// of overflowing.
    pub fn equity<F>(&self, mark: F) -> Decimal
    where
        F: Fn(&Symbol) -> Option<Price>,
    {
        self.inventory.iter().fold(self.cash, |acc, (symbol, qty)| match mark(symbol) {
            Some(price) => acc.saturating_add(price.as_decimal().saturating_mul(*qty)),
            None => acc,
        })
    }

    /// Record a mark-to-market sample, returning the tick's P&L
    pub fn record_pnl(&mut self, tick: Tick, equity: Decimal) -> Decimal {
        let pnl = equity.saturating_sub(self.last_equity);
        self.pnl_history.push(PnlSample { tick, equity, pnl });
        self.last_equity = equity;
        pnl
    }

    /// Equity change since the start of the run
    pub fn total_pnl(&self) -> Decimal {
        self.last_equity.saturating_sub(self.starting_cash)
    }
}
