//! Settlement ledger
//!
//! Holds every competitor's `CompetitorState` in registration order and
//! applies trades to cash and inventory.

use rust_decimal::Decimal;
use std::collections::HashMap;
use types::competitor::CompetitorState;
use types::ids::{CompetitorId, Symbol};
use types::trade::Trade;

#[derive(Debug, Clone, Default)]
pub struct Ledger {
    competitors: Vec<CompetitorState>,
    index: HashMap<CompetitorId, usize>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a competitor; returns false if the id is already known
    pub fn register(&mut self, id: CompetitorId, starting_cash: Decimal) -> bool {
        if self.index.contains_key(&id) {
            return false;
        }
        self.index.insert(id.clone(), self.competitors.len());
        self.competitors.push(CompetitorState::new(id, starting_cash));
        true
    }

    pub fn contains(&self, id: &CompetitorId) -> bool {
        self.index.contains_key(id)
    }

    pub fn get(&self, id: &CompetitorId) -> Option<&CompetitorState> {
        self.index.get(id).map(|&i| &self.competitors[i])
    }

    pub fn get_mut(&mut self, id: &CompetitorId) -> Option<&mut CompetitorState> {
        let i = *self.index.get(id)?;
        self.competitors.get_mut(i)
    }

    /// Competitors in registration order
    pub fn iter(&self) -> impl Iterator<Item = &CompetitorState> {
        self.competitors.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut CompetitorState> {
        self.competitors.iter_mut()
    }

    pub fn ids(&self) -> Vec<CompetitorId> {
        self.competitors.iter().map(|c| c.id.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.competitors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.competitors.is_empty()
    }

    /// Apply both legs of a trade
    ///
    /// Unknown participants are skipped; the engine only matches orders from
    /// registered competitors.
    pub fn settle(&mut self, trade: &Trade) {
        if let Some(buyer) = self.get_mut(&trade.buyer_id) {
            buyer.apply_buy(&trade.symbol, trade.price, trade.quantity);
        }
        if let Some(seller) = self.get_mut(&trade.seller_id) {
            seller.apply_sell(&trade.symbol, trade.price, trade.quantity);
        }
    }

    /// Sum of signed positions across all competitors
    pub fn net_position(&self, symbol: &Symbol) -> Decimal {
        self.competitors.iter().map(|c| c.position(symbol)).sum()
    }

    /// Sum of cash across all competitors
    pub fn total_cash(&self) -> Decimal {
        self.competitors.iter().map(|c| c.cash).sum()
    }
}
