//! Reference price model
//!
//! Each symbol follows a geometric Brownian motion driven by a seeded
//! ChaCha RNG:
//!
//! `S(t+1) = S(t) * exp((mu - sigma^2 / 2) * dt + sigma * sqrt(dt) * Z)`
//!
//! It bootstraps quoting on empty books and is the last-resort mark price.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, StandardNormal};
use rust_decimal::prelude::ToPrimitive;
use std::collections::BTreeMap;
use types::ids::Symbol;
use types::numeric::Price;

use crate::config::SymbolConfig;

/// Floor applied so the path never reaches zero
const MIN_REFERENCE_PRICE: f64 = 0.01;

#[derive(Debug, Clone)]
struct PricePath {
    price: f64,
    drift: f64,
    volatility: f64,
    time_step: f64,
}

impl PricePath {
    fn step(&mut self, z: f64) {
        let dt = self.time_step;
        let drift = (self.drift - 0.5 * self.volatility * self.volatility) * dt;
        let exponent = drift + self.volatility * dt.sqrt() * z;
        self.price = (self.price * exponent.exp()).max(MIN_REFERENCE_PRICE);
    }
}

#[derive(Debug, Clone)]
pub struct ReferenceModel {
    rng: ChaCha8Rng,
    paths: BTreeMap<Symbol, PricePath>,
}

impl ReferenceModel {
    pub fn new(symbols: &[SymbolConfig], seed: u64) -> Self {
        let paths = symbols
            .iter()
            .map(|s| {
                (
                    s.symbol.clone(),
                    PricePath {
                        price: s.reference_price.to_f64().unwrap_or(MIN_REFERENCE_PRICE),
                        drift: s.drift,
                        volatility: s.volatility,
                        time_step: s.time_step,
                    },
                )
            })
            .collect();

        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            paths,
        }
    }

    /// Advance every path by one tick, in symbol order
    pub fn step(&mut self) {
        for path in self.paths.values_mut() {
            let z: f64 = StandardNormal.sample(&mut self.rng);
            path.step(z);
        }
    }

    pub fn price(&self, symbol: &Symbol) -> Option<Price> {
        self.paths.get(symbol).and_then(|p| Price::from_f64(p.price))
    }

    pub fn prices(&self) -> BTreeMap<Symbol, Price> {
        self.paths
            .iter()
            .filter_map(|(s, p)| Some((s.clone(), Price::from_f64(p.price)?)))
            .collect()
    }
}
