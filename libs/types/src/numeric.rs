//! Fixed-point decimal types for prices and quantities
//!
//! Uses rust_decimal for deterministic arithmetic (no floating-point errors).
//! Prices carry two decimal places and are rounded half away from zero.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};
use std::str::FromStr;

/// Decimal places kept on every price
pub const PRICE_DP: u32 = 2;

/// Strictly positive price, fixed-point at two decimal places
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// Round to cents and wrap; None if the rounded value is not positive
    pub fn try_new(value: Decimal) -> Option<Self> {
        let rounded =
            value.round_dp_with_strategy(PRICE_DP, RoundingStrategy::MidpointAwayFromZero);
        if rounded > Decimal::ZERO {
            Some(Self(rounded))
        } else {
            None
        }
    }

    /// Whole-unit price
    ///
    /// # Panics
    /// Panics if `value` is zero
    pub fn from_u64(value: u64) -> Self {
        Self::try_new(Decimal::from(value)).expect("Price must be positive")
    }

    /// Parse from string, e.g. "101.25"
    pub fn from_str(s: &str) -> Option<Self> {
        Decimal::from_str(s).ok().and_then(Self::try_new)
    }

    /// Best-effort conversion from a float (used by the reference price model)
    pub fn from_f64(value: f64) -> Option<Self> {
        Decimal::from_f64_retain(value).and_then(Self::try_new)
    }

    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    pub fn to_f64(&self) -> f64 {
        self.0.to_f64().unwrap_or(0.0)
    }

    /// Midpoint of two prices, rounded to cents
    pub fn midpoint(a: Price, b: Price) -> Price {
        // Two positive prices always have a positive midpoint
        Self::try_new((a.0 + b.0) / Decimal::TWO).unwrap_or(a)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Non-negative quantity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quantity(Decimal);

impl Quantity {
    /// Wrap a decimal; None if negative
    pub fn try_new(value: Decimal) -> Option<Self> {
        if value >= Decimal::ZERO {
            Some(Self(value))
        } else {
            None
        }
    }

    pub fn zero() -> Self {
        Self(Decimal::ZERO)
    }

    pub fn from_u64(value: u64) -> Self {
        Self(Decimal::from(value))
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Decimal::from_str(s).ok().and_then(Self::try_new)
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    pub fn min(self, other: Quantity) -> Quantity {
        if self <= other {
            self
        } else {
            other
        }
    }

    /// Subtraction clamped at zero
    pub fn saturating_sub(self, other: Quantity) -> Quantity {
        if self.0 > other.0 {
            Self(self.0 - other.0)
        } else {
            Self::zero()
        }
    }
}

impl Add for Quantity {
    type Output = Quantity;

    fn add(self, rhs: Quantity) -> Quantity {
        Quantity(self.0 + rhs.0)
    }
}

impl Sub for Quantity {
    type Output = Quantity;

    /// # Panics
    /// Panics if the result would be negative
    fn sub(self, rhs: Quantity) -> Quantity {
        assert!(self.0 >= rhs.0, "Quantity underflow: {} - {}", self.0, rhs.0);
        Quantity(self.0 - rhs.0)
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Notional value of `quantity` at `price`
pub fn notional(price: Price, quantity: Quantity) -> Decimal {
    price.as_decimal() * quantity.as_decimal()
}
