//! Fixed-precision decimal arithmetic on top of `BigDecimal`.
//!
//! `BigDecimal` addition, subtraction and multiplication are exact, and its
//! division and square root run at the crate-wide default precision. Swap
//! estimates have to be reproducible digit for digit, so every operation here
//! rounds its result half-even to the context precision, exactly as a decimal
//! context with a fixed number of significant digits would.

use crate::errors::{Result, SwapError};
use bigdecimal::{BigDecimal, RoundingMode};
use num_traits::{Signed, Zero};
use std::num::NonZeroU64;
use std::str::FromStr;

/// Significant digits carried through every operation by default.
pub const DEFAULT_PRECISION: u64 = 50;
/// Fractional digits token amounts are settled at before rounding up.
pub const DEFAULT_AMOUNT_SCALE: i64 = 18;
/// Lowest working precision: 27 fractional digits on totals up to `10^13`.
pub const MIN_PRECISION: u64 = 40;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecimalContext {
    precision: NonZeroU64,
    amount_scale: i64,
}

impl Default for DecimalContext {
    fn default() -> Self {
        Self {
            precision: NonZeroU64::new(DEFAULT_PRECISION).unwrap_or(NonZeroU64::MIN),
            amount_scale: DEFAULT_AMOUNT_SCALE,
        }
    }
}

impl DecimalContext {
    pub fn new(precision: u64, amount_scale: i64) -> Result<Self> {
        if precision < MIN_PRECISION {
            return Err(SwapError::Config(format!(
                "precision must be at least {MIN_PRECISION} significant digits, got {precision}"
            )));
        }
        if amount_scale < 0 {
            return Err(SwapError::Config(format!(
                "amount scale must not be negative, got {amount_scale}"
            )));
        }
        let precision = NonZeroU64::new(precision)
            .ok_or_else(|| SwapError::Config("precision must be non-zero".into()))?;
        Ok(Self {
            precision,
            amount_scale,
        })
    }

    pub fn precision(&self) -> u64 {
        self.precision.get()
    }

    pub fn amount_scale(&self) -> i64 {
        self.amount_scale
    }

    /// Parse a decimal string and round it to the context precision.
    pub fn parse(&self, s: &str) -> Result<BigDecimal> {
        let value = BigDecimal::from_str(s.trim())
            .map_err(|e| SwapError::Decimal(format!("cannot parse {s:?}: {e}")))?;
        Ok(self.round(value))
    }

    pub fn round(&self, value: BigDecimal) -> BigDecimal {
        value.with_precision_round(self.precision, RoundingMode::HalfEven)
    }

    pub fn add(&self, a: &BigDecimal, b: &BigDecimal) -> BigDecimal {
        self.round(a + b)
    }

    pub fn sub(&self, a: &BigDecimal, b: &BigDecimal) -> BigDecimal {
        self.round(a - b)
    }

    pub fn mul(&self, a: &BigDecimal, b: &BigDecimal) -> BigDecimal {
        self.round(a * b)
    }

    pub fn div(&self, a: &BigDecimal, b: &BigDecimal) -> Result<BigDecimal> {
        if b.is_zero() {
            return Err(SwapError::Decimal(format!("division of {a} by zero")));
        }
        Ok(self.round(a / b))
    }

    pub fn sqrt(&self, value: &BigDecimal) -> Result<BigDecimal> {
        if value.is_negative() {
            return Err(SwapError::Decimal(format!(
                "square root of negative value {value}"
            )));
        }
        value
            .sqrt()
            .map(|root| self.round(root))
            .ok_or_else(|| SwapError::Decimal(format!("square root of {value} failed")))
    }

    /// Round a token amount up to a whole unit.
    ///
    /// Dust below `10^-amount_scale` is settled half-even first, so an amount
    /// that is an integer up to rounding error is not charged one extra unit.
    pub fn ceil_amount(&self, value: &BigDecimal) -> BigDecimal {
        value
            .with_scale_round(self.amount_scale, RoundingMode::HalfEven)
            .with_scale_round(0, RoundingMode::Ceiling)
    }

    /// Round to `digits` significant digits, half-even. Used for comparisons.
    pub fn round_to(&self, value: &BigDecimal, digits: u64) -> BigDecimal {
        match NonZeroU64::new(digits) {
            Some(digits) => value.with_precision_round(digits, RoundingMode::HalfEven),
            None => value.clone(),
        }
    }
}
