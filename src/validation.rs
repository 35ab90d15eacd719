//! Comparison of estimated totals against reference totals.
//!
//! [`Validator::exact`] compares at the full working precision, so any
//! difference is a mismatch. The shipped reference totals were produced by a
//! 30-significant-digit binary floating point engine whose last digits carry
//! its own rounding error (up to a few hundred units in the 30th digit), so
//! they are checked at [`DEFAULT_VALIDATION_DIGITS`] instead.

use crate::decimal::DecimalContext;
use crate::errors::{FieldMismatch, ValidatedField, ValidationMismatch};
use bigdecimal::BigDecimal;

/// Significant digits the reference totals are compared at.
pub const DEFAULT_VALIDATION_DIGITS: u64 = 27;

#[derive(Debug, Clone, Copy)]
pub struct Validator {
    ctx: DecimalContext,
    digits: u64,
}

impl Validator {
    /// Compare both sides rounded half-even to `digits` significant digits.
    pub fn new(ctx: DecimalContext, digits: u64) -> Self {
        Self { ctx, digits }
    }

    /// Tolerance 0: compare at the context's full precision.
    pub fn exact(ctx: DecimalContext) -> Self {
        Self::new(ctx, ctx.precision())
    }

    /// Compare at the precision the shipped reference totals are good to.
    pub fn reference(ctx: DecimalContext) -> Self {
        Self::new(ctx, DEFAULT_VALIDATION_DIGITS)
    }

    pub fn digits(&self) -> u64 {
        self.digits
    }

    /// Check both totals; every diverging one is reported.
    pub fn validate(
        &self,
        actual_output: &BigDecimal,
        actual_fee_growth: &BigDecimal,
        expected_output: &BigDecimal,
        expected_fee_growth: &BigDecimal,
    ) -> Result<(), ValidationMismatch> {
        let mismatches: Vec<FieldMismatch> = [
            (ValidatedField::TokenOut, actual_output, expected_output),
            (
                ValidatedField::FeeGrowthPerShare,
                actual_fee_growth,
                expected_fee_growth,
            ),
        ]
        .into_iter()
        .filter_map(|(field, actual, expected)| self.compare(field, actual, expected))
        .collect();

        if mismatches.is_empty() {
            Ok(())
        } else {
            Err(ValidationMismatch { mismatches })
        }
    }

    fn compare(
        &self,
        field: ValidatedField,
        actual: &BigDecimal,
        expected: &BigDecimal,
    ) -> Option<FieldMismatch> {
        let actual = self.ctx.round_to(actual, self.digits);
        let expected = self.ctx.round_to(expected, self.digits);
        if actual == expected {
            return None;
        }
        Some(FieldMismatch {
            field,
            difference: self.ctx.sub(&actual, &expected),
            actual,
            expected,
        })
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::exact(DecimalContext::default())
    }
}
