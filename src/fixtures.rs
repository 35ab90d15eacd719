//! Reference swap cases with known-correct totals.
//!
//! Prices in fixtures are spot prices; they are turned into sqrt prices when
//! the case is built. Decimal values are kept as strings so that no digit is
//! lost before they reach the decimal context.

use crate::decimal::DecimalContext;
use crate::errors::{Result, ValidationMismatch};
use crate::models::{SwapDirection, SwapEstimate, SwapParameters};
use crate::report::SwapObserver;
use crate::swap::{PriceRange, SwapEstimator};
use crate::validation::Validator;
use bigdecimal::BigDecimal;
use serde::Deserialize;
use std::path::Path;

const BUILTIN_CASES: &str = include_str!("../fixtures/out_given_in.json");

#[derive(Debug, Clone, Deserialize)]
pub struct RangeFixture {
    pub start_price: String,
    #[serde(default)]
    pub next_price: Option<String>,
    pub liquidity: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReferenceCase {
    pub name: String,
    pub direction: SwapDirection,
    pub fee_rate: String,
    pub initial_input: String,
    pub ranges: Vec<RangeFixture>,
    pub expected_output: String,
    pub expected_fee_growth: String,
}

/// Outcome of running one reference case.
#[derive(Debug)]
pub struct CaseReport {
    pub name: String,
    pub estimate: SwapEstimate,
    pub validation: std::result::Result<(), ValidationMismatch>,
}

impl CaseReport {
    pub fn passed(&self) -> bool {
        self.validation.is_ok()
    }
}

impl ReferenceCase {
    pub fn parameters(&self, ctx: &DecimalContext) -> Result<SwapParameters> {
        let ranges = self
            .ranges
            .iter()
            .map(|r| {
                let next = r.next_price.as_deref().map(|p| ctx.parse(p)).transpose()?;
                PriceRange::from_spot_prices(
                    ctx,
                    &ctx.parse(&r.start_price)?,
                    next.as_ref(),
                    ctx.parse(&r.liquidity)?,
                )
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(SwapParameters {
            ranges,
            initial_input: ctx.parse(&self.initial_input)?,
            fee_rate: ctx.parse(&self.fee_rate)?,
            direction: self.direction,
        })
    }

    pub fn expected(&self, ctx: &DecimalContext) -> Result<(BigDecimal, BigDecimal)> {
        Ok((
            ctx.parse(&self.expected_output)?,
            ctx.parse(&self.expected_fee_growth)?,
        ))
    }

    /// Estimate the case and validate it against its expected totals.
    ///
    /// Computation errors are returned as `Err`; a mismatch is reported in
    /// the returned [`CaseReport`].
    pub fn run<O: SwapObserver + ?Sized>(
        &self,
        estimator: &SwapEstimator,
        validator: &Validator,
        observer: &mut O,
    ) -> Result<CaseReport> {
        let ctx = estimator.context();
        let params = self.parameters(ctx)?;
        let (expected_output, expected_fee_growth) = self.expected(ctx)?;
        let estimate = estimator.estimate_with_observer(&params, observer)?;
        let validation = validator.validate(
            &estimate.output_total,
            &estimate.fee_growth_total,
            &expected_output,
            &expected_fee_growth,
        );
        Ok(CaseReport {
            name: self.name.clone(),
            estimate,
            validation,
        })
    }
}

/// Parse reference cases from their JSON form.
pub fn parse_cases(json: &str) -> Result<Vec<ReferenceCase>> {
    Ok(serde_json::from_str(json)?)
}

/// The reference cases shipped with the crate.
pub fn builtin_cases() -> Result<Vec<ReferenceCase>> {
    parse_cases(BUILTIN_CASES)
}

pub fn load_cases(path: &Path) -> Result<Vec<ReferenceCase>> {
    let json = std::fs::read_to_string(path)?;
    parse_cases(&json)
}
