//! Shared data structures used throughout the estimator.

use crate::swap::state::{PriceRange, SwapRunState};
use bigdecimal::BigDecimal;
use serde::Deserialize;

/// Direction of the swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwapDirection {
    /// token0 in → token1 out → price DOWN → √P decreases
    ZeroForOne,
    /// token1 in → token0 out → price UP → √P increases
    OneForZero,
}

impl std::fmt::Display for SwapDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SwapDirection::ZeroForOne => f.write_str("zero_for_one"),
            SwapDirection::OneForZero => f.write_str("one_for_zero"),
        }
    }
}

/// Caller-supplied description of one exact-input swap.
#[derive(Debug, Clone)]
pub struct SwapParameters {
    pub ranges: Vec<PriceRange>,
    pub initial_input: BigDecimal,
    /// Fraction of the input charged as fee, in `[0, 1)`.
    pub fee_rate: BigDecimal,
    pub direction: SwapDirection,
}

/// How a range's consumption was bounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeBound {
    /// Swapped until the range's next sqrt price was reached.
    Price,
    /// Swapped until the remaining input ran out.
    Input,
}

/// Snapshot reported to observers after each processed range.
#[derive(Debug, Clone)]
pub struct RangeStep {
    pub index: usize,
    pub bound: RangeBound,
    pub remaining_input: BigDecimal,
    pub input_consumed: BigDecimal,
    pub output: BigDecimal,
    pub fee_growth: BigDecimal,
    pub sqrt_price_reached: BigDecimal,
    pub state: SwapRunState,
}

/// Totals of a completed estimation.
#[derive(Debug, Clone, PartialEq)]
pub struct SwapEstimate {
    pub output_total: BigDecimal,
    pub fee_growth_total: BigDecimal,
    /// Input consumed by price-bounded ranges only.
    pub input_consumed_total: BigDecimal,
    /// Input handed to the terminal input-bounded range, if the swap ended in one.
    pub terminal_input: Option<BigDecimal>,
    pub ranges_processed: usize,
}
