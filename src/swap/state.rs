use crate::decimal::DecimalContext;
use crate::errors::Result;
use bigdecimal::BigDecimal;
use num_traits::Zero;

/// One contiguous liquidity segment the swap may traverse.
#[derive(Clone, Debug, PartialEq)]
pub struct PriceRange {
    /// sqrt price at the start of the segment.
    pub sqrt_price_start: BigDecimal,
    /// sqrt price at the end of the segment. `None` means the end is derived
    /// from whatever input remains when the swap reaches this segment.
    pub sqrt_price_next: Option<BigDecimal>,
    /// Liquidity available throughout the segment.
    pub liquidity: BigDecimal,
}

impl PriceRange {
    pub fn new(
        sqrt_price_start: BigDecimal,
        sqrt_price_next: Option<BigDecimal>,
        liquidity: BigDecimal,
    ) -> Self {
        Self {
            sqrt_price_start,
            sqrt_price_next,
            liquidity,
        }
    }

    /// Build a range from spot prices, taking their square roots in `ctx`.
    pub fn from_spot_prices(
        ctx: &DecimalContext,
        price_start: &BigDecimal,
        price_next: Option<&BigDecimal>,
        liquidity: BigDecimal,
    ) -> Result<Self> {
        let sqrt_price_start = ctx.sqrt(price_start)?;
        let sqrt_price_next = price_next.map(|p| ctx.sqrt(p)).transpose()?;
        Ok(Self::new(sqrt_price_start, sqrt_price_next, liquidity))
    }

    pub fn is_price_bounded(&self) -> bool {
        self.sqrt_price_next.is_some()
    }
}

/// Running totals threaded across ranges of a single estimation.
#[derive(Clone, Debug, PartialEq)]
pub struct SwapRunState {
    pub input_consumed_total: BigDecimal,
    pub output_total: BigDecimal,
    pub fee_growth_total: BigDecimal,
}

impl Default for SwapRunState {
    fn default() -> Self {
        Self {
            input_consumed_total: BigDecimal::zero(),
            output_total: BigDecimal::zero(),
            fee_growth_total: BigDecimal::zero(),
        }
    }
}

impl SwapRunState {
    pub fn remaining_input(&self, ctx: &DecimalContext, initial_input: &BigDecimal) -> BigDecimal {
        ctx.sub(initial_input, &self.input_consumed_total)
    }
}
