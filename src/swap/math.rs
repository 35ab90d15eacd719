use crate::decimal::DecimalContext;
use crate::errors::{Result, SwapError};
use bigdecimal::BigDecimal;
use num_traits::{One, Zero};

/// What one range contributed to the swap.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeOutcome {
    /// Token in taken by the range, fee included for price-bounded ranges.
    pub input_consumed: BigDecimal,
    pub output: BigDecimal,
    /// Fee charged in this range per unit of liquidity.
    pub fee_growth: BigDecimal,
    pub sqrt_price_reached: BigDecimal,
}

/// Swap math within a single range of constant liquidity.
///
/// One implementation per swap direction. The accumulator picks one at call
/// entry and uses it for every range of that call.
pub trait RangeSwapMath {
    /// Swap from `sqrt_price_start` all the way to `sqrt_price_next`.
    ///
    /// Capacity-bounded: the input consumed is whatever the range can absorb,
    /// regardless of how much input the caller still holds.
    fn bounded_by_price(
        &self,
        ctx: &DecimalContext,
        liquidity: &BigDecimal,
        sqrt_price_start: &BigDecimal,
        sqrt_price_next: &BigDecimal,
        fee_rate: &BigDecimal,
    ) -> Result<RangeOutcome>;

    /// Swap `remaining_input` into the range, deriving the price reached.
    ///
    /// The whole of `remaining_input` is spent; whatever the rounded-up token
    /// in does not cover is charged as fee.
    fn bounded_by_input(
        &self,
        ctx: &DecimalContext,
        liquidity: &BigDecimal,
        sqrt_price_start: &BigDecimal,
        remaining_input: &BigDecimal,
        fee_rate: &BigDecimal,
    ) -> Result<RangeOutcome>;
}

/// token0 in, token1 out, √P decreases.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZeroForOneMath;

/// token1 in, token0 out, √P increases.
#[derive(Debug, Clone, Copy, Default)]
pub struct OneForZeroMath;

impl RangeSwapMath for ZeroForOneMath {
    fn bounded_by_price(
        &self,
        ctx: &DecimalContext,
        liquidity: &BigDecimal,
        sqrt_price_start: &BigDecimal,
        sqrt_price_next: &BigDecimal,
        fee_rate: &BigDecimal,
    ) -> Result<RangeOutcome> {
        let token_in = amount0_delta(ctx, liquidity, sqrt_price_start, sqrt_price_next)?;
        let output = amount1_delta(ctx, liquidity, sqrt_price_start, sqrt_price_next);
        charge_on_reached_target(ctx, liquidity, token_in, output, sqrt_price_next, fee_rate)
    }

    fn bounded_by_input(
        &self,
        ctx: &DecimalContext,
        liquidity: &BigDecimal,
        sqrt_price_start: &BigDecimal,
        remaining_input: &BigDecimal,
        fee_rate: &BigDecimal,
    ) -> Result<RangeOutcome> {
        require_liquidity(liquidity)?;
        let input_after_fee = input_less_fee(ctx, remaining_input, fee_rate);
        // √P' = L·√P / (L + Δx·√P)
        let sqrt_price_next = ctx.div(
            &ctx.mul(liquidity, sqrt_price_start),
            &ctx.add(liquidity, &ctx.mul(&input_after_fee, sqrt_price_start)),
        )?;
        let output = amount1_delta(ctx, liquidity, sqrt_price_start, &sqrt_price_next);
        let token_in = amount0_delta(ctx, liquidity, sqrt_price_start, &sqrt_price_next)?;
        charge_remainder(ctx, liquidity, token_in, output, sqrt_price_next, remaining_input)
    }
}

impl RangeSwapMath for OneForZeroMath {
    fn bounded_by_price(
        &self,
        ctx: &DecimalContext,
        liquidity: &BigDecimal,
        sqrt_price_start: &BigDecimal,
        sqrt_price_next: &BigDecimal,
        fee_rate: &BigDecimal,
    ) -> Result<RangeOutcome> {
        let token_in = amount1_delta_up(ctx, liquidity, sqrt_price_next, sqrt_price_start);
        let output = amount0_delta_exact(ctx, liquidity, sqrt_price_next, sqrt_price_start)?;
        charge_on_reached_target(ctx, liquidity, token_in, output, sqrt_price_next, fee_rate)
    }

    fn bounded_by_input(
        &self,
        ctx: &DecimalContext,
        liquidity: &BigDecimal,
        sqrt_price_start: &BigDecimal,
        remaining_input: &BigDecimal,
        fee_rate: &BigDecimal,
    ) -> Result<RangeOutcome> {
        require_liquidity(liquidity)?;
        let input_after_fee = input_less_fee(ctx, remaining_input, fee_rate);
        // √P' = √P + Δy / L
        let sqrt_price_next = ctx.add(sqrt_price_start, &ctx.div(&input_after_fee, liquidity)?);
        let output = amount0_delta_exact(ctx, liquidity, &sqrt_price_next, sqrt_price_start)?;
        let token_in = amount1_delta_up(ctx, liquidity, &sqrt_price_next, sqrt_price_start);
        charge_remainder(ctx, liquidity, token_in, output, sqrt_price_next, remaining_input)
    }
}

// ---------- helper functions ----------

/// ⌈L·(√Pa − √Pb) / (√Pa·√Pb)⌉ with √Pa ≥ √Pb.
fn amount0_delta(
    ctx: &DecimalContext,
    liquidity: &BigDecimal,
    sqrt_price_upper: &BigDecimal,
    sqrt_price_lower: &BigDecimal,
) -> Result<BigDecimal> {
    let exact = amount0_delta_exact(ctx, liquidity, sqrt_price_upper, sqrt_price_lower)?;
    Ok(ctx.ceil_amount(&exact))
}

fn amount0_delta_exact(
    ctx: &DecimalContext,
    liquidity: &BigDecimal,
    sqrt_price_upper: &BigDecimal,
    sqrt_price_lower: &BigDecimal,
) -> Result<BigDecimal> {
    let diff = ctx.sub(sqrt_price_upper, sqrt_price_lower);
    ctx.div(
        &ctx.mul(liquidity, &diff),
        &ctx.mul(sqrt_price_upper, sqrt_price_lower),
    )
}

/// L·(√Pa − √Pb) with √Pa ≥ √Pb.
fn amount1_delta(
    ctx: &DecimalContext,
    liquidity: &BigDecimal,
    sqrt_price_upper: &BigDecimal,
    sqrt_price_lower: &BigDecimal,
) -> BigDecimal {
    ctx.mul(liquidity, &ctx.sub(sqrt_price_upper, sqrt_price_lower))
}

fn amount1_delta_up(
    ctx: &DecimalContext,
    liquidity: &BigDecimal,
    sqrt_price_upper: &BigDecimal,
    sqrt_price_lower: &BigDecimal,
) -> BigDecimal {
    ctx.ceil_amount(&amount1_delta(
        ctx,
        liquidity,
        sqrt_price_upper,
        sqrt_price_lower,
    ))
}

fn input_less_fee(
    ctx: &DecimalContext,
    remaining_input: &BigDecimal,
    fee_rate: &BigDecimal,
) -> BigDecimal {
    ctx.mul(remaining_input, &ctx.sub(&BigDecimal::one(), fee_rate))
}

fn require_liquidity(liquidity: &BigDecimal) -> Result<()> {
    if liquidity.is_zero() {
        return Err(SwapError::Decimal(
            "cannot swap remaining input into a range without liquidity".into(),
        ));
    }
    Ok(())
}

fn fee_growth_per_share(
    ctx: &DecimalContext,
    fee: &BigDecimal,
    liquidity: &BigDecimal,
) -> Result<BigDecimal> {
    if liquidity.is_zero() {
        return Ok(BigDecimal::zero());
    }
    ctx.div(fee, liquidity)
}

/// Target price reached: the fee is charged on top of the token in.
fn charge_on_reached_target(
    ctx: &DecimalContext,
    liquidity: &BigDecimal,
    token_in: BigDecimal,
    output: BigDecimal,
    sqrt_price_next: &BigDecimal,
    fee_rate: &BigDecimal,
) -> Result<RangeOutcome> {
    let fee = ctx.mul(&token_in, fee_rate);
    Ok(RangeOutcome {
        fee_growth: fee_growth_per_share(ctx, &fee, liquidity)?,
        input_consumed: ctx.add(&token_in, &fee),
        output,
        sqrt_price_reached: sqrt_price_next.clone(),
    })
}

/// Input exhausted inside the range: everything not swapped is fee.
fn charge_remainder(
    ctx: &DecimalContext,
    liquidity: &BigDecimal,
    token_in: BigDecimal,
    output: BigDecimal,
    sqrt_price_next: BigDecimal,
    remaining_input: &BigDecimal,
) -> Result<RangeOutcome> {
    // rounding up must not take more than is left, or the fee turns negative
    let token_in = token_in.min(remaining_input.clone());
    let fee = ctx.sub(remaining_input, &token_in);
    Ok(RangeOutcome {
        fee_growth: ctx.div(&fee, liquidity)?,
        input_consumed: token_in,
        output,
        sqrt_price_reached: sqrt_price_next,
    })
}
