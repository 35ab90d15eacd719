//! Multi-range accumulation for exact-input swaps.
//!
//! Walks the ranges in order. Every range but the last is swapped through to
//! its next sqrt price; the last range is swapped through to its next sqrt
//! price only when one was given (a slippage limit), otherwise it absorbs
//! whatever input is left.

use crate::decimal::DecimalContext;
use crate::errors::{MalformedInput, Result, SwapError};
use crate::models::{RangeBound, RangeStep, SwapDirection, SwapEstimate, SwapParameters};
use crate::report::SwapObserver;
use crate::swap::math::{OneForZeroMath, RangeSwapMath, ZeroForOneMath};
use crate::swap::state::{PriceRange, SwapRunState};
use bigdecimal::BigDecimal;
use num_traits::{One, Signed, Zero};

/// Reject parameters the accumulator cannot process meaningfully.
pub fn validate_parameters(params: &SwapParameters) -> Result<()> {
    if params.ranges.is_empty() {
        return Err(MalformedInput::EmptyRanges.into());
    }
    if !params.initial_input.is_positive() {
        return Err(MalformedInput::NonPositiveInput(params.initial_input.clone()).into());
    }
    if params.fee_rate.is_negative() || params.fee_rate >= BigDecimal::one() {
        return Err(MalformedInput::FeeRateOutOfBounds(params.fee_rate.clone()).into());
    }

    let last = params.ranges.len() - 1;
    for (index, range) in params.ranges.iter().enumerate() {
        check_range(index, index == last, range, params.direction)?;
    }
    Ok(())
}

fn check_range(
    index: usize,
    is_last_range: bool,
    range: &PriceRange,
    direction: SwapDirection,
) -> Result<()> {
    if !range.sqrt_price_start.is_positive() {
        return Err(MalformedInput::NonPositivePrice {
            index,
            value: range.sqrt_price_start.clone(),
        }
        .into());
    }
    if range.liquidity.is_negative() {
        return Err(MalformedInput::NegativeLiquidity {
            index,
            value: range.liquidity.clone(),
        }
        .into());
    }
    match &range.sqrt_price_next {
        Some(next) if !next.is_positive() => Err(MalformedInput::NonPositivePrice {
            index,
            value: next.clone(),
        }
        .into()),
        Some(next) if moves_against(direction, &range.sqrt_price_start, next) => {
            Err(MalformedInput::PriceAgainstDirection { index }.into())
        }
        Some(_) => Ok(()),
        None if !is_last_range => Err(MalformedInput::MissingNextPrice { index }.into()),
        None => Ok(()),
    }
}

/// Whether going from `from` to `to` moves the sqrt price the wrong way.
fn moves_against(direction: SwapDirection, from: &BigDecimal, to: &BigDecimal) -> bool {
    match direction {
        SwapDirection::ZeroForOne => to > from,
        SwapDirection::OneForZero => to < from,
    }
}

/// Estimate totals for the swap, dispatching on its direction once.
pub fn estimate<O: SwapObserver + ?Sized>(
    ctx: &DecimalContext,
    params: &SwapParameters,
    observer: &mut O,
) -> Result<SwapEstimate> {
    validate_parameters(params)?;
    let estimate = match params.direction {
        SwapDirection::ZeroForOne => run(ctx, &ZeroForOneMath, params, observer)?,
        SwapDirection::OneForZero => run(ctx, &OneForZeroMath, params, observer)?,
    };
    observer.on_complete(&estimate);
    Ok(estimate)
}

fn run<M: RangeSwapMath, O: SwapObserver + ?Sized>(
    ctx: &DecimalContext,
    math: &M,
    params: &SwapParameters,
    observer: &mut O,
) -> Result<SwapEstimate> {
    let mut state = SwapRunState::default();
    let mut terminal_input = None;
    let last = params.ranges.len() - 1;

    for (index, range) in params.ranges.iter().enumerate() {
        let remaining_input = state.remaining_input(ctx, &params.initial_input);

        let is_last_range = index == last;
        let bounded_by_price = !is_last_range || range.is_price_bounded();

        let (bound, outcome) = if bounded_by_price {
            let sqrt_price_next = range
                .sqrt_price_next
                .as_ref()
                .ok_or(MalformedInput::MissingNextPrice { index })?;
            let outcome = math.bounded_by_price(
                ctx,
                &range.liquidity,
                &range.sqrt_price_start,
                sqrt_price_next,
                &params.fee_rate,
            )?;
            state.input_consumed_total =
                ctx.add(&state.input_consumed_total, &outcome.input_consumed);
            (RangeBound::Price, outcome)
        } else {
            if remaining_input.is_negative() {
                return Err(SwapError::InvariantViolation {
                    remaining: remaining_input,
                    initial: params.initial_input.clone(),
                    consumed: state.input_consumed_total,
                });
            }
            if range.liquidity.is_zero() {
                return Err(MalformedInput::EmptyTerminalRange { index }.into());
            }
            let outcome = math.bounded_by_input(
                ctx,
                &range.liquidity,
                &range.sqrt_price_start,
                &remaining_input,
                &params.fee_rate,
            )?;
            terminal_input = Some(remaining_input.clone());
            (RangeBound::Input, outcome)
        };

        state.output_total = ctx.add(&state.output_total, &outcome.output);
        state.fee_growth_total = ctx.add(&state.fee_growth_total, &outcome.fee_growth);

        tracing::trace!(
            index,
            ?bound,
            remaining_input = %remaining_input,
            output = %outcome.output,
            "range processed"
        );

        observer.on_range(&RangeStep {
            index,
            bound,
            remaining_input,
            input_consumed: outcome.input_consumed,
            output: outcome.output,
            fee_growth: outcome.fee_growth,
            sqrt_price_reached: outcome.sqrt_price_reached,
            state: state.clone(),
        });
    }

    Ok(SwapEstimate {
        output_total: state.output_total,
        fee_growth_total: state.fee_growth_total,
        input_consumed_total: state.input_consumed_total,
        terminal_input,
        ranges_processed: params.ranges.len(),
    })
}

/// Total token out and total fee growth per unit of liquidity.
pub fn accumulate(
    ctx: &DecimalContext,
    ranges: &[PriceRange],
    initial_input: &BigDecimal,
    fee_rate: &BigDecimal,
    direction: SwapDirection,
) -> Result<(BigDecimal, BigDecimal)> {
    let params = SwapParameters {
        ranges: ranges.to_vec(),
        initial_input: initial_input.clone(),
        fee_rate: fee_rate.clone(),
        direction,
    };
    let estimate = estimate(ctx, &params, &mut crate::report::NoopObserver)?;
    Ok((estimate.output_total, estimate.fee_growth_total))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::FnObserver;
    use std::str::FromStr;

    const L1: &str = "1517882343.751510418088349649";

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    fn range(ctx: &DecimalContext, start: u32, next: Option<u32>, liquidity: &str) -> PriceRange {
        PriceRange::from_spot_prices(
            ctx,
            &BigDecimal::from(start),
            next.map(BigDecimal::from).as_ref(),
            dec(liquidity),
        )
        .unwrap()
    }

    fn params(
        ranges: Vec<PriceRange>,
        initial_input: &str,
        fee_rate: &str,
        direction: SwapDirection,
    ) -> SwapParameters {
        SwapParameters {
            ranges,
            initial_input: dec(initial_input),
            fee_rate: dec(fee_rate),
            direction,
        }
    }

    fn assert_27_digits(ctx: &DecimalContext, actual: &BigDecimal, expected: &str) {
        assert_eq!(
            ctx.round_to(actual, 27),
            ctx.round_to(&dec(expected), 27),
            "actual {actual} expected {expected}"
        );
    }

    fn two_consecutive_zfo(ctx: &DecimalContext) -> Vec<PriceRange> {
        vec![
            range(ctx, 5000, Some(4545), L1),
            range(ctx, 4545, None, "1198735489.597250295669959397"),
        ]
    }

    fn overlapping_ofz(ctx: &DecimalContext) -> Vec<PriceRange> {
        vec![
            range(ctx, 5000, Some(5001), L1),
            range(ctx, 5001, Some(5500), "2188298432.357179145127590431"),
            range(ctx, 5500, None, "670416088.605668727039240782"),
        ]
    }

    #[test]
    fn single_range_one_for_zero() {
        let ctx = DecimalContext::default();
        let (out, fee_growth) = accumulate(
            &ctx,
            &[range(&ctx, 5000, None, L1)],
            &dec("42000000"),
            &dec("0.01"),
            SwapDirection::OneForZero,
        )
        .unwrap();

        assert_27_digits(&ctx, &out, "8312.77961614650590788243077782");
        assert_27_digits(&ctx, &fee_growth, "0.000276701288297452775064000000017");
    }

    #[test]
    fn two_consecutive_ranges_zero_for_one_without_fee() {
        let ctx = DecimalContext::default();
        let (out, fee_growth) = accumulate(
            &ctx,
            &two_consecutive_zfo(&ctx),
            &dec("2000000"),
            &dec("0.0"),
            SwapDirection::ZeroForOne,
        )
        .unwrap();

        assert_27_digits(&ctx, &out, "9103422788.67833238665194882453");
        assert!(fee_growth.is_zero());
    }

    #[test]
    fn terminal_explicit_price_is_price_bounded() {
        let ctx = DecimalContext::default();
        let mut bounds = Vec::new();
        let mut observer = FnObserver::new(|step: &RangeStep| bounds.push(step.bound));
        let estimate = estimate(
            &ctx,
            &params(
                vec![range(&ctx, 5000, Some(4994), L1)],
                "13370",
                "0.01",
                SwapDirection::ZeroForOne,
            ),
            &mut observer,
        )
        .unwrap();

        assert_eq!(bounds, vec![RangeBound::Price]);
        assert!(estimate.terminal_input.is_none());
        // consumed is what the range could absorb, not the caller's input
        assert_eq!(estimate.input_consumed_total, dec("13020.92"));
        assert_27_digits(&ctx, &estimate.output_total, "64417624.9871649525380486017974");
        assert_27_digits(
            &ctx,
            &estimate.fee_growth_total,
            "0.0000000849341192554943137172640000051",
        );
    }

    #[test]
    fn terminal_explicit_price_skips_leftover_check() {
        let ctx = DecimalContext::default();
        // range absorbs far more than the 100 provided; no error is raised
        let estimate = estimate(
            &ctx,
            &params(
                vec![range(&ctx, 5000, Some(4545), L1)],
                "100",
                "0.0",
                SwapDirection::ZeroForOne,
            ),
            &mut crate::report::NoopObserver,
        )
        .unwrap();
        assert!(estimate.input_consumed_total > dec("100"));
    }

    #[test]
    fn negative_remaining_input_is_fatal() {
        let ctx = DecimalContext::default();
        let err = accumulate(
            &ctx,
            &two_consecutive_zfo(&ctx),
            &dec("1000"),
            &dec("0.01"),
            SwapDirection::ZeroForOne,
        )
        .unwrap_err();

        match err {
            SwapError::InvariantViolation {
                remaining,
                initial,
                consumed,
            } => {
                assert!(remaining.is_negative());
                assert_eq!(initial, dec("1000"));
                assert_eq!(ctx.add(&remaining, &consumed), initial);
            }
            other => panic!("expected invariant violation, got {other:?}"),
        }
    }

    #[test]
    fn input_is_conserved_across_ranges() {
        let ctx = DecimalContext::default();
        let estimate = estimate(
            &ctx,
            &params(overlapping_ofz(&ctx), "10000000000", "0.1", SwapDirection::OneForZero),
            &mut crate::report::NoopObserver,
        )
        .unwrap();

        let terminal = estimate.terminal_input.clone().unwrap();
        assert!(terminal.is_positive());
        assert_eq!(
            ctx.add(&estimate.input_consumed_total, &terminal),
            dec("10000000000")
        );
        assert_eq!(estimate.ranges_processed, 3);
    }

    #[test]
    fn totals_never_decrease() {
        let ctx = DecimalContext::default();
        let mut states = Vec::new();
        let mut observer = FnObserver::new(|step: &RangeStep| states.push(step.state.clone()));
        estimate(
            &ctx,
            &params(overlapping_ofz(&ctx), "10000000000", "0.1", SwapDirection::OneForZero),
            &mut observer,
        )
        .unwrap();

        assert_eq!(states.len(), 3);
        for pair in states.windows(2) {
            assert!(pair[1].output_total >= pair[0].output_total);
            assert!(pair[1].fee_growth_total >= pair[0].fee_growth_total);
            assert!(pair[1].input_consumed_total >= pair[0].input_consumed_total);
        }
    }

    #[test]
    fn reordered_price_bounded_ranges_are_accepted() {
        let ctx = DecimalContext::default();
        let in_order = accumulate(
            &ctx,
            &overlapping_ofz(&ctx),
            &dec("10000000000"),
            &dec("0.1"),
            SwapDirection::OneForZero,
        )
        .unwrap();

        let mut ranges = overlapping_ofz(&ctx);
        ranges.swap(0, 1);
        let swapped = accumulate(
            &ctx,
            &ranges,
            &dec("10000000000"),
            &dec("0.1"),
            SwapDirection::OneForZero,
        )
        .unwrap();

        // each price-bounded range contributes on its own; only the terminal one depends on order
        assert_27_digits(&ctx, &swapped.0, &in_order.0.to_string());
        assert_27_digits(&ctx, &swapped.1, &in_order.1.to_string());
    }

    #[test]
    fn empty_terminal_range_does_not_hide_negative_remaining_input() {
        let ctx = DecimalContext::default();
        let ranges = vec![
            range(&ctx, 5000, Some(4545), L1),
            range(&ctx, 4545, None, "0"),
        ];

        let err = accumulate(&ctx, &ranges, &dec("1000"), &dec("0.0"), SwapDirection::ZeroForOne)
            .unwrap_err();
        assert!(matches!(err, SwapError::InvariantViolation { .. }));

        let err = accumulate(
            &ctx,
            &ranges,
            &dec("2000000"),
            &dec("0.0"),
            SwapDirection::ZeroForOne,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            SwapError::MalformedInput(MalformedInput::EmptyTerminalRange { index: 1 })
        ));
    }

    #[test]
    fn fractional_terminal_remainder_keeps_fee_growth_non_decreasing() {
        let ctx = DecimalContext::default();
        let ranges = vec![
            range(&ctx, 5000, Some(5001), L1),
            range(&ctx, 5001, None, "2188298432.357179145127590431"),
        ];

        // first range takes 10732513 before fee; the terminal one gets a fraction of a unit
        for (initial_input, fee_rate) in [("10732513.3", "0.0"), ("10839838.5", "0.01")] {
            let mut steps = Vec::new();
            let mut observer = FnObserver::new(|step: &RangeStep| steps.push(step.clone()));
            let estimate = estimate(
                &ctx,
                &params(ranges.clone(), initial_input, fee_rate, SwapDirection::OneForZero),
                &mut observer,
            )
            .unwrap();

            assert_eq!(steps.len(), 2);
            let terminal = &steps[1];
            assert_eq!(terminal.bound, RangeBound::Input);
            assert!(terminal.remaining_input < BigDecimal::one());
            assert!(!terminal.fee_growth.is_negative());
            assert!(terminal.state.fee_growth_total >= steps[0].state.fee_growth_total);
            assert!(terminal.state.output_total >= steps[0].state.output_total);
            assert!(!estimate.fee_growth_total.is_negative());
        }
    }

    #[test]
    fn open_range_before_the_last_is_rejected() {
        let ctx = DecimalContext::default();
        let mut ranges = two_consecutive_zfo(&ctx);
        ranges.reverse();
        let err = accumulate(
            &ctx,
            &ranges,
            &dec("2000000"),
            &dec("0.0"),
            SwapDirection::ZeroForOne,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            SwapError::MalformedInput(MalformedInput::MissingNextPrice { index: 0 })
        ));
    }

    #[test]
    fn price_moving_against_direction_is_rejected() {
        let ctx = DecimalContext::default();
        let err = accumulate(
            &ctx,
            &[range(&ctx, 5000, Some(5500), L1)],
            &dec("100"),
            &dec("0.0"),
            SwapDirection::ZeroForOne,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            SwapError::MalformedInput(MalformedInput::PriceAgainstDirection { index: 0 })
        ));
    }

    #[test]
    fn malformed_parameters_are_rejected_before_accumulation() {
        let ctx = DecimalContext::default();
        let ranges = vec![range(&ctx, 5000, None, L1)];

        let empty = params(Vec::new(), "100", "0.01", SwapDirection::OneForZero);
        assert!(matches!(
            validate_parameters(&empty),
            Err(SwapError::MalformedInput(MalformedInput::EmptyRanges))
        ));

        let zero_input = params(ranges.clone(), "0", "0.01", SwapDirection::OneForZero);
        assert!(matches!(
            validate_parameters(&zero_input),
            Err(SwapError::MalformedInput(MalformedInput::NonPositiveInput(_)))
        ));

        let full_fee = params(ranges.clone(), "100", "1", SwapDirection::OneForZero);
        assert!(matches!(
            validate_parameters(&full_fee),
            Err(SwapError::MalformedInput(MalformedInput::FeeRateOutOfBounds(_)))
        ));

        let negative_fee = params(ranges, "100", "-0.01", SwapDirection::OneForZero);
        assert!(matches!(
            validate_parameters(&negative_fee),
            Err(SwapError::MalformedInput(MalformedInput::FeeRateOutOfBounds(_)))
        ));

        let negative_liquidity = params(
            vec![range(&ctx, 5000, Some(5001), "-1")],
            "100",
            "0.01",
            SwapDirection::OneForZero,
        );
        assert!(matches!(
            validate_parameters(&negative_liquidity),
            Err(SwapError::MalformedInput(MalformedInput::NegativeLiquidity { index: 0, .. }))
        ));
    }

    #[test]
    fn gap_between_ranges_is_allowed() {
        let ctx = DecimalContext::default();
        let ranges = vec![
            range(&ctx, 5000, Some(5500), L1),
            range(&ctx, 5501, None, "1199528406.187413669220037261"),
        ];
        let (out, fee_growth) = accumulate(
            &ctx,
            &ranges,
            &dec("10000000000"),
            &dec("0.03"),
            SwapDirection::OneForZero,
        )
        .unwrap();
        assert_27_digits(&ctx, &out, "1772029.65201042125373125322626");
        assert_27_digits(&ctx, &fee_growth, "0.218688507759947647670339697138");
    }
}
