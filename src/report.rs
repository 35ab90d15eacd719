//! Reporting of intermediate and final swap state.
//!
//! The accumulator hands a snapshot to an observer after every range and once
//! more when the estimate is complete. Observers have no say in the totals.

use crate::models::{RangeStep, SwapEstimate};

pub trait SwapObserver {
    fn on_range(&mut self, step: &RangeStep);

    fn on_complete(&mut self, _estimate: &SwapEstimate) {}
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl SwapObserver for NoopObserver {
    fn on_range(&mut self, _step: &RangeStep) {}
}

/// Adapts a closure into an observer of per-range steps.
pub struct FnObserver<F> {
    f: F,
}

impl<F: FnMut(&RangeStep)> FnObserver<F> {
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F: FnMut(&RangeStep)> SwapObserver for FnObserver<F> {
    fn on_range(&mut self, step: &RangeStep) {
        (self.f)(step)
    }
}

/// Emits one `tracing` event per range and one for the final totals.
#[derive(Debug, Clone, Default)]
pub struct TracingObserver {
    label: String,
}

impl TracingObserver {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }
}

impl SwapObserver for TracingObserver {
    fn on_range(&mut self, step: &RangeStep) {
        tracing::debug!(
            case = %self.label,
            index = step.index,
            bound = ?step.bound,
            token_in_remaining = %step.remaining_input,
            token_in_consumed = %step.input_consumed,
            token_out = %step.output,
            fee_growth_per_share = %step.fee_growth,
            sqrt_price = %step.sqrt_price_reached,
            "[RANGE] after processing range"
        );
        tracing::debug!(
            case = %self.label,
            index = step.index,
            token_in_consumed_total = %step.state.input_consumed_total,
            token_out_total = %step.state.output_total,
            fee_growth_per_share_total = %step.state.fee_growth_total,
            "[RANGE] running totals"
        );
    }

    fn on_complete(&mut self, estimate: &SwapEstimate) {
        tracing::info!(
            case = %self.label,
            ranges = estimate.ranges_processed,
            token_out_total = %estimate.output_total,
            fee_growth_per_share_total = %estimate.fee_growth_total,
            "[DONE] final results"
        );
    }
}
