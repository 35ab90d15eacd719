//! Exact-input swap estimation across concentrated-liquidity price ranges.

use crate::decimal::DecimalContext;
use crate::errors::Result;
use crate::models::{SwapEstimate, SwapParameters};
use crate::report::{NoopObserver, SwapObserver};

pub mod accumulator;
pub mod math;
pub mod state;

pub use accumulator::{accumulate, validate_parameters};
pub use math::{OneForZeroMath, RangeOutcome, RangeSwapMath, ZeroForOneMath};
pub use state::{PriceRange, SwapRunState};

/// Stateless estimator bound to one decimal context.
#[derive(Debug, Clone, Copy, Default)]
pub struct SwapEstimator {
    ctx: DecimalContext,
}

impl SwapEstimator {
    pub fn new(ctx: DecimalContext) -> Self {
        Self { ctx }
    }

    pub fn context(&self) -> &DecimalContext {
        &self.ctx
    }

    pub fn estimate(&self, params: &SwapParameters) -> Result<SwapEstimate> {
        self.estimate_with_observer(params, &mut NoopObserver)
    }

    pub fn estimate_with_observer<O: SwapObserver + ?Sized>(
        &self,
        params: &SwapParameters,
        observer: &mut O,
    ) -> Result<SwapEstimate> {
        accumulator::estimate(&self.ctx, params, observer)
    }
}
