use anyhow::{Result, bail};
use cl_swap_estimator::{
    config::EstimatorConfig,
    fixtures,
    report::TracingObserver,
    swap::SwapEstimator,
    utils,
};

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    utils::init_logging();

    let config = EstimatorConfig::load()?;
    let estimator = SwapEstimator::new(config.context()?);
    let validator = config.validator()?;

    let cases = match &config.fixtures_path {
        Some(path) => fixtures::load_cases(path)?,
        None => fixtures::builtin_cases()?,
    };
    let ctx = estimator.context();
    tracing::info!(
        cases = cases.len(),
        precision = ctx.precision(),
        amount_scale = ctx.amount_scale(),
        validation_digits = validator.digits(),
        source = ?config.fixtures_path,
        "[INIT] running out given in reference cases"
    );

    let mut failed = 0usize;
    for case in &cases {
        let mut observer = TracingObserver::new(case.name.as_str());
        match case.run(&estimator, &validator, &mut observer) {
            Ok(report) => match &report.validation {
                Ok(()) => tracing::info!(
                    case = %report.name,
                    direction = %case.direction,
                    token_out_total = %report.estimate.output_total,
                    "[PASS] matches reference"
                ),
                Err(mismatch) => {
                    failed += 1;
                    tracing::error!(case = %report.name, %mismatch, "[FAIL] reference mismatch");
                }
            },
            Err(e) => {
                failed += 1;
                tracing::error!(case = %case.name, error = %e, "[FAIL] estimation error");
            }
        }
    }

    if failed > 0 {
        bail!("{failed} of {} reference cases failed", cases.len());
    }
    tracing::info!(cases = cases.len(), "[DONE] all reference cases passed");
    Ok(())
}
