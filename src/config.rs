//! Configuration loader and estimator settings.

use crate::decimal::{DEFAULT_AMOUNT_SCALE, DEFAULT_PRECISION, DecimalContext};
use crate::errors::{Result, SwapError};
use crate::validation::{DEFAULT_VALIDATION_DIGITS, Validator};
use std::path::PathBuf;
use std::str::FromStr;

/// Consolidated estimator configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EstimatorConfig {
    /// Significant digits carried through every decimal operation.
    pub precision: u64,
    /// Fractional digits token amounts are settled at before rounding up.
    pub amount_scale: i64,
    /// Significant digits compared by the validator.
    pub validation_digits: u64,
    /// Reference cases to run instead of the built-in set.
    pub fixtures_path: Option<PathBuf>,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            precision: DEFAULT_PRECISION,
            amount_scale: DEFAULT_AMOUNT_SCALE,
            validation_digits: DEFAULT_VALIDATION_DIGITS,
            fixtures_path: None,
        }
    }
}

impl EstimatorConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from any key lookup; `load` uses the environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();
        let config = Self {
            precision: parse_var(&lookup, "CL_SWAP_PRECISION", defaults.precision)?,
            amount_scale: parse_var(&lookup, "CL_SWAP_AMOUNT_SCALE", defaults.amount_scale)?,
            validation_digits: parse_var(
                &lookup,
                "CL_SWAP_VALIDATION_DIGITS",
                defaults.validation_digits,
            )?,
            fixtures_path: lookup("CL_SWAP_FIXTURES")
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
        };
        config.check()?;
        Ok(config)
    }

    fn check(&self) -> Result<()> {
        if self.validation_digits == 0 || self.validation_digits > self.precision {
            return Err(SwapError::Config(format!(
                "validation digits must be in 1..={}, got {}",
                self.precision, self.validation_digits
            )));
        }
        self.context().map(|_| ())
    }

    pub fn context(&self) -> Result<DecimalContext> {
        DecimalContext::new(self.precision, self.amount_scale)
    }

    pub fn validator(&self) -> Result<Validator> {
        Ok(Validator::new(self.context()?, self.validation_digits))
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|e| SwapError::Config(format!("{key}={raw:?}: {e}"))),
        _ => Ok(default),
    }
}
