use bigdecimal::BigDecimal;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SwapError>;

#[derive(Debug, Error)]
pub enum SwapError {
    #[error(
        "token in remaining {remaining} is negative with token in initial {initial} and token in consumed total {consumed}"
    )]
    InvariantViolation {
        remaining: BigDecimal,
        initial: BigDecimal,
        consumed: BigDecimal,
    },

    #[error("Malformed input: {0}")]
    MalformedInput(#[from] MalformedInput),

    #[error("Decimal error: {0}")]
    Decimal(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeJson(#[from] serde_json::Error),
}

/// Inputs the accumulator cannot process.
///
/// All but `EmptyTerminalRange` are detected before any range is processed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MalformedInput {
    #[error("range sequence is empty")]
    EmptyRanges,

    #[error("initial input must be positive, got {0}")]
    NonPositiveInput(BigDecimal),

    #[error("fee rate must be in [0, 1), got {0}")]
    FeeRateOutOfBounds(BigDecimal),

    #[error("range {index}: sqrt price must be positive, got {value}")]
    NonPositivePrice { index: usize, value: BigDecimal },

    #[error("range {index}: liquidity must not be negative, got {value}")]
    NegativeLiquidity { index: usize, value: BigDecimal },

    #[error("range {index}: only the last range may omit its next sqrt price")]
    MissingNextPrice { index: usize },

    #[error("range {index}: terminal range has no liquidity to absorb the remaining input")]
    EmptyTerminalRange { index: usize },

    #[error("range {index}: next sqrt price moves against the swap direction")]
    PriceAgainstDirection { index: usize },
}

/// Which estimated total diverged from its reference value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidatedField {
    TokenOut,
    FeeGrowthPerShare,
}

impl std::fmt::Display for ValidatedField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidatedField::TokenOut => f.write_str("token_out_total"),
            ValidatedField::FeeGrowthPerShare => f.write_str("fee_growth_per_share_total"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMismatch {
    pub field: ValidatedField,
    pub actual: BigDecimal,
    pub expected: BigDecimal,
    /// `actual - expected`, both taken at the comparison precision.
    pub difference: BigDecimal,
}

impl std::fmt::Display for FieldMismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: actual {} expected {} (diff {})",
            self.field, self.actual, self.expected, self.difference
        )
    }
}

/// Estimated totals differ from the reference totals.
///
/// Kept apart from [`SwapError`]: a mismatch is a finding about the inputs,
/// not a failure of the computation.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("{}", describe(.mismatches))]
pub struct ValidationMismatch {
    pub mismatches: Vec<FieldMismatch>,
}

fn describe(mismatches: &[FieldMismatch]) -> String {
    mismatches
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
