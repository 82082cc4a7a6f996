use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CreditEngineError {
    #[error("Invalid instrument: {field} — {reason}")]
    InvalidInstrument { field: String, reason: String },

    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Invalid date range: end {end} is not after start {start}")]
    InvalidDateRange { start: String, end: String },

    #[error("Convergence failure: {function} did not converge after {iterations} iterations (delta: {last_delta})")]
    ConvergenceFailure {
        function: String,
        iterations: u32,
        last_delta: Decimal,
    },

    #[error("Out of range result: {function} produced {value}, outside [{lower}, {upper}]")]
    OutOfRangeResult {
        function: String,
        value: Decimal,
        lower: Decimal,
        upper: Decimal,
    },

    #[error("Dimension mismatch in {context}: expected {expected}, got {actual}")]
    DimensionMismatch {
        context: String,
        expected: usize,
        actual: usize,
    },

    #[error("Degenerate input in {context}")]
    DegenerateInput { context: String },

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for CreditEngineError {
    fn from(e: serde_json::Error) -> Self {
        CreditEngineError::SerializationError(e.to_string())
    }
}

impl CreditEngineError {
    pub(crate) fn invalid_input(field: &str, reason: impl Into<String>) -> Self {
        CreditEngineError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_instrument(field: &str, reason: impl Into<String>) -> Self {
        CreditEngineError::InvalidInstrument {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn degenerate(context: impl Into<String>) -> Self {
        CreditEngineError::DegenerateInput {
            context: context.into(),
        }
    }

    pub(crate) fn dimension_mismatch(context: &str, expected: usize, actual: usize) -> Self {
        CreditEngineError::DimensionMismatch {
            context: context.into(),
            expected,
            actual,
        }
    }
}

pub type CreditEngineResult<T> = Result<T, CreditEngineError>;
