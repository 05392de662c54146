use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DealflowError {
    #[error("Invalid assumption {field}: {reason}")]
    InvalidAssumption { field: String, reason: String },

    #[error(
        "Negative equity guardrail: entry debt {entry_debt} meets or exceeds entry EV {entry_ev}; \
         adjust leverage or entry multiple"
    )]
    NegativeEquityGuardrail { entry_ev: Decimal, entry_debt: Decimal },

    #[error("Invalid input {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Division by zero in {context}")]
    DivisionByZero { context: String },

    #[error("Numeric overflow in {context}")]
    NumericOverflow { context: String },

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("CSV error: {0}")]
    CsvError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl DealflowError {
    pub(crate) fn invalid_assumption(field: &str, reason: impl Into<String>) -> Self {
        DealflowError::InvalidAssumption {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn overflow(context: impl Into<String>) -> Self {
        DealflowError::NumericOverflow {
            context: context.into(),
        }
    }
}

impl From<serde_json::Error> for DealflowError {
    fn from(e: serde_json::Error) -> Self {
        DealflowError::SerializationError(e.to_string())
    }
}

#[cfg(feature = "ingest")]
impl From<csv::Error> for DealflowError {
    fn from(e: csv::Error) -> Self {
        DealflowError::CsvError(e.to_string())
    }
}
