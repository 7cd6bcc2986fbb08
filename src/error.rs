//! Error type shared by the calculation engine and its loaders

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CalculatorError {
    /// Missing or inconsistent input data. The orchestrator checks preconditions
    /// before running a strategy, so a normal run reports this as an incomplete
    /// calculation instead of failing.
    #[error("input error: {0}")]
    Input(String),

    /// A strategy or row formula broke a ledger invariant. Never swallowed.
    #[error("internal consistency error in calculation {calculation_id} ({strategy}): {detail}")]
    InternalConsistency {
        calculation_id: u64,
        strategy: &'static str,
        detail: String,
    },

    #[error("calculation {0} not found")]
    NotFound(u64),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("parse error: {0}")]
    Parse(String),
}

impl CalculatorError {
    /// Consistency error raised below the orchestrator, before the calculation
    /// and strategy are known. See [`CalculatorError::in_calculation`].
    pub(crate) fn consistency(detail: impl Into<String>) -> Self {
        CalculatorError::InternalConsistency {
            calculation_id: 0,
            strategy: "unknown",
            detail: detail.into(),
        }
    }

    /// Attach calculation id and strategy name to a consistency error
    pub(crate) fn in_calculation(self, id: u64, strategy_name: &'static str) -> Self {
        match self {
            CalculatorError::InternalConsistency { detail, .. } => {
                CalculatorError::InternalConsistency {
                    calculation_id: id,
                    strategy: strategy_name,
                    detail,
                }
            }
            other => other,
        }
    }

    pub fn is_internal(&self) -> bool {
        matches!(self, CalculatorError::InternalConsistency { .. })
    }
}

pub type Result<T> = std::result::Result<T, CalculatorError>;
