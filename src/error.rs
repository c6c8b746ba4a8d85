//! Error type shared by every fallible operation in the crate.

use thiserror::Error;

/// Errors raised while configuring or running a solve.
///
/// The numerical core itself never fails for valid inputs; everything here is
/// rejected up front, before any integration step runs.
#[derive(Debug, Error)]
pub enum BallisticsError {
    #[error("invalid solver parameters: {0}")]
    InvalidSolverParams(String),

    #[error("invalid zero tolerance {0} m: must be positive and finite")]
    InvalidTolerance(f64),

    #[error("invalid {field}: {value} ({reason})")]
    InvalidInput {
        field: &'static str,
        value: f64,
        reason: &'static str,
    },

    #[error("invalid drag table: {0}")]
    InvalidDragTable(String),

    #[error("failed to read drag table: {0}")]
    Csv(#[from] csv::Error),

    #[error("{0}")]
    Message(String),
}

impl BallisticsError {
    pub(crate) fn invalid_input(field: &'static str, value: f64, reason: &'static str) -> Self {
        BallisticsError::InvalidInput { field, value, reason }
    }
}

impl From<String> for BallisticsError {
    fn from(msg: String) -> Self {
        BallisticsError::Message(msg)
    }
}

impl From<&str> for BallisticsError {
    fn from(msg: &str) -> Self {
        BallisticsError::Message(msg.to_string())
    }
}

/// Reject NaN, infinities and values `<= 0`.
pub(crate) fn require_positive(field: &'static str, value: f64) -> Result<(), BallisticsError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(BallisticsError::invalid_input(field, value, "must be positive and finite"))
    }
}
