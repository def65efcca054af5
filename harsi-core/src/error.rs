//! Error types for the core crate.
//!
//! Nothing here is fatal: every error is returned to the caller as a value.

use thiserror::Error;

/// Invalid indicator or risk parameters.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParamError {
    #[error("{name} must be >= 1 (got {value})")]
    ZeroPeriod { name: &'static str, value: usize },

    #[error("threshold ordering violated: {0}")]
    ThresholdOrder(String),

    #[error("{name} must be a positive finite percentage (got {value})")]
    InvalidPercent { name: &'static str, value: f64 },
}

/// Errors from position and alert bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TradingError {
    #[error("position not found for '{0}'")]
    PositionNotFound(String),

    #[error("no open position for '{0}'")]
    NoOpenPosition(String),
}
