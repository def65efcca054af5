//! Alert records emitted by the strategy coordinator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::position::Position;
use super::statistics::Statistics;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertKind {
    Buy,
    Sell,
    Info,
}

impl AlertKind {
    pub fn as_str(self) -> &'static str {
        match self {
            AlertKind::Buy => "BUY",
            AlertKind::Sell => "SELL",
            AlertKind::Info => "INFO",
        }
    }
}

/// Structured payload carried with every alert.
///
/// Downstream formatters read levels and statistics from here instead of
/// re-parsing the rendered message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertData {
    pub position: Position,
    /// Statistics for the symbol at the moment the alert was raised.
    pub statistics: Statistics,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub timestamp: DateTime<Utc>,
    pub symbol: String,
    pub kind: AlertKind,
    pub message: String,
    pub data: AlertData,
}
