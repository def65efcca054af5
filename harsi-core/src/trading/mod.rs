//! Trading state: positions and statistics, alert history, and the coordinator
//! that drives both from classified signals.
//!
//! State lives in owned values (`PositionManager`, `AlertLog`) that the host
//! creates and drops; the coordinator only borrows them for one call.

pub mod alerts;
pub mod positions;
pub mod strategy;

pub use alerts::{AlertLog, DEFAULT_ALERT_CAPACITY, DEFAULT_ALERT_LIMIT};
pub use positions::{PositionManager, RiskSettings};
pub use strategy::{StrategyAction, StrategyOutcome, TradingStrategy};
