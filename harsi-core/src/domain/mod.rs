//! Domain types for the HARSI signal system

pub mod alert;
pub mod candle;
pub mod position;
pub mod statistics;

pub use alert::{Alert, AlertData, AlertKind};
pub use candle::{candles_are_ordered, Candle};
pub use position::{Direction, ExitReason, Position, PositionStatus};
pub use statistics::Statistics;
