//! Indicator building blocks for the Heikin-Ashi RSI oscillator.
//!
//! Every indicator is a pure function from a candle series to an output series
//! of the same length. Warm-up rows are `f64::NAN` and NaN propagates: a row is
//! only defined once enough real history exists behind it.

pub mod heikin_ashi;
pub mod rsi;
pub mod smoothing;

pub use heikin_ashi::{heikin_ashi_rsi, HaRsiBar};
pub use rsi::{zero_centered_rsi, PriceField, ZeroRsi};
pub use smoothing::smooth_rsi;

use crate::domain::Candle;

/// Trait for single-series indicators.
///
/// Implementations take a full candle series and produce a series of the same
/// length. The first `lookback()` values are `f64::NAN` (warm-up).
///
/// No value at row t may depend on data from row t+1 or later.
pub trait Indicator: Send + Sync {
    /// Human-readable name (e.g., "zrsi_close_7").
    fn name(&self) -> &str;

    /// Number of leading rows that are always undefined.
    fn lookback(&self) -> usize;

    /// Compute the indicator for the entire candle series.
    fn compute(&self, candles: &[Candle]) -> Vec<f64>;
}

/// Create synthetic candles from close prices for testing.
///
/// open = prev_close (or close for the first candle),
/// high = max(open,close) + 1.0, low = min(open,close) - 1.0, one-minute spacing.
#[cfg(test)]
pub fn make_candles(closes: &[f64]) -> Vec<Candle> {
    let base_ts = 1_704_067_200_000_i64;
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Candle {
                timestamp: base_ts + i as i64 * 60_000,
                open,
                high: open.max(close) + 1.0,
                low: open.min(close) - 1.0,
                close,
                volume: 1000.0,
            }
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
