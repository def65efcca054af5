//! Zero-centered Relative Strength Index.
//!
//! Average gain and average loss are plain rolling means over the last `period`
//! price changes (not Wilder's exponential average).
//! RSI = 100 - 100 / (1 + avg_gain / avg_loss), output RSI - 50.
//! Lookback: period (the first change needs a predecessor).
//! Edge cases: avg_loss == 0 with a gain → RSI = 100; flat window (no gain, no
//! loss) → NaN, so downstream smoothing restarts once prices move again.

use serde::{Deserialize, Serialize};

use super::Indicator;
use crate::domain::Candle;

/// Which candle price an indicator reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceField {
    High,
    Low,
    Close,
}

impl PriceField {
    pub fn extract(self, candle: &Candle) -> f64 {
        match self {
            PriceField::High => candle.high,
            PriceField::Low => candle.low,
            PriceField::Close => candle.close,
        }
    }

    fn label(self) -> &'static str {
        match self {
            PriceField::High => "high",
            PriceField::Low => "low",
            PriceField::Close => "close",
        }
    }
}

/// Zero-centered RSI over one price field.
#[derive(Debug, Clone)]
pub struct ZeroRsi {
    period: usize,
    field: PriceField,
    name: String,
}

impl ZeroRsi {
    /// A zero period is accepted and yields an all-NaN series.
    pub fn new(period: usize, field: PriceField) -> Self {
        Self {
            period,
            field,
            name: format!("zrsi_{}_{period}", field.label()),
        }
    }
}

impl Indicator for ZeroRsi {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn compute(&self, candles: &[Candle]) -> Vec<f64> {
        let values: Vec<f64> = candles.iter().map(|c| self.field.extract(c)).collect();
        zero_centered_rsi(&values, self.period)
    }
}

/// Zero-centered RSI of an arbitrary series.
///
/// Row `i` is defined when the `period` changes ending at `i` are all defined,
/// so rows `0..period` are always NaN.
pub fn zero_centered_rsi(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];

    if period == 0 || n < period + 1 {
        return result;
    }

    let changes: Vec<f64> = values.windows(2).map(|w| w[1] - w[0]).collect();

    // changes[j] is the move into row j + 1
    for i in period..n {
        let window = &changes[i - period..i];
        if window.iter().any(|ch| ch.is_nan()) {
            continue;
        }
        let gain: f64 = window.iter().filter(|&&ch| ch > 0.0).sum();
        let loss: f64 = window.iter().filter(|&&ch| ch < 0.0).map(|ch| -ch).sum();
        result[i] = compute_rsi(gain / period as f64, loss / period as f64) - 50.0;
    }

    result
}

fn compute_rsi(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 && avg_gain == 0.0 {
        f64::NAN
    } else if avg_loss == 0.0 {
        100.0
    } else {
        100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
    }
}
