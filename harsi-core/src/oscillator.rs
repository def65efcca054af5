//! Oscillator engine — smoothed zero-centered RSI plus Heikin-Ashi RSI candles.
//!
//! `compute_oscillator` is precomputed once over the whole candle series and
//! yields one `OscillatorRow` per candle, aligned by index.

use serde::{Deserialize, Serialize};

use crate::domain::Candle;
use crate::error::ParamError;
use crate::indicators::{heikin_ashi_rsi, smooth_rsi, HaRsiBar, Indicator, PriceField, ZeroRsi};

/// Oscillator lookbacks and zone thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OscillatorParams {
    /// RSI lookback for the Heikin-Ashi candles.
    pub len_harsi: usize,
    /// Weight of the previous open in the HA open recursion.
    pub smoothing: usize,
    /// RSI lookback for the smoothed oscillator line.
    pub len_rsi: usize,
    pub upper: f64,
    pub lower: f64,
    pub upper_extreme: f64,
    pub lower_extreme: f64,
}

impl Default for OscillatorParams {
    fn default() -> Self {
        Self {
            len_harsi: 10,
            smoothing: 5,
            len_rsi: 7,
            upper: 20.0,
            lower: -20.0,
            upper_extreme: 30.0,
            lower_extreme: -30.0,
        }
    }
}

impl OscillatorParams {
    pub fn validate(&self) -> Result<(), ParamError> {
        for (name, value) in [
            ("len_harsi", self.len_harsi),
            ("smoothing", self.smoothing),
            ("len_rsi", self.len_rsi),
        ] {
            if value == 0 {
                return Err(ParamError::ZeroPeriod { name, value });
            }
        }
        if !(self.lower < self.upper) {
            return Err(ParamError::ThresholdOrder(format!(
                "lower ({}) must be below upper ({})",
                self.lower, self.upper
            )));
        }
        if !(self.lower_extreme <= self.lower) {
            return Err(ParamError::ThresholdOrder(format!(
                "lower_extreme ({}) must not exceed lower ({})",
                self.lower_extreme, self.lower
            )));
        }
        if !(self.upper_extreme >= self.upper) {
            return Err(ParamError::ThresholdOrder(format!(
                "upper_extreme ({}) must not be below upper ({})",
                self.upper_extreme, self.upper
            )));
        }
        Ok(())
    }

    /// Rows before this index never carry a defined RSI value.
    pub fn warmup_rows(&self) -> usize {
        self.len_rsi
    }
}

/// Oscillator output for one candle. Undefined values are NaN.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OscillatorRow {
    pub timestamp: i64,
    pub close: f64,
    pub rsi: f64,
    pub ha: HaRsiBar,
}

/// Compute the oscillator for every candle.
pub fn compute_oscillator(candles: &[Candle], params: &OscillatorParams) -> Vec<OscillatorRow> {
    let rsi = smooth_rsi(&ZeroRsi::new(params.len_rsi, PriceField::Close).compute(candles));
    let ha = heikin_ashi_rsi(candles, params.len_harsi, params.smoothing);

    candles
        .iter()
        .zip(rsi)
        .zip(ha)
        .map(|((candle, rsi), ha)| OscillatorRow {
            timestamp: candle.timestamp,
            close: candle.close,
            rsi,
            ha,
        })
        .collect()
}
