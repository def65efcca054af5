//! Heikin-Ashi candles built from zero-centered RSI values.
//!
//! The close, high and low prices each get their own zero-centered RSI
//! (lookback `len_harsi`). High/low RSI are reconciled so high >= low, then:
//!
//! - close[i] = (rsiC[i] + rsiH[i] + rsiL[i] + rsiC[i-1]) / 4, where rsiC[i-1]
//!   falls back to rsiC[i] on the first row or when the previous value is undefined
//! - open[i]  = (rsiC[i] + rsiC[i-1]) / 2 for the first `smoothing` rows or when
//!   open[i - smoothing] is undefined, else
//!   (open[i-1] * smoothing + close[i-1]) / (smoothing + 1)
//! - high/low = max/min of reconciled RSI high/low, open and close
//!
//! The open recursion is strictly sequential.

use serde::{Deserialize, Serialize};

use super::rsi::{PriceField, ZeroRsi};
use super::Indicator;
use crate::domain::Candle;

/// One synthetic Heikin-Ashi candle in zero-centered RSI space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HaRsiBar {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl HaRsiBar {
    const UNDEFINED: HaRsiBar = HaRsiBar {
        open: f64::NAN,
        high: f64::NAN,
        low: f64::NAN,
        close: f64::NAN,
    };

    pub fn is_defined(&self) -> bool {
        !(self.open.is_nan() || self.high.is_nan() || self.low.is_nan() || self.close.is_nan())
    }

    /// Close strictly above open. Undefined bars are never bullish.
    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    /// Close strictly below open. Undefined bars are never bearish.
    pub fn is_bearish(&self) -> bool {
        self.close < self.open
    }
}

/// Compute the Heikin-Ashi RSI series for a candle sequence.
pub fn heikin_ashi_rsi(candles: &[Candle], len_harsi: usize, smoothing: usize) -> Vec<HaRsiBar> {
    let close_rsi = ZeroRsi::new(len_harsi, PriceField::Close).compute(candles);
    let high_raw = ZeroRsi::new(len_harsi, PriceField::High).compute(candles);
    let low_raw = ZeroRsi::new(len_harsi, PriceField::Low).compute(candles);

    let smoothing_f = smoothing as f64;

    (0..candles.len()).fold(Vec::with_capacity(candles.len()), |mut out, i| {
        let c = close_rsi[i];
        let high_rsi = nan_max(high_raw[i], low_raw[i]);
        let low_rsi = nan_min(high_raw[i], low_raw[i]);
        let prev_c = match i.checked_sub(1).map(|j| close_rsi[j]) {
            Some(p) if !p.is_nan() => p,
            _ => c,
        };

        let close = (c + high_rsi + low_rsi + prev_c) / 4.0;

        // With no smoothing the look-back row is the current, not yet computed one
        let seed = smoothing == 0 || i < smoothing || out[i - smoothing].open.is_nan();
        let open = if seed {
            (c + prev_c) / 2.0
        } else {
            let prev: &HaRsiBar = &out[i - 1];
            (prev.open * smoothing_f + prev.close) / (smoothing_f + 1.0)
        };

        let bar = if c.is_nan() {
            HaRsiBar::UNDEFINED
        } else {
            HaRsiBar {
                open,
                high: nan_max(high_rsi, nan_max(open, close)),
                low: nan_min(low_rsi, nan_min(open, close)),
                close,
            }
        };
        out.push(bar);
        out
    })
}

/// max() that propagates NaN instead of skipping it.
fn nan_max(a: f64, b: f64) -> f64 {
    if a.is_nan() || b.is_nan() {
        f64::NAN
    } else {
        a.max(b)
    }
}

/// min() that propagates NaN instead of skipping it.
fn nan_min(a: f64, b: f64) -> f64 {
    if a.is_nan() || b.is_nan() {
        f64::NAN
    } else {
        a.min(b)
    }
}
