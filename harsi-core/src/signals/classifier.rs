//! Row-by-row trend and reversal flags derived from oscillator output.
//!
//! Every transition flag compares row i with row i-1. Row 0 has no
//! predecessor, so all of its transition flags are false. Comparisons against
//! an undefined (NaN) value are false.

use serde::{Deserialize, Serialize};

use crate::oscillator::{OscillatorParams, OscillatorRow};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SignalRow {
    /// rsi[i] >= rsi[i-1]
    pub rsi_rising: bool,
    /// HA close above HA open on this row (not a transition).
    pub ha_bullish: bool,
    pub cross_upper: bool,
    pub cross_lower: bool,
    pub cross_upper_extreme: bool,
    pub cross_lower_extreme: bool,
    /// HA candle turned bullish on this row.
    pub harsi_bull: bool,
    /// HA candle turned bearish on this row.
    pub harsi_bear: bool,
    /// `rsi_rising` flipped false → true on this row.
    pub rsi_bull: bool,
    /// `rsi_rising` flipped true → false on this row.
    pub rsi_bear: bool,
    /// In or below the lower zone with a fresh RSI bull edge.
    pub confirmed_buy: bool,
    /// In or above the upper zone with a fresh RSI bear edge.
    pub confirmed_sell: bool,
}

/// Classify every oscillator row.
pub fn classify(rows: &[OscillatorRow], params: &OscillatorParams) -> Vec<SignalRow> {
    rows.iter()
        .scan(None::<(OscillatorRow, SignalRow)>, |prev, row| {
            let flags = classify_row(row, prev.as_ref(), params);
            *prev = Some((*row, flags));
            Some(flags)
        })
        .collect()
}

fn classify_row(
    row: &OscillatorRow,
    prev: Option<&(OscillatorRow, SignalRow)>,
    params: &OscillatorParams,
) -> SignalRow {
    let rsi = row.rsi;
    let ha_bullish = row.ha.is_bullish();

    let Some((prev_row, prev_flags)) = prev else {
        return SignalRow {
            ha_bullish,
            ..SignalRow::default()
        };
    };
    let prev_rsi = prev_row.rsi;

    let crossed_above = |level: f64| rsi > level && prev_rsi <= level;
    let crossed_below = |level: f64| rsi < level && prev_rsi >= level;

    let rsi_rising = rsi >= prev_rsi;
    let rsi_bull = rsi_rising && !prev_flags.rsi_rising;
    let rsi_bear = !rsi_rising && prev_flags.rsi_rising;

    SignalRow {
        rsi_rising,
        ha_bullish,
        cross_upper: crossed_above(params.upper),
        cross_lower: crossed_below(params.lower),
        cross_upper_extreme: crossed_above(params.upper_extreme),
        cross_lower_extreme: crossed_below(params.lower_extreme),
        harsi_bull: ha_bullish && !prev_row.ha.is_bullish(),
        harsi_bear: row.ha.is_bearish() && !prev_row.ha.is_bearish(),
        rsi_bull,
        rsi_bear,
        confirmed_buy: rsi <= params.lower && rsi_bull,
        confirmed_sell: rsi >= params.upper && rsi_bear,
    }
}
