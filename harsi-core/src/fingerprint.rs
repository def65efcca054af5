//! Settings fingerprinting — a stable identity for the parameters that shape
//! signals and positions.
//!
//! Saved state records the hash of the settings it was produced under, so a
//! restart with different parameters can be detected.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::oscillator::OscillatorParams;
use crate::trading::RiskSettings;

/// Hex-encoded BLAKE3 hash of canonical settings JSON.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SettingsHash(pub String);

impl SettingsHash {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self(blake3::hash(bytes).to_hex().to_string())
    }
}

impl fmt::Display for SettingsHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Everything that changes what the strategy does for a given candle history.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StrategySettings {
    pub oscillator: OscillatorParams,
    pub risk: RiskSettings,
}

impl StrategySettings {
    pub fn hash(&self) -> SettingsHash {
        let o = &self.oscillator;
        // json! objects keep keys sorted
        let canonical = json!({
            "oscillator": {
                "len_rsi": o.len_rsi,
                "len_harsi": o.len_harsi,
                "smoothing": o.smoothing,
                "upper": o.upper,
                "lower": o.lower,
                "upper_extreme": o.upper_extreme,
                "lower_extreme": o.lower_extreme,
            },
            "risk": {
                "stop_loss_pct": self.risk.stop_loss_pct,
                "take_profit_pct": self.risk.take_profit_pct,
            },
        });
        SettingsHash::from_bytes(canonical.to_string().as_bytes())
    }
}
