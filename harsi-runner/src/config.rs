//! Monitor configuration loaded from TOML.
//!
//! Every section is optional; missing keys fall back to defaults:
//!
//! ```toml
//! [monitor]
//! symbols = ["BTC/USDT", "ETH/USDT"]
//! timeframe = "15m"
//! interval_secs = 60
//! history = 100
//! data_dir = "data"
//!
//! [oscillator]
//! len_rsi = 7
//!
//! [risk]
//! stop_loss_pct = 2.0
//! take_profit_pct = 3.0
//!
//! [alerts]
//! capacity = 100
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use harsi_core::fingerprint::{SettingsHash, StrategySettings};
use harsi_core::oscillator::OscillatorParams;
use harsi_core::trading::{RiskSettings, DEFAULT_ALERT_CAPACITY};
use harsi_core::ParamError;

/// Errors from loading or validating a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid [oscillator] section: {0}")]
    Oscillator(#[source] ParamError),

    #[error("invalid [risk] section: {0}")]
    Risk(#[source] ParamError),

    #[error("invalid [monitor] section: {0}")]
    Monitor(String),

    #[error("invalid [alerts] section: capacity must be >= 1")]
    AlertCapacity,
}

/// Symbols watched when the config names none.
pub const DEFAULT_SYMBOLS: &[&str] = &[
    "BTC/USDT", "ETH/USDT", "BNB/USDT", "SOL/USDT", "XRP/USDT", "ADA/USDT", "DOGE/USDT",
    "MATIC/USDT", "DOT/USDT", "AVAX/USDT", "LINK/USDT", "UNI/USDT", "ATOM/USDT", "LTC/USDT",
    "ETC/USDT", "NEAR/USDT", "APT/USDT", "ARB/USDT", "OP/USDT", "SUI/USDT",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorSection {
    pub symbols: Vec<String>,
    pub timeframe: String,
    /// Pause between evaluation cycles.
    pub interval_secs: u64,
    /// Most recent candles evaluated per symbol per cycle.
    pub history: usize,
    /// Directory holding one `<BASE>-<QUOTE>.csv` file per symbol.
    pub data_dir: PathBuf,
}

impl Default for MonitorSection {
    fn default() -> Self {
        Self {
            symbols: DEFAULT_SYMBOLS.iter().map(|s| s.to_string()).collect(),
            timeframe: "15m".into(),
            interval_secs: 60,
            history: 100,
            data_dir: PathBuf::from("data"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertSection {
    pub capacity: usize,
}

impl Default for AlertSection {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_ALERT_CAPACITY,
        }
    }
}

/// Complete monitor configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    pub monitor: MonitorSection,
    pub oscillator: OscillatorParams,
    pub risk: RiskSettings,
    pub alerts: AlertSection,
}

impl MonitorConfig {
    /// Parse and validate a configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: MonitorConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a configuration file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.oscillator.validate().map_err(ConfigError::Oscillator)?;
        self.risk.validate().map_err(ConfigError::Risk)?;

        if self.monitor.symbols.is_empty() {
            return Err(ConfigError::Monitor("symbols must not be empty".into()));
        }
        if let Some(bad) = self.monitor.symbols.iter().find(|s| s.trim().is_empty()) {
            return Err(ConfigError::Monitor(format!("blank symbol {bad:?}")));
        }
        if self.monitor.history == 0 {
            return Err(ConfigError::Monitor("history must be >= 1".into()));
        }
        if self.alerts.capacity == 0 {
            return Err(ConfigError::AlertCapacity);
        }
        Ok(())
    }

    /// The parameters that shape signals and positions.
    pub fn settings(&self) -> StrategySettings {
        StrategySettings {
            oscillator: self.oscillator,
            risk: self.risk,
        }
    }

    /// Hash of the strategy settings, stamped into snapshots.
    pub fn fingerprint(&self) -> SettingsHash {
        self.settings().hash()
    }
}
