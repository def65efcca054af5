//! Candle loading for the runner.
//!
//! Candles come from one CSV file per symbol under the configured data
//! directory, or from a seeded random walk when no real data is wanted:
//!
//! ```text
//! timestamp,open,high,low,close,volume
//! 1704067200000,42000.5,42110.0,41950.0,42080.1,12.5
//! 2024-01-01T00:15:00Z,42080.1,42200.0,42010.0,42150.0,9.1
//! ```
//!
//! Timestamps are epoch milliseconds or RFC 3339. They must be strictly
//! increasing; the oscillator assumes an ordered, gap-free series.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::DateTime;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;
use thiserror::Error;

use harsi_core::domain::Candle;

/// Errors from the candle loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("read candle file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse candle file '{path}': {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("'{path}' row {row}: unrecognised timestamp {value:?}")]
    Timestamp {
        path: PathBuf,
        row: usize,
        value: String,
    },

    #[error("'{path}' row {row}: timestamps must be strictly increasing")]
    Unordered { path: PathBuf, row: usize },

    #[error("'{path}' holds no candles")]
    Empty { path: PathBuf },
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    timestamp: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

/// `BTC-USDT` → `BTC/USDT`, the form used in URLs and file names.
pub fn normalize_symbol(symbol: &str) -> String {
    symbol.trim().replace('-', "/")
}

/// CSV path for a symbol: `<data_dir>/BTC-USDT.csv` for `BTC/USDT`.
pub fn candle_path(data_dir: &Path, symbol: &str) -> PathBuf {
    data_dir.join(format!("{}.csv", symbol.replace('/', "-")))
}

/// Load a symbol's candles, keeping only the most recent `history`.
pub fn load_symbol(data_dir: &Path, symbol: &str, history: usize) -> Result<Vec<Candle>, LoadError> {
    let mut candles = load_csv(&candle_path(data_dir, symbol))?;
    let excess = candles.len().saturating_sub(history);
    candles.drain(..excess);
    Ok(candles)
}

/// Load every candle from a CSV file.
pub fn load_csv(path: &Path) -> Result<Vec<Candle>, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    read_candles(file, path)
}

/// Parse candles from any CSV source. `path` is only used in error messages.
pub fn read_candles<R: Read>(reader: R, path: &Path) -> Result<Vec<Candle>, LoadError> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut candles: Vec<Candle> = Vec::new();

    for (i, record) in rdr.deserialize::<CsvRow>().enumerate() {
        // 1-based, counting the header line
        let row = i + 2;
        let record = record.map_err(|source| LoadError::Csv {
            path: path.to_path_buf(),
            source,
        })?;
        let timestamp = parse_timestamp(&record.timestamp).ok_or_else(|| LoadError::Timestamp {
            path: path.to_path_buf(),
            row,
            value: record.timestamp.clone(),
        })?;
        if candles.last().is_some_and(|prev| prev.timestamp >= timestamp) {
            return Err(LoadError::Unordered {
                path: path.to_path_buf(),
                row,
            });
        }
        candles.push(Candle::new(
            timestamp,
            record.open,
            record.high,
            record.low,
            record.close,
            record.volume,
        ));
    }

    if candles.is_empty() {
        return Err(LoadError::Empty {
            path: path.to_path_buf(),
        });
    }
    Ok(candles)
}

/// Epoch milliseconds or an RFC 3339 date-time.
fn parse_timestamp(value: &str) -> Option<i64> {
    value.parse::<i64>().ok().or_else(|| {
        DateTime::parse_from_rfc3339(value)
            .ok()
            .map(|dt| dt.timestamp_millis())
    })
}

/// Start of the synthetic series: 2024-01-01T00:00:00Z.
const SYNTHETIC_START_MS: i64 = 1_704_067_200_000;

/// Spacing of synthetic candles: fifteen minutes.
const SYNTHETIC_STEP_MS: i64 = 15 * 60 * 1_000;

/// Deterministic seed derived from a symbol name.
pub fn synthetic_seed(symbol: &str) -> u64 {
    let hash = blake3::hash(symbol.as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&hash.as_bytes()[..8]);
    u64::from_le_bytes(bytes)
}

/// Seeded random walk that yields one candle at a time.
///
/// Stepping a walk `n` times yields exactly `synthetic_candles(n, ..)` for the
/// same seed and start price.
#[derive(Debug, Clone)]
pub struct SyntheticWalk {
    rng: StdRng,
    price: f64,
    index: i64,
}

impl SyntheticWalk {
    pub fn new(seed: u64, start_price: f64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            price: start_price,
            index: 0,
        }
    }

    /// Advance the walk by one candle.
    pub fn next_candle(&mut self) -> Candle {
        let ret: f64 = self.rng.gen_range(-0.01..0.01);
        let open = self.price;
        let close = open * (1.0 + ret);
        let high = open.max(close) * (1.0 + self.rng.gen_range(0.0..0.004));
        let low = open.min(close) * (1.0 - self.rng.gen_range(0.0..0.004));
        let volume = self.rng.gen_range(10.0..1_000.0);
        let timestamp = SYNTHETIC_START_MS + self.index * SYNTHETIC_STEP_MS;
        self.price = close;
        self.index += 1;
        Candle::new(timestamp, open, high, low, close, volume)
    }
}

/// Generate a seeded random-walk candle series for demos and tests.
///
/// The same seed always yields the same series, and a longer series extends
/// a shorter one without changing its prefix.
pub fn synthetic_candles(n: usize, seed: u64, start_price: f64) -> Vec<Candle> {
    let mut walk = SyntheticWalk::new(seed, start_price);
    (0..n).map(|_| walk.next_candle()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use harsi_core::domain::candles_are_ordered;

    fn parse(text: &str) -> Result<Vec<Candle>, LoadError> {
        read_candles(text.as_bytes(), Path::new("test.csv"))
    }

    #[test]
    fn parses_epoch_and_rfc3339_timestamps() {
        let candles = parse(
            "timestamp,open,high,low,close,volume\n\
             1704067200000,1.0,2.0,0.5,1.5,10\n\
             2024-01-01T00:15:00Z,1.5,2.5,1.0,2.0,11\n",
        )
        .unwrap();
        assert_eq!(candles.len(), 2);
        assert_eq!(candles[0].timestamp, 1_704_067_200_000);
        assert_eq!(candles[1].timestamp, 1_704_068_100_000);
        assert_eq!(candles[1].close, 2.0);
        assert_eq!(candles[1].volume, 11.0);
    }

    #[test]
    fn tolerates_whitespace() {
        let candles =
            parse("timestamp, open, high, low, close, volume\n 1000 , 1, 2, 0.5, 1.5, 3\n").unwrap();
        assert_eq!(candles[0].timestamp, 1000);
    }

    #[test]
    fn rejects_unordered_rows() {
        let err = parse(
            "timestamp,open,high,low,close,volume\n\
             2000,1,2,0.5,1.5,1\n\
             1000,1,2,0.5,1.5,1\n",
        )
        .unwrap_err();
        assert!(matches!(err, LoadError::Unordered { row: 3, .. }));
    }

    #[test]
    fn rejects_duplicate_timestamps() {
        let err = parse(
            "timestamp,open,high,low,close,volume\n\
             1000,1,2,0.5,1.5,1\n\
             1000,1,2,0.5,1.5,1\n",
        )
        .unwrap_err();
        assert!(matches!(err, LoadError::Unordered { .. }));
    }

    #[test]
    fn rejects_bad_timestamp() {
        let err = parse("timestamp,open,high,low,close,volume\nyesterday,1,2,0.5,1.5,1\n")
            .unwrap_err();
        assert!(matches!(err, LoadError::Timestamp { row: 2, .. }));
        assert!(err.to_string().contains("yesterday"));
    }

    #[test]
    fn rejects_non_numeric_price() {
        let err = parse("timestamp,open,high,low,close,volume\n1000,abc,2,0.5,1.5,1\n").unwrap_err();
        assert!(matches!(err, LoadError::Csv { .. }));
    }

    #[test]
    fn rejects_empty_file() {
        let err = parse("timestamp,open,high,low,close,volume\n").unwrap_err();
        assert!(matches!(err, LoadError::Empty { .. }));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_csv(Path::new("/nonexistent/BTC-USDT.csv")).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }

    #[test]
    fn symbol_paths_and_normalization() {
        assert_eq!(normalize_symbol("BTC-USDT"), "BTC/USDT");
        assert_eq!(normalize_symbol("ETH/USDT"), "ETH/USDT");
        assert_eq!(
            candle_path(Path::new("data"), "BTC/USDT"),
            PathBuf::from("data/BTC-USDT.csv")
        );
    }

    #[test]
    fn load_symbol_keeps_latest_history() {
        let dir = tempfile::tempdir().unwrap();
        let mut text = String::from("timestamp,open,high,low,close,volume\n");
        for i in 0..10 {
            text.push_str(&format!("{},1,2,0.5,{},1\n", 1000 + i, i));
        }
        std::fs::write(dir.path().join("SOL-USDT.csv"), text).unwrap();

        let candles = load_symbol(dir.path(), "SOL/USDT", 4).unwrap();
        assert_eq!(candles.len(), 4);
        assert_eq!(candles[0].timestamp, 1006);
        assert_eq!(candles[3].close, 9.0);

        let all = load_symbol(dir.path(), "SOL/USDT", 100).unwrap();
        assert_eq!(all.len(), 10);
    }

    #[test]
    fn synthetic_series_is_deterministic_and_extends() {
        let a = synthetic_candles(50, 7, 100.0);
        let b = synthetic_candles(80, 7, 100.0);
        assert_eq!(a[..], b[..50]);
        assert!(candles_are_ordered(&b));
        assert!(b.iter().all(|c| c.is_sane()));
        assert_eq!(a[0].open, 100.0);
        assert_ne!(synthetic_candles(50, 8, 100.0), a);
    }

    #[test]
    fn stepped_walk_matches_batch_series() {
        let mut walk = SyntheticWalk::new(7, 100.0);
        let stepped: Vec<Candle> = (0..40).map(|_| walk.next_candle()).collect();
        assert_eq!(stepped, synthetic_candles(40, 7, 100.0));
        assert_eq!(walk.next_candle(), synthetic_candles(41, 7, 100.0)[40]);
    }

    #[test]
    fn synthetic_seed_depends_on_symbol() {
        assert_eq!(synthetic_seed("BTC/USDT"), synthetic_seed("BTC/USDT"));
        assert_ne!(synthetic_seed("BTC/USDT"), synthetic_seed("ETH/USDT"));
    }
}
