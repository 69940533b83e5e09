#![allow(dead_code)]

use chrono::{Duration, NaiveDate, NaiveDateTime};
pub use tidescan::domain::ohlcv::OhlcvBar;
use tidescan::domain::error::ScanError;
use tidescan::domain::normalize::RawTable;
use tidescan::ports::data_port::DataPort;
use std::collections::HashMap;

/// Data port keyed by (symbol, interval). Unknown pairs are unavailable.
pub struct MockDataPort {
    pub data: HashMap<(String, String), Vec<OhlcvBar>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, symbol: &str, interval: &str, bars: Vec<OhlcvBar>) -> Self {
        self.data
            .insert((symbol.to_string(), interval.to_string()), bars);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_ohlcv(&self, symbol: &str, interval: &str) -> Result<RawTable, ScanError> {
        let unavailable = |reason: String| ScanError::DataUnavailable {
            symbol: symbol.to_string(),
            interval: interval.to_string(),
            reason,
        };
        if let Some(reason) = self.errors.get(symbol) {
            return Err(unavailable(reason.clone()));
        }
        self.data
            .get(&(symbol.to_string(), interval.to_string()))
            .map(|bars| RawTable::from_bars(bars, true))
            .ok_or_else(|| unavailable("not found".to_string()))
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

pub fn make_bar(timestamp: NaiveDateTime, close: f64) -> OhlcvBar {
    OhlcvBar {
        timestamp,
        open: close - 1.0,
        high: close + 1.0,
        low: close - 2.0,
        close,
        volume: 1000.0,
    }
}

/// Daily bars from 2024-01-01, one per close.
pub fn bars_from_closes(closes: &[f64]) -> Vec<OhlcvBar> {
    let start = date(2024, 1, 1);
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| make_bar(start + Duration::days(i as i64), close))
        .collect()
}

/// Steady decline from 150 to 100 followed by a jump to 200: the jump makes
/// MACD cross above its signal on the final bar.
pub fn declining_then_jump() -> Vec<f64> {
    let mut closes: Vec<f64> = (0..60).map(|i| 150.0 - i as f64 * 50.0 / 59.0).collect();
    closes.push(200.0);
    closes
}

/// Steady rise from 100 to 150 followed by a drop to 50.
pub fn rising_then_drop() -> Vec<f64> {
    let mut closes: Vec<f64> = (0..60).map(|i| 100.0 + i as f64 * 50.0 / 59.0).collect();
    closes.push(50.0);
    closes
}

/// CSV text for the given bars with a `Date` header.
pub fn bars_to_csv(bars: &[OhlcvBar]) -> String {
    let mut out = String::from("Date,Open,High,Low,Close,Volume\n");
    for b in bars {
        out.push_str(&format!(
            "{},{},{},{},{},{}\n",
            b.timestamp.format("%Y-%m-%d"),
            b.open,
            b.high,
            b.low,
            b.close,
            b.volume
        ));
    }
    out
}
