//! Bar builders shared by unit tests.

use crate::domain::ohlcv::{OhlcvBar, PriceSeries};
use chrono::{Duration, NaiveDate, NaiveDateTime};

pub fn day(i: usize) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
        + Duration::days(i as i64)
}

/// Bars with open = high = low = close.
pub fn make_bars(closes: &[f64]) -> Vec<OhlcvBar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| OhlcvBar {
            timestamp: day(i),
            open: close,
            high: close,
            low: close,
            close,
            volume: 1000.0,
        })
        .collect()
}

pub fn make_bars_hlc(rows: &[(f64, f64, f64)]) -> Vec<OhlcvBar> {
    rows.iter()
        .enumerate()
        .map(|(i, &(high, low, close))| OhlcvBar {
            timestamp: day(i),
            open: close,
            high,
            low,
            close,
            volume: 1000.0,
        })
        .collect()
}

pub fn make_series(closes: &[f64]) -> PriceSeries {
    PriceSeries::new(make_bars(closes), true)
}

/// Bars with a fixed spread of `spread` around each close.
pub fn make_series_with_spread(closes: &[f64], spread: f64) -> PriceSeries {
    let rows: Vec<(f64, f64, f64)> = closes
        .iter()
        .map(|&c| (c + spread, c - spread, c))
        .collect();
    PriceSeries::new(make_bars_hlc(&rows), true)
}
