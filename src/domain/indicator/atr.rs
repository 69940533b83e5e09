//! Average True Range.
//!
//! Wilder average of the true range, seeded at bar (n-1) with the mean of the
//! first n true ranges. The first bar's true range is high - low.

use crate::domain::indicator_helpers::{true_ranges, wilder_average};
use crate::domain::ohlcv::OhlcvBar;

pub fn calculate_atr(bars: &[OhlcvBar], period: usize) -> Vec<f64> {
    wilder_average(&true_ranges(bars), period)
}
