//! Simple Moving Average.
//!
//! Partial windows at the start average whatever points are available, so the
//! first bar equals its own close rather than being undefined.

use crate::domain::indicator_helpers::rolling_mean_partial;

pub fn calculate_sma(closes: &[f64], period: usize) -> Vec<f64> {
    rolling_mean_partial(closes, period)
}
