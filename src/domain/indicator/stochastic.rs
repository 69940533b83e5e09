//! Stochastic oscillator.
//!
//! Raw %K = 100 * (close - lowest low) / (highest high - lowest low) over the
//! last `period` bars, optionally smoothed by an SMA of `smooth_k`.
//! %D = SMA(smooth_d) of %K. A zero high-low range leaves %K undefined.

use crate::domain::indicator_helpers::{rolling_max, rolling_mean, rolling_min};
use crate::domain::ohlcv::OhlcvBar;

#[derive(Debug, Clone, PartialEq)]
pub struct StochasticOutput {
    pub k: Vec<f64>,
    pub d: Vec<f64>,
}

pub fn calculate_stochastic(
    bars: &[OhlcvBar],
    period: usize,
    smooth_k: usize,
    smooth_d: usize,
) -> StochasticOutput {
    let highs: Vec<f64> = bars.iter().map(|b| b.high).collect();
    let lows: Vec<f64> = bars.iter().map(|b| b.low).collect();
    let highest = rolling_max(&highs, period);
    let lowest = rolling_min(&lows, period);

    let raw_k: Vec<f64> = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| {
            let range = highest[i] - lowest[i];
            if range.is_nan() || range == 0.0 {
                f64::NAN
            } else {
                100.0 * (bar.close - lowest[i]) / range
            }
        })
        .collect();

    let k = if smooth_k > 1 {
        rolling_mean(&raw_k, smooth_k)
    } else {
        raw_k
    };
    let d = rolling_mean(&k, smooth_d);
    StochasticOutput { k, d }
}
