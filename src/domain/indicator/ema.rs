//! Exponential Moving Average.
//!
//! k = 2/(n+1), seeded with the first value, then EMA[i] = C[i]*k + EMA[i-1]*(1-k).
//! No warmup: defined from the first bar.

use crate::domain::indicator_helpers::ewm;

pub fn calculate_ema(closes: &[f64], period: usize) -> Vec<f64> {
    if period == 0 {
        return vec![f64::NAN; closes.len()];
    }
    let k = 2.0 / (period as f64 + 1.0);
    ewm(closes, k, 1)
}
