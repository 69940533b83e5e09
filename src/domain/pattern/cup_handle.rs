//! Cup and handle over a 100-bar trailing window.
//!
//! The window is split in quarters: the peaks of the first and last quarter
//! must agree within 5%, the middle half must dip below 85% of the left peak,
//! and the last 10 bars must stay under 102% of the right peak.

use crate::domain::pattern::EPS;

const HANDLE_BARS: usize = 10;

fn max_of(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}

fn min_of(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::INFINITY, f64::min)
}

pub fn detect_cup_handle(closes: &[f64], lookback: usize) -> Vec<bool> {
    let n = closes.len();
    let mut res = vec![false; n];
    if n < lookback || lookback < 4 {
        return res;
    }

    let mid = lookback / 2;
    let quarter = mid / 2;
    for i in lookback..n {
        let window = &closes[i - lookback..i];
        let left_max = max_of(&window[..quarter]);
        let bottom = min_of(&window[quarter..mid + quarter]);
        let right_max = max_of(&window[lookback - quarter..]);

        let rims_match = (left_max - right_max).abs() / (left_max + EPS) < 0.05;
        if rims_match && bottom < left_max * 0.85 {
            let handle = &window[lookback.saturating_sub(HANDLE_BARS)..];
            if max_of(handle) < right_max * 1.02 {
                res[i] = true;
            }
        }
    }
    res
}
