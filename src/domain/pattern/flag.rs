//! Bull or bear flag: a sharp pole followed by a tight consolidation.
//!
//! For bar i the pole spans `[i - 2L, i - L)` and must move at least 10%
//! first-to-last; the flag spans `[i - L, i)` and its range must be under 5%
//! of its mean.

use crate::domain::pattern::EPS;

const POLE_MOVE: f64 = 0.10;
const FLAG_RANGE: f64 = 0.05;

pub fn detect_flag(closes: &[f64], lookback: usize) -> Vec<bool> {
    let n = closes.len();
    let mut res = vec![false; n];
    if lookback == 0 || n < lookback * 2 {
        return res;
    }

    for i in (lookback * 2)..n {
        let pole = &closes[i - lookback * 2..i - lookback];
        let pole_change = (pole[lookback - 1] - pole[0]) / (pole[0] + EPS);

        let flag = &closes[i - lookback..i];
        let max = flag.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let min = flag.iter().copied().fold(f64::INFINITY, f64::min);
        let mean = flag.iter().sum::<f64>() / lookback as f64;
        let flag_range = (max - min) / (mean + EPS);

        res[i] = pole_change.abs() >= POLE_MOVE && flag_range < FLAG_RANGE;
    }
    res
}
