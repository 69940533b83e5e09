//! Symmetrical triangle: falling highs and rising lows over the prior window.

use crate::domain::pattern::slope;

pub fn detect_triangle(highs: &[f64], lows: &[f64], lookback: usize) -> Vec<bool> {
    let n = highs.len().min(lows.len());
    let mut res = vec![false; n];
    if n < lookback || lookback == 0 {
        return res;
    }
    for i in lookback..n {
        let high_slope = slope(&highs[i - lookback..i]);
        let low_slope = slope(&lows[i - lookback..i]);
        if let (Some(hs), Some(ls)) = (high_slope, low_slope) {
            res[i] = hs < 0.0 && ls > 0.0;
        }
    }
    res
}
