//! Trendline breakout.
//!
//! Fits a regression line over the `lookback` bars before bar i and flags the
//! bar when its close clears the line's endpoint by more than `min_break`.

use crate::domain::pattern::{Direction, linear_fit};

pub fn detect_trendline_break(
    closes: &[f64],
    direction: Direction,
    lookback: usize,
    min_break: f64,
) -> Vec<bool> {
    let n = closes.len();
    let mut res = vec![false; n];
    if n < lookback + 2 || lookback == 0 {
        return res;
    }

    for i in lookback..n {
        let Ok((slope, intercept)) = linear_fit(&closes[i - lookback..i]) else {
            continue;
        };
        let trend_at_last = slope * (lookback - 1) as f64 + intercept;
        let price = closes[i];
        res[i] = match direction {
            Direction::Up => price > trend_at_last * (1.0 + min_break),
            Direction::Down => price < trend_at_last * (1.0 - min_break),
        };
    }
    res
}
