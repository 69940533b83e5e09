//! Rising and falling wedges.
//!
//! Rising: high and low regression slopes both positive, low slope above 0.8×
//! the high slope. Falling: both negative, low slope below 0.8× the high slope.

use crate::domain::pattern::{Direction, slope};

const CONVERGENCE: f64 = 0.8;

pub fn detect_wedge(highs: &[f64], lows: &[f64], direction: Direction, lookback: usize) -> Vec<bool> {
    let n = highs.len().min(lows.len());
    let mut res = vec![false; n];
    if n < lookback || lookback == 0 {
        return res;
    }
    for i in lookback..n {
        let (Some(hs), Some(ls)) = (
            slope(&highs[i - lookback..i]),
            slope(&lows[i - lookback..i]),
        ) else {
            continue;
        };
        res[i] = match direction {
            Direction::Up => hs > 0.0 && ls > 0.0 && ls > hs * CONVERGENCE,
            Direction::Down => hs < 0.0 && ls < 0.0 && ls < hs * CONVERGENCE,
        };
    }
    res
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(n: usize, high_step: f64, low_step: f64) -> (Vec<f64>, Vec<f64>) {
        let highs = (0..n).map(|i| 120.0 + i as f64 * high_step).collect();
        let lows = (0..n).map(|i| 80.0 + i as f64 * low_step).collect();
        (highs, lows)
    }

    #[test]
    fn rising_wedge_lows_catch_up() {
        let (highs, lows) = lines(60, 0.2, 0.5);
        let res = detect_wedge(&highs, &lows, Direction::Up, 50);
        assert!(res[50] && res[59]);
        assert!(!detect_wedge(&highs, &lows, Direction::Down, 50)[55]);
    }

    #[test]
    fn falling_wedge_lows_fall_faster() {
        let (highs, lows) = lines(60, -0.2, -0.5);
        let res = detect_wedge(&highs, &lows, Direction::Down, 50);
        assert!(res[55]);
    }

    #[test]
    fn lagging_lows_are_not_a_rising_wedge() {
        let (highs, lows) = lines(60, 0.5, 0.1);
        assert!(!detect_wedge(&highs, &lows, Direction::Up, 50)[55]);
    }
}
