//! Double top / double bottom.
//!
//! A local extremum is an interior bar whose two immediate neighbours are both
//! lower (maximum) or both higher (minimum). A bar is flagged when the two
//! most recent same-type extrema inside its trailing window are within
//! `tolerance` of their mean.

use crate::domain::pattern::{Direction, EPS};

/// Interior local maxima (`Up`) or minima (`Down`); the end bars are never
/// extrema.
pub fn local_extrema(values: &[f64], direction: Direction) -> Vec<bool> {
    let n = values.len();
    (0..n)
        .map(|i| {
            if i == 0 || i + 1 >= n {
                return false;
            }
            let (prev, cur, next) = (values[i - 1], values[i], values[i + 1]);
            match direction {
                Direction::Up => prev < cur && next < cur,
                Direction::Down => prev > cur && next > cur,
            }
        })
        .collect()
}

/// `Direction::Up` detects double tops, `Direction::Down` double bottoms.
pub fn detect_double(
    closes: &[f64],
    direction: Direction,
    lookback: usize,
    tolerance: f64,
) -> Vec<bool> {
    let n = closes.len();
    let mut res = vec![false; n];
    if n < 5 {
        return res;
    }

    let extrema = local_extrema(closes, direction);
    for i in 0..n {
        let start = i.saturating_sub(lookback);
        let mut recent = (start..=i).rev().filter(|&j| extrema[j]);
        if let (Some(last), Some(prior)) = (recent.next(), recent.next()) {
            let (v1, v2) = (closes[prior], closes[last]);
            if (v1 - v2).abs() / ((v1 + v2) / 2.0 + EPS) <= tolerance {
                res[i] = true;
            }
        }
    }
    res
}
