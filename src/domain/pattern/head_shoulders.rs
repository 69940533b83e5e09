//! Head-and-shoulders and its inverse.
//!
//! Extrema are bars strictly beyond every neighbour within `order` bars on
//! each side (indices clipped to the series ends). The first run of three
//! consecutive extrema whose middle is the most extreme and whose outer
//! points lie within 5% of the left shoulder latches the flag on from the
//! right shoulder to the end of the series.

use crate::domain::pattern::{Direction, EPS};

const SHOULDER_TOLERANCE: f64 = 0.05;

/// Indices of order-`order` maxima (`Up`) or minima (`Down`).
pub fn order_extrema(values: &[f64], direction: Direction, order: usize) -> Vec<usize> {
    let n = values.len();
    if n == 0 {
        return Vec::new();
    }
    let beats = |a: f64, b: f64| match direction {
        Direction::Up => a > b,
        Direction::Down => a < b,
    };
    (0..n)
        .filter(|&i| {
            (1..=order).all(|k| {
                let left = values[i.saturating_sub(k)];
                let right = values[(i + k).min(n - 1)];
                beats(values[i], left) && beats(values[i], right)
            })
        })
        .collect()
}

/// `Direction::Up` detects head-and-shoulders tops, `Direction::Down` the
/// inverse pattern.
pub fn detect_head_shoulders(
    closes: &[f64],
    direction: Direction,
    lookback: usize,
    order: usize,
) -> Vec<bool> {
    let n = closes.len();
    let mut res = vec![false; n];
    if n < lookback || order == 0 {
        return res;
    }

    let extrema = order_extrema(closes, direction, order);
    for triple in extrema.windows(3) {
        let left = closes[triple[0]];
        let head = closes[triple[1]];
        let right = closes[triple[2]];
        let head_extreme = match direction {
            Direction::Up => head > left && head > right,
            Direction::Down => head < left && head < right,
        };
        if head_extreme && (left - right).abs() / (left + EPS) < SHOULDER_TOLERANCE {
            res[triple[2]..].iter_mut().for_each(|r| *r = true);
            break;
        }
    }
    res
}
