//! RSI (Relative Strength Index).
//!
//! Gains and losses are smoothed with Wilder's factor (alpha = 1/n) starting
//! from the first bar, whose change counts as zero.
//!
//! Formula: RSI = 100 - (100 / (1 + avg_gain / avg_loss))
//! If avg_loss == 0: RSI = 100
//!
//! Warmup: first (n-1) bars are undefined.

use crate::domain::indicator_helpers::ewm;

pub fn calculate_rsi(closes: &[f64], period: usize) -> Vec<f64> {
    if period == 0 {
        return vec![f64::NAN; closes.len()];
    }

    let mut gains = Vec::with_capacity(closes.len());
    let mut losses = Vec::with_capacity(closes.len());
    for i in 0..closes.len() {
        let change = if i == 0 { 0.0 } else { closes[i] - closes[i - 1] };
        if change.is_nan() {
            gains.push(f64::NAN);
            losses.push(f64::NAN);
        } else {
            gains.push(change.max(0.0));
            losses.push((-change).max(0.0));
        }
    }

    let alpha = 1.0 / period as f64;
    let avg_gain = ewm(&gains, alpha, period);
    let avg_loss = ewm(&losses, alpha, period);

    avg_gain
        .iter()
        .zip(&avg_loss)
        .map(|(&g, &l)| {
            if g.is_nan() || l.is_nan() {
                f64::NAN
            } else if l == 0.0 {
                100.0
            } else {
                100.0 - (100.0 / (1.0 + g / l))
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rsi_warmup() {
        let closes: Vec<f64> = (0..20).map(|i| 100.0 + i as f64).collect();
        let out = calculate_rsi(&closes, 14);
        assert!(out[..13].iter().all(|v| v.is_nan()));
        assert!(!out[13].is_nan());
    }

    #[test]
    fn rsi_all_gains_is_100() {
        let closes: Vec<f64> = (0..40).map(|i| 100.0 + i as f64).collect();
        let out = calculate_rsi(&closes, 14);
        assert_eq!(*out.last().unwrap(), 100.0);
    }

    #[test]
    fn rsi_all_losses_tends_to_zero() {
        let closes: Vec<f64> = (0..60).map(|i| 200.0 - i as f64).collect();
        let out = calculate_rsi(&closes, 14);
        assert!(*out.last().unwrap() < 1.0);
    }

    #[test]
    fn rsi_stays_in_range() {
        let closes = [
            44.34, 44.09, 44.15, 43.61, 44.33, 44.83, 45.10, 45.42, 45.84, 46.08, 45.89, 46.03,
            45.61, 46.28, 46.28, 46.00, 46.03, 46.41, 46.22, 45.64,
        ];
        let out = calculate_rsi(&closes, 14);
        for v in out.iter().filter(|v| !v.is_nan()) {
            assert!((0.0..=100.0).contains(v));
        }
    }

    #[test]
    fn rsi_flat_prices_is_100() {
        let out = calculate_rsi(&[50.0; 20], 14);
        assert_eq!(out[19], 100.0);
    }
}
