//! Bollinger Bands.
//!
//! Bollinger Bands consist of:
//! - Middle: Simple Moving Average (SMA) over n periods
//! - Upper: Middle + (multiplier × StdDev)
//! - Lower: Middle - (multiplier × StdDev)
//!
//! Where StdDev is population standard deviation (divides by N, not N-1).
//!
//! Default parameters: period=20, multiplier=2.0
//! Warmup: first (period-1) bars are undefined.

use crate::domain::indicator_helpers::{rolling_mean, rolling_std};

#[derive(Debug, Clone, PartialEq)]
pub struct BollingerOutput {
    pub upper: Vec<f64>,
    pub middle: Vec<f64>,
    pub lower: Vec<f64>,
}

pub fn calculate_bollinger(closes: &[f64], period: usize, mult: f64) -> BollingerOutput {
    let middle = rolling_mean(closes, period);
    let stddev = rolling_std(closes, period);
    let upper = middle.iter().zip(&stddev).map(|(m, s)| m + mult * s).collect();
    let lower = middle.iter().zip(&stddev).map(|(m, s)| m - mult * s).collect();
    BollingerOutput {
        upper,
        middle,
        lower,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn bollinger_warmup() {
        let out = calculate_bollinger(&[1.0, 2.0, 3.0, 4.0, 5.0], 3, 2.0);
        assert!(out.middle[1].is_nan());
        assert!(out.upper[1].is_nan());
        assert_relative_eq!(out.middle[2], 2.0);
    }

    #[test]
    fn bollinger_constant_values() {
        let out = calculate_bollinger(&[50.0; 25], 20, 2.0);
        assert_relative_eq!(out.upper[24], 50.0);
        assert_relative_eq!(out.lower[24], 50.0);
    }

    #[test]
    fn bollinger_basic_calculation() {
        // mean 5, population stddev 2
        let closes = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let out = calculate_bollinger(&closes, 8, 2.0);
        assert_relative_eq!(out.middle[7], 5.0);
        assert_relative_eq!(out.upper[7], 9.0, epsilon = 1e-12);
        assert_relative_eq!(out.lower[7], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn bollinger_symmetry() {
        let closes: Vec<f64> = (0..30).map(|i| 100.0 + (i % 7) as f64).collect();
        let out = calculate_bollinger(&closes, 20, 2.5);
        for i in 19..30 {
            assert_relative_eq!(
                out.upper[i] - out.middle[i],
                out.middle[i] - out.lower[i],
                epsilon = 1e-9
            );
        }
    }
}
