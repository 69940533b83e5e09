//! Ichimoku cloud lines.
//!
//! Tenkan and Kijun are high/low midpoints over 9 and 26 bars. Senkou A is
//! their average and Senkou B the 52-bar midpoint, both shifted forward by
//! the Kijun period.

use crate::domain::indicator_helpers::{rolling_max, rolling_min, shift};
use crate::domain::ohlcv::OhlcvBar;

#[derive(Debug, Clone, PartialEq)]
pub struct IchimokuOutput {
    pub tenkan: Vec<f64>,
    pub kijun: Vec<f64>,
    pub senkou_a: Vec<f64>,
    pub senkou_b: Vec<f64>,
}

fn midpoint(highs: &[f64], lows: &[f64], period: usize) -> Vec<f64> {
    rolling_max(highs, period)
        .iter()
        .zip(rolling_min(lows, period))
        .map(|(h, l)| (h + l) / 2.0)
        .collect()
}

pub fn calculate_ichimoku(
    bars: &[OhlcvBar],
    tenkan_period: usize,
    kijun_period: usize,
    senkou_b_period: usize,
) -> IchimokuOutput {
    let highs: Vec<f64> = bars.iter().map(|b| b.high).collect();
    let lows: Vec<f64> = bars.iter().map(|b| b.low).collect();

    let tenkan = midpoint(&highs, &lows, tenkan_period);
    let kijun = midpoint(&highs, &lows, kijun_period);
    let span_a: Vec<f64> = tenkan.iter().zip(&kijun).map(|(t, k)| (t + k) / 2.0).collect();
    let span_b = midpoint(&highs, &lows, senkou_b_period);

    IchimokuOutput {
        senkou_a: shift(&span_a, kijun_period),
        senkou_b: shift(&span_b, kijun_period),
        tenkan,
        kijun,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::test_support::make_bars_hlc;
    use approx::assert_relative_eq;

    fn bars(n: usize) -> Vec<OhlcvBar> {
        let rows: Vec<(f64, f64, f64)> = (0..n)
            .map(|i| {
                let c = 100.0 + i as f64;
                (c + 1.0, c - 1.0, c)
            })
            .collect();
        make_bars_hlc(&rows)
    }

    #[test]
    fn tenkan_is_nine_bar_midpoint() {
        let out = calculate_ichimoku(&bars(30), 9, 26, 52);
        assert!(out.tenkan[7].is_nan());
        // highs 101..=109, lows 99..=107
        assert_relative_eq!(out.tenkan[8], (109.0 + 99.0) / 2.0);
    }

    #[test]
    fn senkou_spans_are_shifted() {
        let out = calculate_ichimoku(&bars(120), 9, 26, 52);
        assert!(out.senkou_a[50].is_nan());
        assert!(!out.senkou_a[51].is_nan());
        assert_relative_eq!(out.senkou_a[60], (out.tenkan[34] + out.kijun[34]) / 2.0);
        assert!(out.senkou_b[76].is_nan());
        assert!(!out.senkou_b[77].is_nan());
    }
}
