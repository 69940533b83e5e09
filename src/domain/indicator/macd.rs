//! MACD (Moving Average Convergence Divergence).
//!
//! - MACD line = EMA(fast) - EMA(slow)
//! - Signal line = EMA(signal) of the MACD line
//! - Histogram = MACD line - signal line
//!
//! Default parameters: fast=12, slow=26, signal=9.
//! Warmup: the line is defined from the first bar; signal and histogram are
//! undefined for the first (signal-1) bars.

use crate::domain::indicator::ema::calculate_ema;
use crate::domain::indicator_helpers::ewm;

pub const DEFAULT_FAST: usize = 12;
pub const DEFAULT_SLOW: usize = 26;
pub const DEFAULT_SIGNAL: usize = 9;

#[derive(Debug, Clone, PartialEq)]
pub struct MacdOutput {
    pub line: Vec<f64>,
    pub signal: Vec<f64>,
    pub histogram: Vec<f64>,
}

pub fn calculate_macd(closes: &[f64], fast: usize, slow: usize, signal: usize) -> MacdOutput {
    let fast_ema = calculate_ema(closes, fast);
    let slow_ema = calculate_ema(closes, slow);
    let line: Vec<f64> = fast_ema.iter().zip(&slow_ema).map(|(f, s)| f - s).collect();
    let signal_line = if signal == 0 {
        vec![f64::NAN; closes.len()]
    } else {
        ewm(&line, 2.0 / (signal as f64 + 1.0), signal)
    };
    let histogram = line.iter().zip(&signal_line).map(|(l, s)| l - s).collect();
    MacdOutput {
        line,
        signal: signal_line,
        histogram,
    }
}
