//! Yoda composite: MACD colour transitions, an SMA cross and a TTM squeeze.
//!
//! - MACD = EMA(fast) - EMA(slow); Signal = partial rolling mean of MACD.
//!   A line is bullish on a bar when it is above its own prior value.
//! - Buy_MACD fires on the bar both lines turn bullish together (they were not
//!   both bullish on the prior bar); Sell_MACD mirrors it for "both bearish".
//! - CrossUp/CrossDown: close crosses the SMA between the prior bar and this one.
//! - In_Squeeze: Bollinger bands sit inside the Keltner channel
//!   (BB basis ± kc_mult × ATR). TTM_Fired is the first bar out of a squeeze.
//! - Buy_Signal = Buy_MACD or CrossUp; Sell_Signal = Sell_MACD or CrossDown.

use crate::domain::error::ScanError;
use crate::domain::frame::{Column, ColumnSpec};
use crate::domain::indicator::Indicator;
use crate::domain::indicator::atr::calculate_atr;
use crate::domain::indicator::bollinger::calculate_bollinger;
use crate::domain::indicator::ema::calculate_ema;
use crate::domain::indicator_helpers::rolling_mean_partial;
use crate::domain::ohlcv::PriceSeries;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Yoda {
    pub fast: usize,
    pub slow: usize,
    pub signal: usize,
    pub sma_length: usize,
    pub squeeze_length: usize,
    pub bb_mult: f64,
    pub kc_mult: f64,
}

impl Default for Yoda {
    fn default() -> Self {
        Self {
            fast: 12,
            slow: 26,
            signal: 9,
            sma_length: 50,
            squeeze_length: 20,
            bb_mult: 2.0,
            kc_mult: 1.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct YodaOutput {
    pub macd: Vec<f64>,
    pub signal: Vec<f64>,
    pub macd_bullish: Vec<bool>,
    pub signal_bullish: Vec<bool>,
    pub buy_macd: Vec<bool>,
    pub sell_macd: Vec<bool>,
    pub sma: Vec<f64>,
    pub cross_up: Vec<bool>,
    pub cross_down: Vec<bool>,
    pub in_squeeze: Vec<bool>,
    pub ttm_fired: Vec<bool>,
    pub buy_signal: Vec<bool>,
    pub sell_signal: Vec<bool>,
}

const OUTPUTS: [(&str, bool); 13] = [
    ("MACD", false),
    ("Signal", false),
    ("MACD_Bullish", true),
    ("Signal_Bullish", true),
    ("Buy_MACD", true),
    ("Sell_MACD", true),
    ("SMA", false),
    ("CrossUp", true),
    ("CrossDown", true),
    ("In_Squeeze", true),
    ("TTM_Fired", true),
    ("Buy_Signal", true),
    ("Sell_Signal", true),
];

/// `v[i] > v[i-1]`, false on the first bar or when either side is undefined.
fn rising(values: &[f64]) -> Vec<bool> {
    (0..values.len())
        .map(|i| i > 0 && values[i] > values[i - 1])
        .collect()
}

/// True on bars where `state` holds and did not hold on the prior bar.
fn turned_on(state: &[bool]) -> Vec<bool> {
    (0..state.len())
        .map(|i| state[i] && !(i > 0 && state[i - 1]))
        .collect()
}

impl Yoda {
    pub fn calculate(&self, series: &PriceSeries) -> YodaOutput {
        let closes = series.closes();
        let len = closes.len();

        let fast = calculate_ema(&closes, self.fast);
        let slow = calculate_ema(&closes, self.slow);
        let macd: Vec<f64> = fast.iter().zip(&slow).map(|(f, s)| f - s).collect();
        let signal = rolling_mean_partial(&macd, self.signal);

        let macd_bullish = rising(&macd);
        let signal_bullish = rising(&signal);
        let both_bullish: Vec<bool> = (0..len).map(|i| macd_bullish[i] && signal_bullish[i]).collect();
        let both_bearish: Vec<bool> = (0..len)
            .map(|i| !macd_bullish[i] && !signal_bullish[i])
            .collect();
        let buy_macd = turned_on(&both_bullish);
        let sell_macd = turned_on(&both_bearish);

        let sma = rolling_mean_partial(&closes, self.sma_length);
        let cross_up: Vec<bool> = (0..len)
            .map(|i| i > 0 && closes[i - 1] < sma[i - 1] && closes[i] > sma[i])
            .collect();
        let cross_down: Vec<bool> = (0..len)
            .map(|i| i > 0 && closes[i - 1] > sma[i - 1] && closes[i] < sma[i])
            .collect();

        let bb = calculate_bollinger(&closes, self.squeeze_length, self.bb_mult);
        let atr = calculate_atr(&series.bars, self.squeeze_length);
        let in_squeeze: Vec<bool> = (0..len)
            .map(|i| {
                let kc_upper = bb.middle[i] + atr[i] * self.kc_mult;
                let kc_lower = bb.middle[i] - atr[i] * self.kc_mult;
                bb.lower[i] >= kc_lower && bb.upper[i] <= kc_upper
            })
            .collect();
        let ttm_fired = (0..len)
            .map(|i| !in_squeeze[i] && i > 0 && in_squeeze[i - 1])
            .collect();

        let buy_signal = (0..len).map(|i| buy_macd[i] || cross_up[i]).collect();
        let sell_signal = (0..len).map(|i| sell_macd[i] || cross_down[i]).collect();

        YodaOutput {
            macd,
            signal,
            macd_bullish,
            signal_bullish,
            buy_macd,
            sell_macd,
            sma,
            cross_up,
            cross_down,
            in_squeeze,
            ttm_fired,
            buy_signal,
            sell_signal,
        }
    }
}

impl Indicator for Yoda {
    fn name(&self) -> String {
        "Yoda".to_string()
    }

    fn outputs(&self) -> Vec<ColumnSpec> {
        OUTPUTS
            .iter()
            .map(|&(name, flag)| {
                if flag {
                    ColumnSpec::flag(name)
                } else {
                    ColumnSpec::numeric(name)
                }
            })
            .collect()
    }

    fn compute(&self, series: &PriceSeries) -> Result<Vec<Column>, ScanError> {
        if [self.fast, self.slow, self.signal, self.sma_length, self.squeeze_length].contains(&0) {
            return Err(ScanError::computation("Yoda", "period must be positive"));
        }
        let out = self.calculate(series);
        Ok(vec![
            Column::Numeric(out.macd),
            Column::Numeric(out.signal),
            Column::Flag(out.macd_bullish),
            Column::Flag(out.signal_bullish),
            Column::Flag(out.buy_macd),
            Column::Flag(out.sell_macd),
            Column::Numeric(out.sma),
            Column::Flag(out.cross_up),
            Column::Flag(out.cross_down),
            Column::Flag(out.in_squeeze),
            Column::Flag(out.ttm_fired),
            Column::Flag(out.buy_signal),
            Column::Flag(out.sell_signal),
        ])
    }
}
