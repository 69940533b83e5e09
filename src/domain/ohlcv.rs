//! OHLCV bar and normalized price series.

use chrono::NaiveDateTime;

#[derive(Debug, Clone, PartialEq)]
pub struct OhlcvBar {
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl OhlcvBar {
    /// (high + low + close) / 3
    pub fn typical_price(&self) -> f64 {
        (self.high + self.low + self.close) / 3.0
    }

    /// max(high - low, |high - prev_close|, |low - prev_close|)
    pub fn true_range(&self, prev_close: f64) -> f64 {
        let hl = self.high - self.low;
        let hc = (self.high - prev_close).abs();
        let lc = (self.low - prev_close).abs();
        hl.max(hc).max(lc)
    }
}

/// A normalized series of bars with strictly increasing timestamps.
///
/// `NaN` marks a value the normalizer could not parse. Volume is `0.0` on
/// every bar when the source table had no volume column.
#[derive(Debug, Clone, Default)]
pub struct PriceSeries {
    pub bars: Vec<OhlcvBar>,
    pub has_volume: bool,
}

impl PriceSeries {
    pub fn new(bars: Vec<OhlcvBar>, has_volume: bool) -> Self {
        Self { bars, has_volume }
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn latest(&self) -> Option<&OhlcvBar> {
        self.bars.last()
    }

    pub fn opens(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.open).collect()
    }

    pub fn highs(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.high).collect()
    }

    pub fn lows(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.low).collect()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    /// Volumes, or `None` when the source had no volume column.
    pub fn volumes(&self) -> Option<Vec<f64>> {
        if self.has_volume {
            Some(self.bars.iter().map(|b| b.volume).collect())
        } else {
            None
        }
    }
}
