//! Identifier → implementation registry for indicators and pattern detectors.
//!
//! Workflows name indicators and patterns by stable identifiers; the scanner
//! resolves them here. Custom implementations are added with
//! [`Registry::register_indicator`] / [`Registry::register_pattern`].

use crate::domain::indicator::yoda::Yoda;
use crate::domain::indicator::{Indicator, IndicatorType};
use crate::domain::pattern::{Direction, PatternDetector, PatternType};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

#[derive(Clone, Default)]
pub struct Registry {
    indicators: BTreeMap<String, Arc<dyn Indicator>>,
    patterns: BTreeMap<String, Arc<dyn PatternDetector>>,
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("indicators", &self.indicators.keys().collect::<Vec<_>>())
            .field("patterns", &self.patterns.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_builtins() -> Self {
        let mut registry = Self::new();

        registry.register_indicator("Yoda", Arc::new(Yoda::default()));
        let indicators = [
            ("RSI", IndicatorType::Rsi(14)),
            (
                "MACD",
                IndicatorType::Macd {
                    fast: 12,
                    slow: 26,
                    signal: 9,
                },
            ),
            (
                "BB",
                IndicatorType::Bollinger {
                    period: 20,
                    stddev_mult_x100: 200,
                },
            ),
            ("ATR", IndicatorType::Atr(14)),
            ("ADX", IndicatorType::Adx(14)),
            (
                "Stochastic",
                IndicatorType::Stochastic {
                    period: 14,
                    smooth_k: 1,
                    smooth_d: 3,
                },
            ),
            ("OBV", IndicatorType::Obv),
            ("VWAP", IndicatorType::Vwap),
            ("EMA_5", IndicatorType::Ema(5)),
            ("EMA_20", IndicatorType::Ema(20)),
            ("EMA_50", IndicatorType::Ema(50)),
            ("SMA_200", IndicatorType::Sma(200)),
            ("Pivot", IndicatorType::Pivot),
            (
                "Ichimoku",
                IndicatorType::Ichimoku {
                    tenkan: 9,
                    kijun: 26,
                    senkou_b: 52,
                },
            ),
        ];
        for (id, indicator) in indicators {
            registry.register_indicator(id, Arc::new(indicator));
        }

        let patterns = [
            PatternType::DoubleBottom {
                lookback: 50,
                tolerance: 0.02,
            },
            PatternType::DoubleTop {
                lookback: 50,
                tolerance: 0.02,
            },
            PatternType::HeadShoulders {
                lookback: 50,
                order: 5,
            },
            PatternType::InvHeadShoulders {
                lookback: 50,
                order: 5,
            },
            PatternType::TrendlineBreak {
                direction: Direction::Up,
                lookback: 30,
                min_break: 0.01,
            },
            PatternType::TrendlineBreak {
                direction: Direction::Down,
                lookback: 30,
                min_break: 0.01,
            },
            PatternType::Triangle { lookback: 50 },
            PatternType::CupHandle { lookback: 100 },
            PatternType::Flag { lookback: 20 },
            PatternType::Wedge {
                direction: Direction::Up,
                lookback: 50,
            },
            PatternType::Wedge {
                direction: Direction::Down,
                lookback: 50,
            },
        ];
        for pattern in patterns {
            registry.register_pattern(&pattern.name(), Arc::new(pattern));
        }

        registry
    }

    /// Register or replace an indicator under `id`.
    pub fn register_indicator(&mut self, id: &str, indicator: Arc<dyn Indicator>) {
        self.indicators.insert(id.to_string(), indicator);
    }

    /// Register or replace a pattern detector; its flag column is named `id`.
    pub fn register_pattern(&mut self, id: &str, detector: Arc<dyn PatternDetector>) {
        self.patterns.insert(id.to_string(), detector);
    }

    pub fn indicator(&self, id: &str) -> Option<&dyn Indicator> {
        self.indicators.get(id).map(|i| i.as_ref())
    }

    pub fn pattern(&self, id: &str) -> Option<&dyn PatternDetector> {
        self.patterns.get(id).map(|p| p.as_ref())
    }

    pub fn indicator_ids(&self) -> impl Iterator<Item = &str> {
        self.indicators.keys().map(String::as_str)
    }

    pub fn pattern_ids(&self) -> impl Iterator<Item = &str> {
        self.patterns.keys().map(String::as_str)
    }
}
