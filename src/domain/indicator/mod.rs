//! Technical indicator library.
//!
//! Each submodule exposes a pure `calculate_*` function over close prices or
//! bars, returning series aligned with the input where `NaN` marks the warmup
//! window. [`IndicatorType`] names an indicator with its parameters and
//! implements [`Indicator`], the interface the registry dispatches through.

pub mod adx;
pub mod atr;
pub mod bollinger;
pub mod ema;
pub mod ichimoku;
pub mod macd;
pub mod obv;
pub mod pivot;
pub mod rsi;
pub mod sma;
pub mod stochastic;
pub mod vwap;
pub mod yoda;

use crate::domain::error::ScanError;
use crate::domain::frame::{Column, ColumnSpec};
use crate::domain::ohlcv::PriceSeries;
use std::fmt;

/// Something that turns a price series into one or more named columns.
///
/// `compute` returns one column per entry of `outputs`, in the same order,
/// each as long as the series.
pub trait Indicator: Send + Sync {
    fn name(&self) -> String;
    fn outputs(&self) -> Vec<ColumnSpec>;
    fn compute(&self, series: &PriceSeries) -> Result<Vec<Column>, ScanError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Sma(usize),
    Ema(usize),
    Rsi(usize),
    Atr(usize),
    Adx(usize),
    Obv,
    Vwap,
    Macd {
        fast: usize,
        slow: usize,
        signal: usize,
    },
    Stochastic {
        period: usize,
        smooth_k: usize,
        smooth_d: usize,
    },
    Bollinger {
        period: usize,
        stddev_mult_x100: u32,
    },
    Pivot,
    Ichimoku {
        tenkan: usize,
        kijun: usize,
        senkou_b: usize,
    },
}

impl IndicatorType {
    fn periods(&self) -> Vec<usize> {
        match *self {
            IndicatorType::Sma(p)
            | IndicatorType::Ema(p)
            | IndicatorType::Rsi(p)
            | IndicatorType::Atr(p)
            | IndicatorType::Adx(p) => vec![p],
            IndicatorType::Macd { fast, slow, signal } => vec![fast, slow, signal],
            IndicatorType::Stochastic {
                period,
                smooth_k,
                smooth_d,
            } => vec![period, smooth_k, smooth_d],
            IndicatorType::Bollinger { period, .. } => vec![period],
            IndicatorType::Ichimoku {
                tenkan,
                kijun,
                senkou_b,
            } => vec![tenkan, kijun, senkou_b],
            IndicatorType::Obv | IndicatorType::Vwap | IndicatorType::Pivot => vec![],
        }
    }
}

impl Indicator for IndicatorType {
    fn name(&self) -> String {
        self.to_string()
    }

    fn outputs(&self) -> Vec<ColumnSpec> {
        let names: Vec<String> = match self {
            IndicatorType::Sma(p) => vec![format!("SMA_{p}")],
            IndicatorType::Ema(p) => vec![format!("EMA_{p}")],
            IndicatorType::Rsi(_) => vec!["RSI".into()],
            IndicatorType::Atr(_) => vec!["ATR".into()],
            IndicatorType::Adx(_) => vec!["ADX".into(), "DI_Plus".into(), "DI_Minus".into()],
            IndicatorType::Obv => vec!["OBV".into()],
            IndicatorType::Vwap => vec!["VWAP".into()],
            IndicatorType::Macd { .. } => {
                vec!["MACD".into(), "MACD_Signal".into(), "MACD_Hist".into()]
            }
            IndicatorType::Stochastic { .. } => vec!["Stoch_K".into(), "Stoch_D".into()],
            IndicatorType::Bollinger { .. } => {
                vec!["BB_Upper".into(), "BB_Middle".into(), "BB_Lower".into()]
            }
            IndicatorType::Pivot => ["Pivot", "R1", "R2", "R3", "S1", "S2", "S3"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            IndicatorType::Ichimoku { .. } => [
                "Tenkan_Sen",
                "Kijun_Sen",
                "Senkou_Span_A",
                "Senkou_Span_B",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        };
        names.iter().map(|n| ColumnSpec::numeric(n)).collect()
    }

    fn compute(&self, series: &PriceSeries) -> Result<Vec<Column>, ScanError> {
        if self.periods().contains(&0) {
            return Err(ScanError::computation(
                &self.to_string(),
                "period must be positive",
            ));
        }
        let closes = series.closes();
        let bars = &series.bars;
        let columns: Vec<Vec<f64>> = match *self {
            IndicatorType::Sma(p) => vec![sma::calculate_sma(&closes, p)],
            IndicatorType::Ema(p) => vec![ema::calculate_ema(&closes, p)],
            IndicatorType::Rsi(p) => vec![rsi::calculate_rsi(&closes, p)],
            IndicatorType::Atr(p) => vec![atr::calculate_atr(bars, p)],
            IndicatorType::Adx(p) => {
                let out = adx::calculate_adx(bars, p);
                vec![out.adx, out.di_plus, out.di_minus]
            }
            IndicatorType::Obv => vec![obv::calculate_obv(&closes, series.volumes().as_deref())],
            IndicatorType::Vwap => {
                vec![vwap::calculate_vwap(&closes, series.volumes().as_deref())]
            }
            IndicatorType::Macd { fast, slow, signal } => {
                let out = macd::calculate_macd(&closes, fast, slow, signal);
                vec![out.line, out.signal, out.histogram]
            }
            IndicatorType::Stochastic {
                period,
                smooth_k,
                smooth_d,
            } => {
                let out = stochastic::calculate_stochastic(bars, period, smooth_k, smooth_d);
                vec![out.k, out.d]
            }
            IndicatorType::Bollinger {
                period,
                stddev_mult_x100,
            } => {
                let out = bollinger::calculate_bollinger(
                    &closes,
                    period,
                    stddev_mult_x100 as f64 / 100.0,
                );
                vec![out.upper, out.middle, out.lower]
            }
            IndicatorType::Pivot => {
                let out = pivot::calculate_pivots(bars);
                vec![out.pivot, out.r1, out.r2, out.r3, out.s1, out.s2, out.s3]
            }
            IndicatorType::Ichimoku {
                tenkan,
                kijun,
                senkou_b,
            } => {
                let out = ichimoku::calculate_ichimoku(bars, tenkan, kijun, senkou_b);
                vec![out.tenkan, out.kijun, out.senkou_a, out.senkou_b]
            }
        };
        Ok(columns.into_iter().map(Column::Numeric).collect())
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma(period) => write!(f, "SMA({})", period),
            IndicatorType::Ema(period) => write!(f, "EMA({})", period),
            IndicatorType::Rsi(period) => write!(f, "RSI({})", period),
            IndicatorType::Atr(period) => write!(f, "ATR({})", period),
            IndicatorType::Adx(period) => write!(f, "ADX({})", period),
            IndicatorType::Obv => write!(f, "OBV"),
            IndicatorType::Vwap => write!(f, "VWAP"),
            IndicatorType::Macd { fast, slow, signal } => {
                write!(f, "MACD({},{},{})", fast, slow, signal)
            }
            IndicatorType::Stochastic {
                period,
                smooth_k,
                smooth_d,
            } => write!(f, "STOCHASTIC({},{},{})", period, smooth_k, smooth_d),
            IndicatorType::Bollinger {
                period,
                stddev_mult_x100,
            } => {
                let mult = *stddev_mult_x100 as f64 / 100.0;
                write!(f, "BOLLINGER({},{})", period, mult)
            }
            IndicatorType::Pivot => write!(f, "PIVOT"),
            IndicatorType::Ichimoku {
                tenkan,
                kijun,
                senkou_b,
            } => write!(f, "ICHIMOKU({},{},{})", tenkan, kijun, senkou_b),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::test_support::make_series;
    use proptest::prelude::*;

    #[test]
    fn indicator_type_display_sma() {
        assert_eq!(IndicatorType::Sma(200).to_string(), "SMA(200)");
    }

    #[test]
    fn indicator_type_display_macd() {
        let macd = IndicatorType::Macd {
            fast: 12,
            slow: 26,
            signal: 9,
        };
        assert_eq!(macd.to_string(), "MACD(12,26,9)");
    }

    #[test]
    fn indicator_type_display_bollinger() {
        let boll = IndicatorType::Bollinger {
            period: 20,
            stddev_mult_x100: 200,
        };
        assert_eq!(boll.to_string(), "BOLLINGER(20,2)");
    }

    #[test]
    fn outputs_name_columns() {
        let names: Vec<String> = IndicatorType::Ema(20)
            .outputs()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["EMA_20"]);
        assert_eq!(IndicatorType::Pivot.outputs().len(), 7);
    }

    #[test]
    fn zero_period_is_a_computation_error() {
        let err = IndicatorType::Rsi(0)
            .compute(&make_series(&[1.0, 2.0]))
            .unwrap_err();
        assert!(matches!(err, ScanError::Computation { .. }));
    }

    fn all_types() -> Vec<IndicatorType> {
        vec![
            IndicatorType::Sma(5),
            IndicatorType::Ema(5),
            IndicatorType::Rsi(14),
            IndicatorType::Atr(14),
            IndicatorType::Adx(14),
            IndicatorType::Obv,
            IndicatorType::Vwap,
            IndicatorType::Macd {
                fast: 12,
                slow: 26,
                signal: 9,
            },
            IndicatorType::Stochastic {
                period: 14,
                smooth_k: 1,
                smooth_d: 3,
            },
            IndicatorType::Bollinger {
                period: 20,
                stddev_mult_x100: 200,
            },
            IndicatorType::Pivot,
            IndicatorType::Ichimoku {
                tenkan: 9,
                kijun: 26,
                senkou_b: 52,
            },
        ]
    }

    proptest! {
        #[test]
        fn every_output_is_aligned(closes in prop::collection::vec(1.0f64..500.0, 0..120)) {
            let series = make_series(&closes);
            for ind in all_types() {
                let columns = ind.compute(&series).unwrap();
                prop_assert_eq!(columns.len(), ind.outputs().len());
                for column in columns {
                    prop_assert_eq!(column.len(), closes.len());
                }
            }
        }
    }
}
