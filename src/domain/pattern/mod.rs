//! Chart-pattern detectors.
//!
//! Every detector scans a trailing window ending at each bar and returns a
//! flag series aligned with the input. Series shorter than a detector's
//! lookback produce all-false output.

pub mod cup_handle;
pub mod double;
pub mod flag;
pub mod head_shoulders;
pub mod triangle;
pub mod trendline;
pub mod wedge;

use crate::domain::error::ScanError;
use crate::domain::ohlcv::PriceSeries;

/// Guard added to denominators.
pub const EPS: f64 = 1e-9;

pub trait PatternDetector: Send + Sync {
    fn name(&self) -> String;
    fn detect(&self, series: &PriceSeries) -> Result<Vec<bool>, ScanError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PatternType {
    DoubleBottom { lookback: usize, tolerance: f64 },
    DoubleTop { lookback: usize, tolerance: f64 },
    HeadShoulders { lookback: usize, order: usize },
    InvHeadShoulders { lookback: usize, order: usize },
    TrendlineBreak {
        direction: Direction,
        lookback: usize,
        min_break: f64,
    },
    Triangle { lookback: usize },
    CupHandle { lookback: usize },
    Flag { lookback: usize },
    Wedge { direction: Direction, lookback: usize },
}

impl PatternDetector for PatternType {
    fn name(&self) -> String {
        match self {
            PatternType::DoubleBottom { .. } => "Double_Bottom",
            PatternType::DoubleTop { .. } => "Double_Top",
            PatternType::HeadShoulders { .. } => "Head_Shoulders",
            PatternType::InvHeadShoulders { .. } => "Inv_Head_Shoulders",
            PatternType::TrendlineBreak {
                direction: Direction::Up,
                ..
            } => "TL_Break_Up",
            PatternType::TrendlineBreak {
                direction: Direction::Down,
                ..
            } => "TL_Break_Down",
            PatternType::Triangle { .. } => "Triangle",
            PatternType::CupHandle { .. } => "Cup_Handle",
            PatternType::Flag { .. } => "Flag",
            PatternType::Wedge {
                direction: Direction::Up,
                ..
            } => "Rising_Wedge",
            PatternType::Wedge {
                direction: Direction::Down,
                ..
            } => "Falling_Wedge",
        }
        .to_string()
    }

    fn detect(&self, series: &PriceSeries) -> Result<Vec<bool>, ScanError> {
        let closes = series.closes();
        let flags = match *self {
            PatternType::DoubleBottom {
                lookback,
                tolerance,
            } => double::detect_double(&closes, Direction::Down, lookback, tolerance),
            PatternType::DoubleTop {
                lookback,
                tolerance,
            } => double::detect_double(&closes, Direction::Up, lookback, tolerance),
            PatternType::HeadShoulders { lookback, order } => {
                head_shoulders::detect_head_shoulders(&closes, Direction::Up, lookback, order)
            }
            PatternType::InvHeadShoulders { lookback, order } => {
                head_shoulders::detect_head_shoulders(&closes, Direction::Down, lookback, order)
            }
            PatternType::TrendlineBreak {
                direction,
                lookback,
                min_break,
            } => trendline::detect_trendline_break(&closes, direction, lookback, min_break),
            PatternType::Triangle { lookback } => {
                triangle::detect_triangle(&series.highs(), &series.lows(), lookback)
            }
            PatternType::CupHandle { lookback } => {
                cup_handle::detect_cup_handle(&closes, lookback)
            }
            PatternType::Flag { lookback } => flag::detect_flag(&closes, lookback),
            PatternType::Wedge {
                direction,
                lookback,
            } => wedge::detect_wedge(&series.highs(), &series.lows(), direction, lookback),
        };
        Ok(flags)
    }
}

/// Least-squares line through `(i, y[i])`, returning `(slope, intercept)`.
///
/// Fails on fewer than two points or any non-finite value.
pub fn linear_fit(y: &[f64]) -> Result<(f64, f64), ScanError> {
    if y.len() < 2 {
        return Err(ScanError::computation(
            "linear_fit",
            "need at least two points",
        ));
    }
    if y.iter().any(|v| !v.is_finite()) {
        return Err(ScanError::computation("linear_fit", "non-finite input"));
    }
    let n = y.len() as f64;
    let mean_x = (n - 1.0) / 2.0;
    let mean_y = y.iter().sum::<f64>() / n;
    let (mut sxy, mut sxx) = (0.0, 0.0);
    for (i, &v) in y.iter().enumerate() {
        let dx = i as f64 - mean_x;
        sxy += dx * (v - mean_y);
        sxx += dx * dx;
    }
    let slope = sxy / sxx;
    Ok((slope, mean_y - slope * mean_x))
}

/// Slope of the fitted line, or `None` when the fit is degenerate.
pub(crate) fn slope(y: &[f64]) -> Option<f64> {
    linear_fit(y).ok().map(|(s, _)| s)
}
