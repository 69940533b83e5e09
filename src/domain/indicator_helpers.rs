//! Rolling-window and smoothing helpers shared by the indicator and pattern code.
//!
//! All helpers take and return aligned `f64` slices with `NaN` marking an
//! undefined value.

use crate::domain::ohlcv::OhlcvBar;

/// Rolling mean that averages however many defined points the window holds.
///
/// `NaN` only where the window contains no defined input.
pub fn rolling_mean_partial(values: &[f64], period: usize) -> Vec<f64> {
    if period == 0 {
        return vec![f64::NAN; values.len()];
    }
    (0..values.len())
        .map(|i| {
            let start = (i + 1).saturating_sub(period);
            let (sum, count) = values[start..=i]
                .iter()
                .filter(|v| !v.is_nan())
                .fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
            if count == 0 { f64::NAN } else { sum / count as f64 }
        })
        .collect()
}

/// Rolling mean over a full window; `NaN` until `period` defined points are
/// available and whenever the window holds an undefined point.
pub fn rolling_mean(values: &[f64], period: usize) -> Vec<f64> {
    full_window(values, period, |w| w.iter().sum::<f64>() / w.len() as f64)
}

/// Rolling population standard deviation (divides by N).
pub fn rolling_std(values: &[f64], period: usize) -> Vec<f64> {
    full_window(values, period, |w| {
        let mean = w.iter().sum::<f64>() / w.len() as f64;
        let variance = w.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / w.len() as f64;
        variance.sqrt()
    })
}

pub fn rolling_max(values: &[f64], period: usize) -> Vec<f64> {
    full_window(values, period, |w| {
        w.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    })
}

pub fn rolling_min(values: &[f64], period: usize) -> Vec<f64> {
    full_window(values, period, |w| {
        w.iter().copied().fold(f64::INFINITY, f64::min)
    })
}

fn full_window(values: &[f64], period: usize, f: impl Fn(&[f64]) -> f64) -> Vec<f64> {
    let mut out = vec![f64::NAN; values.len()];
    if period == 0 {
        return out;
    }
    for i in (period - 1)..values.len() {
        let window = &values[i + 1 - period..=i];
        if window.iter().all(|v| !v.is_nan()) {
            out[i] = f(window);
        }
    }
    out
}

/// Exponentially weighted mean, `y[i] = a * x[i] + (1 - a) * y[i-1]`, seeded
/// with the first defined value.
///
/// Output stays `NaN` until `min_periods` defined observations have been seen.
/// An undefined input carries the previous mean forward.
pub fn ewm(values: &[f64], alpha: f64, min_periods: usize) -> Vec<f64> {
    let mut out = Vec::with_capacity(values.len());
    let mut mean: Option<f64> = None;
    let mut seen = 0usize;
    for &v in values {
        if !v.is_nan() {
            seen += 1;
            mean = Some(match mean {
                None => v,
                Some(prev) => alpha * v + (1.0 - alpha) * prev,
            });
        }
        match mean {
            Some(m) if seen >= min_periods.max(1) => out.push(m),
            _ => out.push(f64::NAN),
        }
    }
    out
}

/// Shift a series forward by `n` bars, filling the head with `NaN`.
pub fn shift(values: &[f64], n: usize) -> Vec<f64> {
    let len = values.len();
    let mut out = vec![f64::NAN; len];
    if n < len {
        out[n..].copy_from_slice(&values[..len - n]);
    }
    out
}

/// True range per bar; the first bar uses high - low.
pub fn true_ranges(bars: &[OhlcvBar]) -> Vec<f64> {
    bars.iter()
        .enumerate()
        .map(|(i, bar)| {
            if i == 0 {
                bar.high - bar.low
            } else {
                bar.true_range(bars[i - 1].close)
            }
        })
        .collect()
}

/// Wilder smoothing: seed at `period - 1` with the mean of the first `period`
/// values, then `avg = (prev * (period - 1) + x) / period`.
pub fn wilder_average(values: &[f64], period: usize) -> Vec<f64> {
    let mut out = vec![f64::NAN; values.len()];
    if period == 0 || values.len() < period {
        return out;
    }
    let mut avg = values[..period].iter().sum::<f64>() / period as f64;
    out[period - 1] = avg;
    for i in period..values.len() {
        avg = (avg * (period - 1) as f64 + values[i]) / period as f64;
        out[i] = avg;
    }
    out
}
