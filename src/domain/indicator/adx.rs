//! ADX (Average Directional Index) with DI+ and DI-.
//!
//! Directional movement and true range are Wilder-smoothed starting from the
//! sum of the first n values (bars 1..=n). DI is defined from bar n, ADX
//! (the Wilder average of DX) from bar 2n-1.

use crate::domain::ohlcv::OhlcvBar;

#[derive(Debug, Clone, PartialEq)]
pub struct AdxOutput {
    pub adx: Vec<f64>,
    pub di_plus: Vec<f64>,
    pub di_minus: Vec<f64>,
}

pub fn calculate_adx(bars: &[OhlcvBar], period: usize) -> AdxOutput {
    let len = bars.len();
    let mut out = AdxOutput {
        adx: vec![f64::NAN; len],
        di_plus: vec![f64::NAN; len],
        di_minus: vec![f64::NAN; len],
    };
    if period == 0 || len <= period {
        return out;
    }

    let mut tr = vec![0.0; len];
    let mut plus_dm = vec![0.0; len];
    let mut minus_dm = vec![0.0; len];
    for i in 1..len {
        let up = bars[i].high - bars[i - 1].high;
        let down = bars[i - 1].low - bars[i].low;
        plus_dm[i] = if up > down && up > 0.0 { up } else { 0.0 };
        minus_dm[i] = if down > up && down > 0.0 { down } else { 0.0 };
        tr[i] = bars[i].true_range(bars[i - 1].close);
    }

    let n = period as f64;
    let mut s_tr: f64 = tr[1..=period].iter().sum();
    let mut s_plus: f64 = plus_dm[1..=period].iter().sum();
    let mut s_minus: f64 = minus_dm[1..=period].iter().sum();
    let mut dx = vec![f64::NAN; len];

    for i in period..len {
        if i > period {
            s_tr = s_tr - s_tr / n + tr[i];
            s_plus = s_plus - s_plus / n + plus_dm[i];
            s_minus = s_minus - s_minus / n + minus_dm[i];
        }
        let (dip, dim) = if s_tr == 0.0 {
            (0.0, 0.0)
        } else {
            (100.0 * s_plus / s_tr, 100.0 * s_minus / s_tr)
        };
        out.di_plus[i] = dip;
        out.di_minus[i] = dim;
        let sum = dip + dim;
        dx[i] = if sum == 0.0 {
            0.0
        } else {
            100.0 * (dip - dim).abs() / sum
        };
    }

    let first_adx = 2 * period - 1;
    if len > first_adx {
        let mut adx = dx[period..=first_adx].iter().sum::<f64>() / n;
        out.adx[first_adx] = adx;
        for i in (first_adx + 1)..len {
            adx = (adx * (n - 1.0) + dx[i]) / n;
            out.adx[i] = adx;
        }
    }
    out
}
