//! Classic pivot points from the prior bar's high, low and close.
//!
//! P  = (H + L + C) / 3
//! R1 = 2P - L, S1 = 2P - H
//! R2 = P + (H - L), S2 = P - (H - L)
//! R3 = H + 2(P - L), S3 = L - 2(H - P)
//!
//! The first bar has no prior bar and is undefined.

use crate::domain::ohlcv::OhlcvBar;

#[derive(Debug, Clone, PartialEq)]
pub struct PivotOutput {
    pub pivot: Vec<f64>,
    pub r1: Vec<f64>,
    pub r2: Vec<f64>,
    pub r3: Vec<f64>,
    pub s1: Vec<f64>,
    pub s2: Vec<f64>,
    pub s3: Vec<f64>,
}

pub fn calculate_pivots(bars: &[OhlcvBar]) -> PivotOutput {
    let len = bars.len();
    let mut out = PivotOutput {
        pivot: vec![f64::NAN; len],
        r1: vec![f64::NAN; len],
        r2: vec![f64::NAN; len],
        r3: vec![f64::NAN; len],
        s1: vec![f64::NAN; len],
        s2: vec![f64::NAN; len],
        s3: vec![f64::NAN; len],
    };

    for i in 1..len {
        let prev = &bars[i - 1];
        let (h, l) = (prev.high, prev.low);
        let p = prev.typical_price();
        out.pivot[i] = p;
        out.r1[i] = 2.0 * p - l;
        out.s1[i] = 2.0 * p - h;
        out.r2[i] = p + (h - l);
        out.s2[i] = p - (h - l);
        out.r3[i] = h + 2.0 * (p - l);
        out.s3[i] = l - 2.0 * (h - p);
    }
    out
}
