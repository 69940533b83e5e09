//! Cumulative VWAP: cumulative(close * volume) / cumulative(volume).
//!
//! Falls back to the close itself when the series has no volume. A bar whose
//! cumulative volume is zero is undefined.

pub fn calculate_vwap(closes: &[f64], volumes: Option<&[f64]>) -> Vec<f64> {
    let Some(volumes) = volumes else {
        return closes.to_vec();
    };

    let mut pv = 0.0;
    let mut vol = 0.0;
    closes
        .iter()
        .zip(volumes)
        .map(|(&c, &v)| {
            pv += c * v;
            vol += v;
            if vol == 0.0 { f64::NAN } else { pv / vol }
        })
        .collect()
}
