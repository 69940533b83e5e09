//! OBV (On-Balance Volume).

/// Calculate OBV (On-Balance Volume).
///
/// OBV[0] = volume[0]
/// If close[i] > close[i-1]: OBV[i] = OBV[i-1] + volume[i]
/// If close[i] < close[i-1]: OBV[i] = OBV[i-1] - volume[i]
/// If close[i] == close[i-1]: OBV[i] = OBV[i-1]
///
/// No warmup period. Without a volume column the result is all zeros.
pub fn calculate_obv(closes: &[f64], volumes: Option<&[f64]>) -> Vec<f64> {
    let Some(volumes) = volumes else {
        return vec![0.0; closes.len()];
    };

    let mut values = Vec::with_capacity(closes.len());
    let mut obv = 0.0;
    for (i, (&close, &volume)) in closes.iter().zip(volumes).enumerate() {
        if i == 0 {
            obv = volume;
        } else if close > closes[i - 1] {
            obv += volume;
        } else if close < closes[i - 1] {
            obv -= volume;
        }
        values.push(obv);
    }
    values
}
