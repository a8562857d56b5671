/// Exponential Moving Average over `values` (oldest first).
///
/// Seeded with the simple mean of the first `period` values, then
/// `ema += (value - ema) * k` with `k = 2 / (period + 1)` over the rest.
/// Returns the last input value when fewer than `period` values exist,
/// and 0.0 on an empty slice.
pub fn ema(values: &[f64], period: usize) -> f64 {
    let Some(&last) = values.last() else {
        return 0.0;
    };
    if period == 0 || values.len() < period {
        return last;
    }

    let k = 2.0 / (period as f64 + 1.0);
    let mut ema = values[..period].iter().sum::<f64>() / period as f64;
    for &value in &values[period..] {
        ema += (value - ema) * k;
    }
    ema
}

/// Simple Moving Average of the trailing `period` values.
///
/// Returns the last input value when fewer than `period` values exist,
/// and 0.0 on an empty slice.
pub fn sma(values: &[f64], period: usize) -> f64 {
    let Some(&last) = values.last() else {
        return 0.0;
    };
    if period == 0 || values.len() < period {
        return last;
    }
    values[values.len() - period..].iter().sum::<f64>() / period as f64
}
