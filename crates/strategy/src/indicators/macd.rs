use serde::{Deserialize, Serialize};

use super::trend::ema;

/// One MACD reading: line, signal line, and their difference.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MacdValue {
    pub macd: f64,
    pub signal: f64,
    pub histogram: f64,
}

/// MACD (Moving Average Convergence/Divergence).
///
/// `macd = EMA(fast) − EMA(slow)`. The signal line is the EMA of a
/// rolling series of MACD values, each recomputed over a growing prefix
/// of the input — O(n · slow) but deterministic and windowing-free.
/// Returns all zeroes when fewer than `slow + signal_period` closes
/// exist.
pub fn macd(closes: &[f64], fast: usize, slow: usize, signal_period: usize) -> MacdValue {
    if fast == 0 || slow == 0 || signal_period == 0 || closes.len() < slow + signal_period {
        return MacdValue::default();
    }

    let macd_line: Vec<f64> = (slow - 1..closes.len())
        .map(|i| {
            let prefix = &closes[..=i];
            ema(prefix, fast) - ema(prefix, slow)
        })
        .collect();

    let macd_now = macd_line[macd_line.len() - 1];
    let signal = ema(&macd_line, signal_period);

    MacdValue {
        macd: macd_now,
        signal,
        histogram: macd_now - signal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_history_returns_zeroes() {
        let prices = vec![100.0; 30]; // need >= 35 for 12/26/9
        assert_eq!(macd(&prices, 12, 26, 9), MacdValue::default());
    }

    #[test]
    fn sustained_uptrend_has_positive_macd_line() {
        let prices: Vec<f64> = (0..60).map(|i| 100.0 + i as f64).collect();
        let value = macd(&prices, 12, 26, 9);
        assert!(value.macd > 0.0, "MACD line should be positive: {value:?}");
        assert!(value.signal.is_finite());
        assert!(value.histogram.is_finite());
    }

    #[test]
    fn fresh_rally_pushes_macd_above_signal() {
        // Decline, then a sharp reversal: the MACD line reacts faster than
        // its smoothed signal line, so the histogram turns positive.
        let mut prices: Vec<f64> = (0..40).map(|i| 200.0 - i as f64 * 0.5).collect();
        prices.extend((0..20).map(|i| 180.0 + i as f64 * 3.0));
        let value = macd(&prices, 12, 26, 9);
        assert!(value.histogram > 0.0, "histogram should be positive: {value:?}");
        assert!(value.macd > value.signal);
    }

    #[test]
    fn histogram_is_line_minus_signal() {
        let prices: Vec<f64> = (0..50).map(|i| 100.0 + (i as f64 * 0.3).sin() * 4.0).collect();
        let value = macd(&prices, 12, 26, 9);
        assert!((value.histogram - (value.macd - value.signal)).abs() < 1e-12);
    }
}
