use serde::{Deserialize, Serialize};

/// RSI/price divergence flags for the latest candle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Divergence {
    pub bullish: bool,
    pub bearish: bool,
}

/// Detect RSI divergence over the trailing `lookback` closes.
///
/// Bullish: the latest close sits at or below the lowest close of the
/// prior window while the RSI sits above the RSI recorded at that prior
/// low — price made a new low the oscillator refused to confirm.
/// Bearish mirrors the condition on the high side of the close series.
///
/// `rsi_by_index` must align with `closes` index-for-index (see
/// [`super::rsi_series`]). Windows shorter than `lookback` report no
/// divergence.
pub fn rsi_divergence(closes: &[f64], rsi_by_index: &[f64], lookback: usize) -> Divergence {
    let len = closes.len().min(rsi_by_index.len());
    if lookback < 2 || len < lookback {
        return Divergence::default();
    }

    let closes = &closes[len - lookback..len];
    let rsi = &rsi_by_index[len - lookback..len];
    let last = lookback - 1;

    let mut min_i = 0;
    let mut max_i = 0;
    for i in 1..last {
        if closes[i] < closes[min_i] {
            min_i = i;
        }
        if closes[i] > closes[max_i] {
            max_i = i;
        }
    }

    Divergence {
        bullish: closes[last] <= closes[min_i] && rsi[last] > rsi[min_i],
        bearish: closes[last] >= closes[max_i] && rsi[last] < rsi[max_i],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_low_with_stronger_rsi_is_bullish() {
        let closes = vec![10.0, 9.0, 8.0, 7.0, 6.5];
        let rsi = vec![30.0, 28.0, 26.0, 24.0, 35.0];
        let d = rsi_divergence(&closes, &rsi, 5);
        assert!(d.bullish);
        assert!(!d.bearish);
    }

    #[test]
    fn new_high_with_weaker_rsi_is_bearish() {
        let closes = vec![10.0, 11.0, 12.0, 13.0, 13.5];
        let rsi = vec![60.0, 65.0, 70.0, 75.0, 62.0];
        let d = rsi_divergence(&closes, &rsi, 5);
        assert!(d.bearish);
        assert!(!d.bullish);
    }

    #[test]
    fn confirming_oscillator_is_no_divergence() {
        // Price new low and RSI new low together: trend confirmed
        let closes = vec![10.0, 9.0, 8.0, 7.0, 6.5];
        let rsi = vec![40.0, 35.0, 30.0, 25.0, 20.0];
        assert_eq!(rsi_divergence(&closes, &rsi, 5), Divergence::default());
    }

    #[test]
    fn short_window_reports_nothing() {
        let closes = vec![10.0, 9.0];
        let rsi = vec![50.0, 45.0];
        assert_eq!(rsi_divergence(&closes, &rsi, 5), Divergence::default());
    }
}
