use serde::{Deserialize, Serialize};

/// Volume pressure relative to the recent average, plus a crude
/// price/volume agreement score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeProfile {
    /// `clamp((latest / trailing average) × 50, 0, 100)` — average
    /// volume reads 50, twice average saturates toward 100.
    pub strength: f64,
    /// Directional-agreement score in [-1, 1]: same-sign
    /// (price delta, volume delta) pairs minus opposite-sign pairs,
    /// normalized by the number of pairs that moved at all. This is NOT
    /// a Pearson correlation — it is kept intentionally crude.
    pub price_volume_correlation: f64,
}

impl Default for VolumeProfile {
    fn default() -> Self {
        Self {
            strength: 50.0,
            price_volume_correlation: 0.0,
        }
    }
}

/// Analyze the trailing `period` candles of volume against closes.
/// The trailing average includes the latest candle.
pub fn volume_analysis(volumes: &[f64], closes: &[f64], period: usize) -> VolumeProfile {
    let len = volumes.len().min(closes.len());
    if period == 0 || len < 2 {
        return VolumeProfile::default();
    }

    let window = period.min(len);
    let avg = volumes[len - window..len].iter().sum::<f64>() / window as f64;
    let latest = volumes[len - 1];
    let strength = if avg > 0.0 {
        ((latest / avg) * 50.0).clamp(0.0, 100.0)
    } else {
        50.0
    };

    let mut agree = 0i64;
    let mut oppose = 0i64;
    for i in len - window + 1..len {
        let price_delta = closes[i] - closes[i - 1];
        let volume_delta = volumes[i] - volumes[i - 1];
        if price_delta == 0.0 || volume_delta == 0.0 {
            continue;
        }
        if (price_delta > 0.0) == (volume_delta > 0.0) {
            agree += 1;
        } else {
            oppose += 1;
        }
    }
    let moved = agree + oppose;
    let price_volume_correlation = if moved > 0 {
        (agree - oppose) as f64 / moved as f64
    } else {
        0.0
    };

    VolumeProfile {
        strength,
        price_volume_correlation,
    }
}
