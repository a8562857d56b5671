use serde::{Deserialize, Serialize};

use super::trend::sma;

/// A Bollinger envelope around the trailing SMA.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BollingerBands {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
}

/// Bollinger Bands: SMA middle ± `std_dev_mult` × population std-dev
/// (ddof = 0) of the trailing `period` closes.
///
/// With insufficient history the bands degrade to a flat ±2% envelope
/// around the last price.
pub fn bollinger(closes: &[f64], period: usize, std_dev_mult: f64) -> BollingerBands {
    let Some(&last) = closes.last() else {
        return BollingerBands::default();
    };
    if period == 0 || closes.len() < period {
        return BollingerBands {
            upper: last * 1.02,
            middle: last,
            lower: last * 0.98,
        };
    }

    let middle = sma(closes, period);
    let window = &closes[closes.len() - period..];
    let variance =
        window.iter().map(|v| (v - middle) * (v - middle)).sum::<f64>() / period as f64;
    let std_dev = variance.sqrt();

    BollingerBands {
        upper: middle + std_dev_mult * std_dev,
        middle,
        lower: middle - std_dev_mult * std_dev,
    }
}
