//! Pure indicator math over candle history.
//!
//! Every function here is total: insufficient history yields a
//! documented neutral fallback instead of an error, and nothing performs
//! I/O. Inputs are slices in canonical oldest-first order.

pub mod atr;
pub mod bollinger;
pub mod divergence;
pub mod levels;
pub mod macd;
pub mod rsi;
pub mod trend;
pub mod volume;

pub use atr::atr;
pub use bollinger::{bollinger, BollingerBands};
pub use divergence::{rsi_divergence, Divergence};
pub use levels::{support_resistance, PriceLevels};
pub use macd::{macd, MacdValue};
pub use rsi::{rsi, rsi_series};
pub use trend::{ema, sma};
pub use volume::{volume_analysis, VolumeProfile};

use serde::{Deserialize, Serialize};

use common::{CandleSeries, SignalConfig};

/// Candles examined for RSI divergence.
const DIVERGENCE_LOOKBACK: usize = 5;
/// Trailing window for volume analysis.
const VOLUME_PERIOD: usize = 14;
/// Relative width of a support/resistance price cluster.
const CLUSTER_TOLERANCE: f64 = 0.0005;

/// Indicator values as of the most recent candle of a series.
///
/// Units are explicit: `rsi` and `volume.strength` are percentages in
/// 0–100, `price_volume_correlation` is in [-1, 1], prices are in quote
/// currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorSnapshot {
    pub rsi: f64,
    pub macd: MacdValue,
    pub ema9: f64,
    pub ema21: f64,
    pub sma50: f64,
    pub bollinger: BollingerBands,
    pub atr: f64,
    pub volume: VolumeProfile,
    pub divergence: Divergence,
    pub support_resistance: PriceLevels,
}

/// Compute the full snapshot for the latest candle of `series`.
pub fn compute_snapshot(series: &CandleSeries, config: &SignalConfig) -> IndicatorSnapshot {
    let closes = series.closes();
    let highs = series.highs();
    let lows = series.lows();
    let volumes = series.volumes();
    let close = closes.last().copied().unwrap_or(0.0);

    let rsi_values = rsi_series(&closes, config.rsi_period);
    let rsi_now = rsi_values.last().copied().unwrap_or(50.0);

    IndicatorSnapshot {
        rsi: rsi_now,
        macd: macd(&closes, config.macd_fast, config.macd_slow, config.macd_signal),
        ema9: ema(&closes, config.ema_short),
        ema21: ema(&closes, config.ema_long),
        sma50: sma(&closes, config.sma_period),
        bollinger: bollinger(&closes, config.bb_period, config.bb_std_dev),
        atr: atr(&highs, &lows, &closes, config.atr_period),
        volume: volume_analysis(&volumes, &closes, VOLUME_PERIOD),
        divergence: rsi_divergence(&closes, &rsi_values, DIVERGENCE_LOOKBACK),
        support_resistance: support_resistance(&highs, &lows, close, CLUSTER_TOLERANCE),
    }
}
