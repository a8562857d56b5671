use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One OHLCV bar supplied by the market-data layer.
///
/// Candle data is read-only to the core: indicators and the backtest
/// simulator never mutate it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// An ordered candle history.
///
/// The canonical ordering is **oldest first**. Upstream feeds that emit
/// newest-first arrays must convert at the boundary via
/// [`CandleSeries::from_newest_first`]; nothing past this type ever
/// reasons about ordering again.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandleSeries {
    candles: Vec<Candle>,
}

impl CandleSeries {
    /// Wrap candles already in canonical oldest-first order.
    pub fn new(candles: Vec<Candle>) -> Self {
        Self { candles }
    }

    /// Convert a newest-first feed into canonical order.
    pub fn from_newest_first(mut candles: Vec<Candle>) -> Self {
        candles.reverse();
        Self { candles }
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    /// Most recent candle, if any.
    pub fn last(&self) -> Option<&Candle> {
        self.candles.last()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.close).collect()
    }

    pub fn highs(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.high).collect()
    }

    pub fn lows(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.low).collect()
    }

    pub fn volumes(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.volume).collect()
    }

    /// The trailing window ending at index `end` (inclusive), at most
    /// `max_len` candles long. Used by the backtest loop to evaluate the
    /// engine as of a historical candle.
    pub fn window_ending(&self, end: usize, max_len: usize) -> CandleSeries {
        if self.candles.is_empty() {
            return Self::default();
        }
        let end = end.min(self.candles.len() - 1);
        let start = (end + 1).saturating_sub(max_len);
        Self {
            candles: self.candles[start..=end].to_vec(),
        }
    }
}

/// Direction of a trading signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Buy,
    Sell,
    Neutral,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Buy => write!(f, "BUY"),
            Direction::Sell => write!(f, "SELL"),
            Direction::Neutral => write!(f, "NEUTRAL"),
        }
    }
}

/// Trend hint for one higher timeframe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Flat,
}

/// Optional higher-timeframe trend hints passed to the signal engine.
/// Agreement across these is informational only — it annotates the
/// signal's reasons without moving the score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeframeTrends {
    pub m5: Trend,
    pub m15: Trend,
    pub m30: Trend,
}

impl TimeframeTrends {
    /// How many of the three timeframes agree with `direction`.
    pub fn agreeing(&self, direction: Direction) -> usize {
        let wanted = match direction {
            Direction::Buy => Trend::Up,
            Direction::Sell => Trend::Down,
            Direction::Neutral => return 0,
        };
        [self.m5, self.m15, self.m30]
            .iter()
            .filter(|&&t| t == wanted)
            .count()
    }
}

/// The engine's verdict for one evaluation.
///
/// Produced fresh per call and immutable once returned. A NEUTRAL signal
/// carries zeroed risk fields — no trade is proposed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Signal {
    pub direction: Direction,
    /// Signal strength in percent, 0–100.
    pub confidence: f64,
    /// Human-readable explanations, in the order they were applied.
    pub reasons: Vec<String>,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub risk_reward_ratio: f64,
    pub position_size: f64,
}

impl Signal {
    /// A no-trade signal with an explanatory reason.
    pub fn neutral(confidence: f64, reason: impl Into<String>) -> Self {
        Self {
            direction: Direction::Neutral,
            confidence,
            reasons: vec![reason.into()],
            stop_loss: 0.0,
            take_profit: 0.0,
            risk_reward_ratio: 0.0,
            position_size: 0.0,
        }
    }
}

/// Win/loss classification of a closed trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeOutcome {
    Win,
    Loss,
}

impl std::fmt::Display for TradeOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TradeOutcome::Win => write!(f, "WIN"),
            TradeOutcome::Loss => write!(f, "LOSS"),
        }
    }
}

/// Immutable record of a completed simulated trade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClosedTrade {
    pub direction: Direction,
    pub entry_price: f64,
    pub entry_time: DateTime<Utc>,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub size: f64,
    pub exit_price: f64,
    pub exit_time: DateTime<Utc>,
    pub profit: f64,
    pub result: TradeOutcome,
}

/// One sample of the backtest equity curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EquityPoint {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

/// Aggregate outcome of one backtest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BacktestResult {
    pub initial_balance: f64,
    pub final_balance: f64,
    pub trades: Vec<ClosedTrade>,
    pub equity: Vec<EquityPoint>,
    /// Winning trades as a percentage of all trades.
    pub win_rate: f64,
    /// Gross profit over gross loss magnitude.
    pub profit_factor: f64,
    /// Largest peak-to-trough equity decline, in percent of the peak.
    pub max_drawdown: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(i: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + i * 60, 0).unwrap()
    }

    fn candle(i: i64, close: f64) -> Candle {
        Candle {
            timestamp: ts(i),
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 100.0,
        }
    }

    #[test]
    fn newest_first_feed_is_reversed_to_canonical_order() {
        let newest_first = vec![candle(2, 102.0), candle(1, 101.0), candle(0, 100.0)];
        let series = CandleSeries::from_newest_first(newest_first);
        assert_eq!(series.closes(), vec![100.0, 101.0, 102.0]);
        assert_eq!(series.last().unwrap().close, 102.0);
    }

    #[test]
    fn window_ending_caps_length_and_keeps_order() {
        let series = CandleSeries::new((0..10).map(|i| candle(i, 100.0 + i as f64)).collect());
        let window = series.window_ending(7, 3);
        assert_eq!(window.closes(), vec![105.0, 106.0, 107.0]);

        // Window longer than the available history returns everything up to `end`
        let window = series.window_ending(2, 50);
        assert_eq!(window.len(), 3);
    }

    #[test]
    fn timeframe_agreement_counts_matching_trends() {
        let trends = TimeframeTrends {
            m5: Trend::Up,
            m15: Trend::Up,
            m30: Trend::Down,
        };
        assert_eq!(trends.agreeing(Direction::Buy), 2);
        assert_eq!(trends.agreeing(Direction::Sell), 1);
        assert_eq!(trends.agreeing(Direction::Neutral), 0);
    }

    #[test]
    fn signal_json_uses_wire_field_names() {
        let signal = Signal {
            direction: Direction::Buy,
            confidence: 82.5,
            reasons: vec!["RSI 27.1 oversold".into()],
            stop_loss: 97.0,
            take_profit: 106.0,
            risk_reward_ratio: 2.0,
            position_size: 1.5,
        };
        let json = serde_json::to_value(&signal).unwrap();
        assert_eq!(json["direction"], "BUY");
        assert!(json.get("stopLoss").is_some());
        assert!(json.get("takeProfit").is_some());
        assert!(json.get("riskRewardRatio").is_some());
        assert!(json.get("positionSize").is_some());
    }

    #[test]
    fn signal_round_trips_through_json() {
        let signal = Signal {
            direction: Direction::Sell,
            confidence: 74.0,
            reasons: vec!["RSI 71.3 overbought".into(), "price below SMA50".into()],
            stop_loss: 105.0,
            take_profit: 92.0,
            risk_reward_ratio: 1.6,
            position_size: 0.4,
        };
        let json = serde_json::to_string(&signal).unwrap();
        let back: Signal = serde_json::from_str(&json).unwrap();
        assert_eq!(back, signal);
    }

    #[test]
    fn backtest_result_round_trips_through_json() {
        let result = BacktestResult {
            initial_balance: 10_000.0,
            final_balance: 10_450.0,
            trades: vec![ClosedTrade {
                direction: Direction::Buy,
                entry_price: 100.0,
                entry_time: ts(0),
                stop_loss: 98.0,
                take_profit: 105.0,
                size: 2.0,
                exit_price: 105.0,
                exit_time: ts(9),
                profit: 10.0,
                result: TradeOutcome::Win,
            }],
            equity: vec![
                EquityPoint { timestamp: ts(0), value: 10_000.0 },
                EquityPoint { timestamp: ts(9), value: 10_450.0 },
            ],
            win_rate: 100.0,
            profit_factor: 10.0,
            max_drawdown: 0.0,
        };
        let json = serde_json::to_string(&result).unwrap();
        let back: BacktestResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back, result);

        let value = serde_json::to_value(&result).unwrap();
        assert!(value.get("initialBalance").is_some());
        assert!(value.get("winRate").is_some());
        assert!(value.get("profitFactor").is_some());
        assert!(value.get("maxDrawdown").is_some());
        assert_eq!(value["trades"][0]["result"], "WIN");
    }
}
