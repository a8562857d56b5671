use tracing::debug;

use common::{CandleSeries, Direction, Result, Signal, SignalConfig, TimeframeTrends};
use risk::RiskConfig;

use crate::indicators::{self, IndicatorSnapshot};

// Indicator weights. They sum to 1.0, so a fully confirmed side scores
// 100 before the volatility adjustment.
const W_RSI: f64 = 0.25;
const W_MACD: f64 = 0.20;
const W_EMA_CROSS: f64 = 0.15;
const W_SMA_TREND: f64 = 0.10;
const W_VOLUME: f64 = 0.20;
const W_SENTIMENT: f64 = 0.10;

/// Volume must run this far above its trailing average to confirm a move.
const VOLUME_CONFIRM_RATIO: f64 = 1.2;
/// Sentiment inside ±this band is treated as noise.
const SENTIMENT_DEADBAND: f64 = 0.1;

/// Combines indicator readings, an optional sentiment score, and
/// optional higher-timeframe trend hints into one [`Signal`].
///
/// Scoring is two independent weighted sums — a buy score and a sell
/// score — so no indicator's contribution depends on evaluation order.
/// Each indicator feeds at most one side per evaluation.
pub struct SignalEngine {
    config: SignalConfig,
    risk: RiskConfig,
}

impl SignalEngine {
    /// Build an engine with default risk multipliers. Fails fast on an
    /// invalid configuration; nothing is validated again per evaluation.
    pub fn new(config: SignalConfig) -> Result<Self> {
        Self::with_risk(config, RiskConfig::default())
    }

    pub fn with_risk(config: SignalConfig, risk: RiskConfig) -> Result<Self> {
        config.validate()?;
        risk.validate()?;
        Ok(Self { config, risk })
    }

    pub fn config(&self) -> &SignalConfig {
        &self.config
    }

    /// Evaluate the series as of its most recent candle.
    ///
    /// `sentiment` is an externally supplied score in [-1, 1] (the
    /// source is out of scope here — only the number is consumed).
    /// `account_balance` feeds position sizing on actionable signals.
    pub fn evaluate(
        &self,
        series: &CandleSeries,
        sentiment: Option<f64>,
        trends: Option<&TimeframeTrends>,
        account_balance: f64,
    ) -> Signal {
        let Some(last) = series.last() else {
            return Signal::neutral(0.0, "no candle history available");
        };
        let price = last.close;
        let snapshot = indicators::compute_snapshot(series, &self.config);

        let mut buy_score = 0.0;
        let mut sell_score = 0.0;
        let mut reasons: Vec<String> = Vec::new();

        self.score_rsi(&snapshot, &mut buy_score, &mut sell_score, &mut reasons);
        score_macd(&snapshot, &mut buy_score, &mut sell_score, &mut reasons);
        score_ema_cross(&snapshot, &mut buy_score, &mut sell_score, &mut reasons);
        score_sma_trend(price, &snapshot, &mut buy_score, &mut sell_score, &mut reasons);
        score_sentiment(sentiment, &mut buy_score, &mut sell_score, &mut reasons);

        // Volume confirms whichever side the other indicators favor;
        // it never originates a direction on its own.
        score_volume(series, &snapshot, &mut buy_score, &mut sell_score, &mut reasons);

        // Volatility scales both sides identically, so it can push a
        // signal across the strength threshold but never flip it.
        let atr_pct = if price > 0.0 { snapshot.atr / price * 100.0 } else { 0.0 };
        let multiplier = if atr_pct > 1.5 {
            1.0 + (atr_pct - 1.5) * 0.1
        } else if atr_pct < 0.5 {
            0.9
        } else {
            1.0
        };
        buy_score *= multiplier;
        sell_score *= multiplier;
        if multiplier > 1.0 {
            reasons.push(format!("elevated volatility ({atr_pct:.2}% ATR) amplifying signal"));
        } else if multiplier < 1.0 {
            reasons.push(format!("muted volatility ({atr_pct:.2}% ATR) dampening signal"));
        }

        let direction = if buy_score > sell_score { Direction::Buy } else { Direction::Sell };
        let strength = buy_score.max(sell_score).clamp(0.0, 100.0);

        debug!(
            buy_score,
            sell_score,
            strength,
            %direction,
            "signal scores computed"
        );

        if strength < self.config.minimum_signal_strength {
            reasons.push(format!(
                "signal strength {strength:.1} below threshold {:.0}",
                self.config.minimum_signal_strength
            ));
            return Signal {
                direction: Direction::Neutral,
                confidence: strength,
                reasons,
                stop_loss: 0.0,
                take_profit: 0.0,
                risk_reward_ratio: 0.0,
                position_size: 0.0,
            };
        }

        // Higher-timeframe agreement is informational only: it annotates
        // the reasons without moving the score.
        if let Some(trends) = trends {
            let agreeing = trends.agreeing(direction);
            if agreeing >= 2 {
                reasons.push(format!("{agreeing} of 3 higher timeframes confirm {direction}"));
            }
        }

        let params = self.risk.trade_params(
            direction,
            price,
            snapshot.atr,
            account_balance,
            self.config.risk_pct_per_trade,
        );

        Signal {
            direction,
            confidence: strength,
            reasons,
            stop_loss: params.stop_loss,
            take_profit: params.take_profit,
            risk_reward_ratio: params.risk_reward_ratio,
            position_size: params.position_size,
        }
    }

    fn score_rsi(
        &self,
        snapshot: &IndicatorSnapshot,
        buy: &mut f64,
        sell: &mut f64,
        reasons: &mut Vec<String>,
    ) {
        let rsi = snapshot.rsi;
        if rsi < self.config.rsi_oversold {
            *buy += W_RSI * 100.0;
            reasons.push(format!("RSI {rsi:.1} oversold"));
        } else if rsi < 40.0 {
            *buy += W_RSI * 50.0;
            reasons.push(format!("RSI {rsi:.1} approaching oversold"));
        } else if rsi > self.config.rsi_overbought {
            *sell += W_RSI * 100.0;
            reasons.push(format!("RSI {rsi:.1} overbought"));
        } else if rsi > 60.0 {
            *sell += W_RSI * 50.0;
            reasons.push(format!("RSI {rsi:.1} approaching overbought"));
        }
    }
}

fn score_macd(
    snapshot: &IndicatorSnapshot,
    buy: &mut f64,
    sell: &mut f64,
    reasons: &mut Vec<String>,
) {
    let m = &snapshot.macd;
    if m.histogram > 0.0 {
        if m.macd > 0.0 {
            *buy += W_MACD * 100.0;
            reasons.push("MACD positive and above signal line".into());
        } else {
            *buy += W_MACD * 50.0;
            reasons.push("MACD histogram turning positive".into());
        }
    } else if m.histogram < 0.0 {
        if m.macd < 0.0 {
            *sell += W_MACD * 100.0;
            reasons.push("MACD negative and below signal line".into());
        } else {
            *sell += W_MACD * 50.0;
            reasons.push("MACD histogram turning negative".into());
        }
    }
}

fn score_ema_cross(
    snapshot: &IndicatorSnapshot,
    buy: &mut f64,
    sell: &mut f64,
    reasons: &mut Vec<String>,
) {
    if snapshot.ema9 > snapshot.ema21 {
        *buy += W_EMA_CROSS * 100.0;
        reasons.push("short EMA above long EMA".into());
    } else if snapshot.ema9 < snapshot.ema21 {
        *sell += W_EMA_CROSS * 100.0;
        reasons.push("short EMA below long EMA".into());
    }
}

fn score_sma_trend(
    price: f64,
    snapshot: &IndicatorSnapshot,
    buy: &mut f64,
    sell: &mut f64,
    reasons: &mut Vec<String>,
) {
    if price > snapshot.sma50 {
        *buy += W_SMA_TREND * 100.0;
        reasons.push("price above long-term SMA".into());
    } else if price < snapshot.sma50 {
        *sell += W_SMA_TREND * 100.0;
        reasons.push("price below long-term SMA".into());
    }
}

fn score_sentiment(
    sentiment: Option<f64>,
    buy: &mut f64,
    sell: &mut f64,
    reasons: &mut Vec<String>,
) {
    let Some(score) = sentiment else { return };
    if score > SENTIMENT_DEADBAND {
        *buy += W_SENTIMENT * 100.0;
        reasons.push(format!("positive sentiment ({score:.2})"));
    } else if score < -SENTIMENT_DEADBAND {
        *sell += W_SENTIMENT * 100.0;
        reasons.push(format!("negative sentiment ({score:.2})"));
    }
}

fn score_volume(
    series: &CandleSeries,
    snapshot: &IndicatorSnapshot,
    buy: &mut f64,
    sell: &mut f64,
    reasons: &mut Vec<String>,
) {
    let volumes = series.volumes();
    let len = volumes.len();
    if len < 2 {
        return;
    }
    let increasing = volumes[len - 1] > volumes[len - 2];
    let ratio = snapshot.volume.strength / 50.0;
    if ratio > VOLUME_CONFIRM_RATIO && increasing {
        if *buy >= *sell {
            *buy += W_VOLUME * 100.0;
        } else {
            *sell += W_VOLUME * 100.0;
        }
        reasons.push(format!("volume {ratio:.1}x average and rising"));
    }
}
