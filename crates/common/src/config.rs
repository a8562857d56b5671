use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// All tunable parameters of the indicator and signal layer.
///
/// Every field has a conventional default, so a TOML file only needs to
/// name what it overrides:
/// ```toml
/// rsi_period = 14
/// minimum_signal_strength = 75.0
/// risk_pct_per_trade = 0.01
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalConfig {
    pub rsi_period: usize,
    pub rsi_overbought: f64,
    pub rsi_oversold: f64,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub ema_short: usize,
    pub ema_long: usize,
    pub sma_period: usize,
    pub bb_period: usize,
    pub bb_std_dev: f64,
    pub atr_period: usize,
    /// Signals weaker than this resolve to NEUTRAL (percent, 0–100).
    pub minimum_signal_strength: f64,
    /// Fraction of the account balance risked per trade.
    pub risk_pct_per_trade: f64,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            rsi_period: 14,
            rsi_overbought: 70.0,
            rsi_oversold: 30.0,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            ema_short: 9,
            ema_long: 21,
            sma_period: 50,
            bb_period: 20,
            bb_std_dev: 2.0,
            atr_period: 14,
            minimum_signal_strength: 70.0,
            risk_pct_per_trade: 0.02,
        }
    }
}

impl SignalConfig {
    /// Load from a TOML file. Validation runs before the config is handed out,
    /// so a bad file is rejected at startup rather than mid-computation.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: SignalConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations that cannot be computed with.
    pub fn validate(&self) -> Result<()> {
        let periods = [
            ("rsi_period", self.rsi_period),
            ("macd_fast", self.macd_fast),
            ("macd_slow", self.macd_slow),
            ("macd_signal", self.macd_signal),
            ("ema_short", self.ema_short),
            ("ema_long", self.ema_long),
            ("sma_period", self.sma_period),
            ("bb_period", self.bb_period),
            ("atr_period", self.atr_period),
        ];
        for (name, value) in periods {
            if value == 0 {
                return Err(Error::Config(format!("{name} must be positive")));
            }
        }
        if self.macd_fast >= self.macd_slow {
            return Err(Error::Config(format!(
                "macd_fast ({}) must be less than macd_slow ({})",
                self.macd_fast, self.macd_slow
            )));
        }
        if self.bb_std_dev <= 0.0 {
            return Err(Error::Config("bb_std_dev must be positive".into()));
        }
        if !(0.0..=100.0).contains(&self.minimum_signal_strength) {
            return Err(Error::Config(
                "minimum_signal_strength must be within 0..=100".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.risk_pct_per_trade) || self.risk_pct_per_trade == 0.0 {
            return Err(Error::Config(
                "risk_pct_per_trade must be within (0, 1]".into(),
            ));
        }
        Ok(())
    }

    /// Candle count needed before every indicator is past its warm-up
    /// fallback. The signal engine still answers below this — with
    /// neutral defaults per indicator — but backtests start here.
    pub fn min_history(&self) -> usize {
        (self.macd_slow + self.macd_signal)
            .max(self.sma_period)
            .max(self.rsi_period + 1)
            .max(self.bb_period)
            .max(self.atr_period + 1)
    }
}
