use serde::{Deserialize, Serialize};
use tracing::debug;

use common::{Direction, Error, Result, TradeOutcome};

/// User-configurable risk parameters for stop placement and sizing.
///
/// Multipliers are in ATR units before the volatility adjustment: wider
/// markets push the stop out faster than the target, so the offered
/// risk/reward compresses as volatility climbs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskConfig {
    /// Stop distance in ATRs at zero volatility (e.g. 1.5).
    pub base_stop_multiplier: f64,
    /// Target distance in ATRs at zero volatility (e.g. 2.5).
    pub base_tp_multiplier: f64,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            base_stop_multiplier: 1.5,
            base_tp_multiplier: 2.5,
        }
    }
}

impl RiskConfig {
    pub fn validate(&self) -> Result<()> {
        if self.base_stop_multiplier <= 0.0 {
            return Err(Error::Config("base_stop_multiplier must be positive".into()));
        }
        if self.base_tp_multiplier <= 0.0 {
            return Err(Error::Config("base_tp_multiplier must be positive".into()));
        }
        Ok(())
    }

    /// Derive stop, target, and size for a prospective trade at `price`.
    ///
    /// `stop = base_stop × (1 + atr/price)` ATRs away from entry and
    /// `target = base_tp × (1 + atr/price × 0.5)` ATRs, mirrored for
    /// SELL. Position size risks `account_balance × risk_pct` at the
    /// stop. Degenerate inputs (NEUTRAL direction, zero risk distance,
    /// non-positive price) return the zeroed [`RiskParams`] rather than
    /// NaN or infinity.
    pub fn trade_params(
        &self,
        direction: Direction,
        price: f64,
        atr: f64,
        account_balance: f64,
        risk_pct: f64,
    ) -> RiskParams {
        if price <= 0.0 || !price.is_finite() || !atr.is_finite() || atr < 0.0 {
            return RiskParams::none();
        }

        let volatility_factor = atr / price;
        let stop_multiplier = self.base_stop_multiplier * (1.0 + volatility_factor);
        let tp_multiplier = self.base_tp_multiplier * (1.0 + volatility_factor * 0.5);

        let (stop_loss, take_profit) = match direction {
            Direction::Buy => (price - atr * stop_multiplier, price + atr * tp_multiplier),
            Direction::Sell => (price + atr * stop_multiplier, price - atr * tp_multiplier),
            Direction::Neutral => return RiskParams::none(),
        };

        let risk_per_unit = (price - stop_loss).abs();
        if risk_per_unit == 0.0 {
            return RiskParams::none();
        }
        let reward_per_unit = (take_profit - price).abs();
        let risk_reward_ratio = reward_per_unit / risk_per_unit;
        let position_size = (account_balance * risk_pct) / risk_per_unit;

        debug!(
            %direction,
            price,
            atr,
            stop_loss,
            take_profit,
            position_size,
            "risk parameters derived"
        );

        RiskParams {
            stop_loss,
            take_profit,
            risk_reward_ratio,
            position_size,
        }
    }
}

/// Stop, target, and sizing for one prospective trade.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskParams {
    pub stop_loss: f64,
    pub take_profit: f64,
    pub risk_reward_ratio: f64,
    pub position_size: f64,
}

impl RiskParams {
    /// The all-zero parameters attached to NEUTRAL signals.
    pub fn none() -> Self {
        Self::default()
    }
}

/// Intrabar exit decision for an open trade against one candle's range.
///
/// The stop is checked before the target: when a single candle spans
/// both levels the trade resolves as a loss, the conservative reading
/// of an unknown intrabar path.
pub fn check_exit(
    direction: Direction,
    stop_loss: f64,
    take_profit: f64,
    high: f64,
    low: f64,
) -> Option<(f64, TradeOutcome)> {
    match direction {
        Direction::Buy => {
            if low <= stop_loss {
                return Some((stop_loss, TradeOutcome::Loss));
            }
            if high >= take_profit {
                return Some((take_profit, TradeOutcome::Win));
            }
        }
        Direction::Sell => {
            if high >= stop_loss {
                return Some((stop_loss, TradeOutcome::Loss));
            }
            if low <= take_profit {
                return Some((take_profit, TradeOutcome::Win));
            }
        }
        Direction::Neutral => {}
    }
    None
}

/// Mark-to-market profit of an open position at `mark_price`.
pub fn unrealized_pnl(direction: Direction, entry_price: f64, size: f64, mark_price: f64) -> f64 {
    match direction {
        Direction::Buy => (mark_price - entry_price) * size,
        Direction::Sell => (entry_price - mark_price) * size,
        Direction::Neutral => 0.0,
    }
}
