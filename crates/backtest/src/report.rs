//! Summary statistics over a finished trade log and equity curve.

use common::{BacktestResult, ClosedTrade, EquityPoint, TradeOutcome};

/// Fold the trade log and equity curve into a [`BacktestResult`].
pub fn summarize(
    initial_balance: f64,
    final_balance: f64,
    trades: Vec<ClosedTrade>,
    equity: Vec<EquityPoint>,
) -> BacktestResult {
    let total = trades.len();
    let wins = trades.iter().filter(|t| t.result == TradeOutcome::Win).count();
    let win_rate = if total > 0 {
        wins as f64 / total as f64 * 100.0
    } else {
        0.0
    };

    let gross_profit: f64 = trades.iter().map(|t| t.profit).filter(|p| *p > 0.0).sum();
    let gross_loss: f64 = trades.iter().map(|t| t.profit).filter(|p| *p < 0.0).sum();
    // The divisor is floored at 1.0 so an all-winning log yields a
    // finite factor instead of infinity.
    let profit_factor = gross_profit / gross_loss.abs().max(1.0);

    let max_drawdown = max_drawdown(&equity);

    BacktestResult {
        initial_balance,
        final_balance,
        trades,
        equity,
        win_rate,
        profit_factor,
        max_drawdown,
    }
}

/// Largest peak-to-trough decline of the equity curve, in percent of the
/// running peak. Zero for an empty or non-decreasing curve.
pub fn max_drawdown(equity: &[EquityPoint]) -> f64 {
    let mut peak = f64::NEG_INFINITY;
    let mut worst: f64 = 0.0;
    for point in equity {
        if point.value > peak {
            peak = point.value;
        }
        if peak > 0.0 {
            worst = worst.max((peak - point.value) / peak * 100.0);
        }
    }
    worst
}
