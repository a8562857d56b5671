use chrono::{DateTime, Utc};
use tracing::debug;

use common::{
    BacktestResult, Candle, CandleSeries, ClosedTrade, Direction, EquityPoint, Result, SignalConfig,
    TradeOutcome,
};
use risk::{check_exit, unrealized_pnl};
use strategy::SignalEngine;

use crate::report;

/// Knobs of the replay loop itself (the signal logic is configured via
/// [`SignalConfig`]).
#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    /// Starting account balance.
    pub initial_balance: f64,
    /// Minimum signal confidence required to open a position.
    pub entry_threshold: f64,
    /// Cap on the trailing window handed to the engine per candle.
    pub max_history: usize,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            initial_balance: 10_000.0,
            entry_threshold: 70.0,
            max_history: 200,
        }
    }
}

/// A position while it is open. Owned exclusively by the simulator and
/// never exposed; closing it produces the public [`ClosedTrade`].
struct OpenTrade {
    direction: Direction,
    entry_price: f64,
    entry_time: DateTime<Utc>,
    stop_loss: f64,
    take_profit: f64,
    size: f64,
}

impl OpenTrade {
    fn close(&self, exit_price: f64, exit_time: DateTime<Utc>, result: TradeOutcome) -> ClosedTrade {
        let profit = match self.direction {
            Direction::Buy => (exit_price - self.entry_price) * self.size,
            Direction::Sell => (self.entry_price - exit_price) * self.size,
            Direction::Neutral => 0.0,
        };
        ClosedTrade {
            direction: self.direction,
            entry_price: self.entry_price,
            entry_time: self.entry_time,
            stop_loss: self.stop_loss,
            take_profit: self.take_profit,
            size: self.size,
            exit_price,
            exit_time,
            profit,
            result,
        }
    }
}

/// Replays a candle series through the signal engine, holding at most
/// one open position at a time and booking exits against each candle's
/// high/low before considering a new entry.
pub struct BacktestSimulator {
    engine: SignalEngine,
    config: BacktestConfig,
}

impl BacktestSimulator {
    pub fn new(signal_config: SignalConfig, config: BacktestConfig) -> Result<Self> {
        Ok(Self {
            engine: SignalEngine::new(signal_config)?,
            config,
        })
    }

    /// Run the full replay. A series shorter than the indicator warm-up
    /// produces a result with no trades and an untouched balance.
    pub fn run(&self, series: &CandleSeries) -> BacktestResult {
        let warmup = self.engine.config().min_history();
        let candles = series.candles();

        let mut balance = self.config.initial_balance;
        let mut open: Option<OpenTrade> = None;
        let mut trades: Vec<ClosedTrade> = Vec::new();
        let mut equity: Vec<EquityPoint> = Vec::new();

        for (i, candle) in candles.iter().enumerate().skip(warmup) {
            if let Some(trade) = open.as_ref() {
                if let Some((exit_price, outcome)) = check_exit(
                    trade.direction,
                    trade.stop_loss,
                    trade.take_profit,
                    candle.high,
                    candle.low,
                ) {
                    let closed = trade.close(exit_price, candle.timestamp, outcome);
                    debug!(
                        direction = %closed.direction,
                        exit_price,
                        profit = closed.profit,
                        result = %closed.result,
                        "position closed"
                    );
                    balance += closed.profit;
                    trades.push(closed);
                    open = None;
                }
            }

            if open.is_none() {
                if let Some(trade) = self.try_enter(series, i, candle, balance) {
                    debug!(
                        direction = %trade.direction,
                        entry_price = trade.entry_price,
                        stop_loss = trade.stop_loss,
                        take_profit = trade.take_profit,
                        size = trade.size,
                        "position opened"
                    );
                    open = Some(trade);
                }
            }

            let marked = balance
                + open
                    .as_ref()
                    .map_or(0.0, |t| unrealized_pnl(t.direction, t.entry_price, t.size, candle.close));
            equity.push(EquityPoint {
                timestamp: candle.timestamp,
                value: marked,
            });
        }

        // Anything still open is flattened at the final close.
        if let (Some(trade), Some(last)) = (open.take(), candles.last()) {
            let profit = unrealized_pnl(trade.direction, trade.entry_price, trade.size, last.close);
            let outcome = if profit > 0.0 { TradeOutcome::Win } else { TradeOutcome::Loss };
            let closed = trade.close(last.close, last.timestamp, outcome);
            balance += closed.profit;
            trades.push(closed);
        }

        report::summarize(self.config.initial_balance, balance, trades, equity)
    }

    fn try_enter(
        &self,
        series: &CandleSeries,
        index: usize,
        candle: &Candle,
        balance: f64,
    ) -> Option<OpenTrade> {
        let window = series.window_ending(index, self.config.max_history);
        let signal = self.engine.evaluate(&window, None, None, balance);

        if signal.direction == Direction::Neutral
            || signal.confidence <= self.config.entry_threshold
            || signal.position_size <= 0.0
        {
            return None;
        }

        Some(OpenTrade {
            direction: signal.direction,
            entry_price: candle.close,
            entry_time: candle.timestamp,
            stop_loss: signal.stop_loss,
            take_profit: signal.take_profit,
            size: signal.position_size,
        })
    }
}
