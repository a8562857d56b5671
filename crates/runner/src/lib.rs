//! Per-symbol orchestration over the synchronous signal core.
//!
//! Evaluations and backtests are embarrassingly parallel: each symbol
//! owns its own candle history and produces an independent result, so
//! the runner spawns one task per symbol with no shared mutable state.
//! Cancellation, timeouts, and retries belong to the caller wrapping
//! these futures.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use backtest::{BacktestConfig, BacktestSimulator};
use common::{BacktestResult, CandleSeries, Error, Result, Signal, SignalConfig, TimeframeTrends};
use strategy::SignalEngine;

/// Abstraction over wherever candle history comes from.
///
/// The live system feeds this from exchange REST/stream plumbing; tests
/// and offline runs use [`StaticSource`]. Implementations must return
/// series in canonical oldest-first order.
#[async_trait]
pub trait CandleSource: Send + Sync {
    async fn candles(&self, symbol: &str) -> Result<CandleSeries>;
}

/// In-memory candle source for tests and offline replays.
#[derive(Debug, Default)]
pub struct StaticSource {
    series: HashMap<String, CandleSeries>,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, symbol: impl Into<String>, series: CandleSeries) {
        self.series.insert(symbol.into(), series);
    }
}

#[async_trait]
impl CandleSource for StaticSource {
    async fn candles(&self, symbol: &str) -> Result<CandleSeries> {
        self.series
            .get(symbol)
            .cloned()
            .ok_or_else(|| Error::Source(format!("no candles loaded for '{symbol}'")))
    }
}

/// Fans evaluations and backtests out across symbols.
pub struct Runner {
    source: Arc<dyn CandleSource>,
    signal_config: SignalConfig,
    backtest_config: BacktestConfig,
}

impl Runner {
    /// Configuration is validated once here, so per-symbol tasks cannot
    /// fail on config mid-flight.
    pub fn new(source: Arc<dyn CandleSource>, signal_config: SignalConfig) -> Result<Self> {
        signal_config.validate()?;
        Ok(Self {
            source,
            signal_config,
            backtest_config: BacktestConfig::default(),
        })
    }

    pub fn with_backtest_config(mut self, config: BacktestConfig) -> Self {
        self.backtest_config = config;
        self
    }

    /// Evaluate one symbol's latest candle.
    pub async fn evaluate_symbol(
        &self,
        symbol: &str,
        sentiment: Option<f64>,
        trends: Option<TimeframeTrends>,
        account_balance: f64,
    ) -> Result<Signal> {
        let series = self.source.candles(symbol).await?;
        let engine = SignalEngine::new(self.signal_config.clone())?;
        let signal = engine.evaluate(&series, sentiment, trends.as_ref(), account_balance);
        info!(
            symbol,
            direction = %signal.direction,
            confidence = signal.confidence,
            "symbol evaluated"
        );
        Ok(signal)
    }

    /// Evaluate every symbol concurrently. Failures are reported
    /// per-symbol; one bad feed never poisons the others.
    pub async fn evaluate_all(
        &self,
        symbols: &[String],
        account_balance: f64,
    ) -> HashMap<String, Result<Signal>> {
        let mut handles = Vec::with_capacity(symbols.len());
        for symbol in symbols {
            let source = self.source.clone();
            let config = self.signal_config.clone();
            let symbol = symbol.clone();
            handles.push(tokio::spawn(async move {
                let series = source.candles(&symbol).await?;
                let engine = SignalEngine::new(config)?;
                Ok::<_, Error>(engine.evaluate(&series, None, None, account_balance))
            }));
        }
        self.collect(symbols, handles).await
    }

    /// Backtest every symbol concurrently. The candle replay is CPU
    /// bound, so it runs on the blocking pool rather than starving the
    /// async workers.
    pub async fn backtest_all(&self, symbols: &[String]) -> HashMap<String, Result<BacktestResult>> {
        let mut handles = Vec::with_capacity(symbols.len());
        for symbol in symbols {
            let source = self.source.clone();
            let signal_config = self.signal_config.clone();
            let backtest_config = self.backtest_config.clone();
            let symbol = symbol.clone();
            handles.push(tokio::spawn(async move {
                let series = source.candles(&symbol).await?;
                info!(symbol = %symbol, candles = series.len(), "backtest starting");
                tokio::task::spawn_blocking(move || {
                    let simulator = BacktestSimulator::new(signal_config, backtest_config)?;
                    Ok::<_, Error>(simulator.run(&series))
                })
                .await
                .map_err(|e| Error::Worker(e.to_string()))?
            }));
        }
        self.collect(symbols, handles).await
    }

    async fn collect<T>(
        &self,
        symbols: &[String],
        handles: Vec<tokio::task::JoinHandle<Result<T>>>,
    ) -> HashMap<String, Result<T>> {
        let mut results = HashMap::with_capacity(symbols.len());
        for (symbol, handle) in symbols.iter().zip(handles) {
            let outcome = match handle.await {
                Ok(outcome) => outcome,
                Err(e) => Err(Error::Worker(e.to_string())),
            };
            if let Err(e) = &outcome {
                warn!(symbol = %symbol, error = %e, "symbol run failed");
            }
            results.insert(symbol.clone(), outcome);
        }
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use common::Candle;

    fn init_logging() {
        use tracing_subscriber::EnvFilter;
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    fn trending_series(up: bool, n: usize) -> CandleSeries {
        let mut close = 100.0;
        let factor = if up { 1.012 } else { 0.988 };
        CandleSeries::new(
            (0..n)
                .map(|i| {
                    close *= factor;
                    Candle {
                        timestamp: Utc.timestamp_opt(1_700_000_000 + i as i64 * 3600, 0).unwrap(),
                        open: close,
                        high: close * 1.015,
                        low: close * 0.985,
                        close,
                        volume: 100.0 + i as f64 * 10.0,
                    }
                })
                .collect(),
        )
    }

    fn runner_with(symbols: &[(&str, CandleSeries)]) -> Runner {
        let mut source = StaticSource::new();
        for (symbol, series) in symbols {
            source.insert(*symbol, series.clone());
        }
        Runner::new(Arc::new(source), SignalConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn evaluates_each_symbol_independently() {
        init_logging();
        let runner = runner_with(&[
            ("BTCUSDT", trending_series(true, 80)),
            ("ETHUSDT", trending_series(false, 80)),
        ]);
        let symbols = vec!["BTCUSDT".to_string(), "ETHUSDT".to_string()];
        let results = runner.evaluate_all(&symbols, 10_000.0).await;

        assert_eq!(results.len(), 2);
        assert!(results["BTCUSDT"].is_ok());
        assert!(results["ETHUSDT"].is_ok());
    }

    #[tokio::test]
    async fn unknown_symbol_fails_without_poisoning_others() {
        init_logging();
        let runner = runner_with(&[("BTCUSDT", trending_series(true, 80))]);
        let symbols = vec!["BTCUSDT".to_string(), "NOPEUSDT".to_string()];
        let results = runner.evaluate_all(&symbols, 10_000.0).await;

        assert!(results["BTCUSDT"].is_ok());
        assert!(matches!(results["NOPEUSDT"], Err(Error::Source(_))));
    }

    #[tokio::test]
    async fn backtests_run_per_symbol() {
        init_logging();
        let runner = runner_with(&[
            ("BTCUSDT", trending_series(true, 120)),
            ("ETHUSDT", trending_series(false, 120)),
        ]);
        let symbols = vec!["BTCUSDT".to_string(), "ETHUSDT".to_string()];
        let results = runner.backtest_all(&symbols).await;

        for symbol in &symbols {
            let result = results[symbol].as_ref().expect("backtest should succeed");
            assert_eq!(result.initial_balance, 10_000.0);
            assert!(result.equity.len() <= 120);
        }
    }

    #[tokio::test]
    async fn evaluate_symbol_passes_sentiment_and_trends() {
        init_logging();
        let runner = runner_with(&[("BTCUSDT", trending_series(true, 80))]);
        let trends = TimeframeTrends {
            m5: common::Trend::Up,
            m15: common::Trend::Up,
            m30: common::Trend::Up,
        };
        let signal = runner
            .evaluate_symbol("BTCUSDT", Some(0.5), Some(trends), 10_000.0)
            .await
            .unwrap();
        assert!(signal.confidence.is_finite());
    }

    #[tokio::test]
    async fn invalid_config_is_rejected_before_any_task_spawns() {
        let config = SignalConfig {
            atr_period: 0,
            ..SignalConfig::default()
        };
        let result = Runner::new(Arc::new(StaticSource::new()), config);
        assert!(result.is_err());
    }
}
