use proptest::prelude::*;

use common::{Direction, TradeOutcome};
use risk::{check_exit, unrealized_pnl, RiskConfig};

proptest! {
    /// Parameter derivation on randomized inputs must never produce NaN
    /// or infinity, and the levels must sit on the correct side of entry.
    #[test]
    fn trade_params_are_finite_and_oriented(
        price in 0.0001f64..1_000_000.0f64,
        atr in 0.0f64..10_000.0f64,
        balance in 0.0f64..1_000_000.0f64,
        risk_pct in 0.0001f64..0.1f64,
    ) {
        let config = RiskConfig::default();
        for direction in [Direction::Buy, Direction::Sell] {
            let params = config.trade_params(direction, price, atr, balance, risk_pct);
            prop_assert!(params.stop_loss.is_finite());
            prop_assert!(params.take_profit.is_finite());
            prop_assert!(params.risk_reward_ratio.is_finite());
            prop_assert!(params.position_size.is_finite());

            if params.position_size > 0.0 {
                match direction {
                    Direction::Buy => {
                        prop_assert!(params.stop_loss < price);
                        prop_assert!(params.take_profit > price);
                    }
                    Direction::Sell => {
                        prop_assert!(params.stop_loss > price);
                        prop_assert!(params.take_profit < price);
                    }
                    Direction::Neutral => unreachable!(),
                }
            }
        }
    }

    /// The dollar amount risked at the stop never exceeds the configured
    /// fraction of the balance (up to rounding).
    #[test]
    fn risked_amount_matches_the_fraction(
        price in 0.01f64..100_000.0f64,
        atr in 0.0001f64..1_000.0f64,
        balance in 1.0f64..1_000_000.0f64,
        risk_pct in 0.001f64..0.05f64,
    ) {
        let params = RiskConfig::default().trade_params(Direction::Buy, price, atr, balance, risk_pct);
        if params.position_size > 0.0 {
            let risked = params.position_size * (price - params.stop_loss).abs();
            let expected = balance * risk_pct;
            prop_assert!((risked - expected).abs() / expected < 1e-9);
        }
    }

    /// An exit decision, when present, always lands exactly on the stop
    /// or the target, with the matching outcome.
    #[test]
    fn exits_land_on_a_declared_level(
        entry in 1.0f64..10_000.0f64,
        stop_offset in 0.01f64..100.0f64,
        tp_offset in 0.01f64..100.0f64,
        spread in 0.0f64..200.0f64,
        mid in 0.5f64..2.0f64,
    ) {
        let stop = entry - stop_offset;
        let tp = entry + tp_offset;
        let center = entry * mid;
        let (high, low) = (center + spread, center - spread);

        if let Some((exit_price, outcome)) = check_exit(Direction::Buy, stop, tp, high, low) {
            match outcome {
                TradeOutcome::Loss => prop_assert_eq!(exit_price, stop),
                TradeOutcome::Win => prop_assert_eq!(exit_price, tp),
            }
        }
    }

    /// Mark-to-market PnL is antisymmetric between the two directions.
    #[test]
    fn pnl_is_antisymmetric(
        entry in 0.01f64..100_000.0f64,
        mark in 0.01f64..100_000.0f64,
        size in 0.0001f64..1_000.0f64,
    ) {
        let long = unrealized_pnl(Direction::Buy, entry, size, mark);
        let short = unrealized_pnl(Direction::Sell, entry, size, mark);
        prop_assert!((long + short).abs() < 1e-6);
    }
}
