pub mod params;

pub use params::{check_exit, unrealized_pnl, RiskConfig, RiskParams};
