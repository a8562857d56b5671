pub mod config;
pub mod error;
pub mod types;

pub use config::SignalConfig;
pub use error::{Error, Result};
pub use types::*;
