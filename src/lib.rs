// Core modules
pub mod api;
pub mod backtest;
pub mod config;
pub mod error;
pub mod execution;
pub mod indicators;
pub mod models;
pub mod strategy;

// Re-export commonly used types
pub use config::Settings;
pub use error::{Error, Result};
pub use execution::{PriceOracle, TradeExecutor, Trader, TraderConfig};
pub use models::*;
pub use strategy::{Decision, Position, StrategyConfig, TradingState};
