//! Error types for the trading bot

use thiserror::Error;

/// Failures reading a price from an oracle
#[derive(Error, Debug)]
pub enum OracleError {
    #[error("Unknown symbol: {0}")]
    UnknownSymbol(String),

    #[error("Oracle returned an invalid price for {symbol}: {price}")]
    InvalidPrice { symbol: String, price: f64 },

    #[error("Oracle upstream error ({status}): {body}")]
    Upstream { status: u16, body: String },

    #[error("Price series exhausted after {0} samples")]
    Exhausted(usize),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Malformed oracle response: {0}")]
    MalformedResponse(String),
}

/// Failures reading balances or submitting trades
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("Insufficient {asset} balance: {}need {required}", have(.available))]
    InsufficientFunds {
        asset: String,
        /// `None` when the wallet service reports the shortfall without a balance
        available: Option<f64>,
        required: f64,
    },

    #[error("Trade rejected: {0}")]
    Rejected(String),

    #[error("Unknown asset: {0}")]
    UnknownAsset(String),

    #[error("Invalid trade amount: {0}")]
    InvalidAmount(f64),

    #[error("Malformed wallet response: {0}")]
    MalformedResponse(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

fn have(available: &Option<f64>) -> String {
    available
        .map(|a| format!("have {}, ", a))
        .unwrap_or_default()
}

/// Violations of the trading state machine
#[derive(Error, Debug, PartialEq)]
pub enum StrategyError {
    #[error("Cannot {action} while {position}")]
    InvalidTransition {
        action: &'static str,
        position: &'static str,
    },

    #[error("Invalid strategy config: {0}")]
    InvalidConfig(String),
}

/// Startup configuration problems
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variables: {}", .0.join(", "))]
    MissingCredentials(Vec<String>),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error(transparent)]
    Load(#[from] config::ConfigError),
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("Oracle error: {0}")]
    Oracle(#[from] OracleError),

    #[error("Execution error: {0}")]
    Execution(#[from] ExecutionError),

    #[error("Strategy error: {0}")]
    Strategy(#[from] StrategyError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("{0} timed out after {1}s")]
    Timeout(&'static str, u64),
}

pub type Result<T> = std::result::Result<T, Error>;
