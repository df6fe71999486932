//! Layered settings: defaults, optional TOML file, environment, CLI

use crate::api::pyth::PYTH_HERMES_API;
use crate::api::Credentials;
use crate::error::ConfigError;
use crate::execution::TraderConfig;
use crate::models::Network;
use crate::strategy::StrategyConfig;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use tokio::time::Duration;

pub const API_KEY_NAME_ENV: &str = "CDP_API_KEY_NAME";
pub const API_KEY_PRIVATE_KEY_ENV: &str = "CDP_API_KEY_PRIVATE_KEY";
pub const NETWORK_ENV: &str = "NETWORK_ID";
pub const ENV_PREFIX: &str = "SWAPBOT";
pub const DEFAULT_CONFIG_FILE: &str = "swapbot";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub network: Network,

    /// Oracle symbol priced against USD
    pub symbol: String,
    pub base_asset: String,
    pub quote_asset: String,

    /// Quote-asset notional per buy
    pub trade_amount: f64,

    pub poll_interval_secs: u64,
    pub call_timeout_secs: u64,

    /// Trade against an in-memory wallet instead of the wallet service
    pub simulate: bool,
    pub initial_quote_balance: f64,
    pub simulated_fee_bps: f64,

    pub oracle_url: String,
    pub wallet_url: String,

    pub strategy: StrategyConfig,

    #[serde(skip)]
    pub credentials: Option<Credentials>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            network: Network::default(),
            symbol: "ETH".to_string(),
            base_asset: "eth".to_string(),
            quote_asset: "usdc".to_string(),
            trade_amount: 10.0,
            poll_interval_secs: 60,
            call_timeout_secs: 30,
            simulate: false,
            initial_quote_balance: 1_000.0,
            simulated_fee_bps: 0.0,
            oracle_url: PYTH_HERMES_API.to_string(),
            wallet_url: "http://127.0.0.1:8080".to_string(),
            strategy: StrategyConfig::default(),
            credentials: None,
        }
    }
}

impl Settings {
    /// Load settings from defaults, a TOML file and the environment
    ///
    /// Without an explicit path, `swapbot.toml` in the working directory is
    /// used when present. Environment overrides use the `SWAPBOT_` prefix
    /// with `__` between nested keys, e.g. `SWAPBOT_STRATEGY__MA_PERIOD`.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match path {
            Some(p) => config::File::from(p).required(true),
            None => config::File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let mut builder = config::Config::builder()
            .add_source(config::Config::try_from(&Settings::default())?)
            .add_source(file)
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        if let Ok(raw) = env::var(NETWORK_ENV) {
            builder = builder.set_override("network", parse_network(&raw)?.id())?;
        }

        let mut settings: Settings = builder.build()?.try_deserialize()?;
        settings.credentials = Credentials::from_env().ok();

        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.trade_amount.is_finite() || self.trade_amount <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "trade_amount must be positive, got {}",
                self.trade_amount
            )));
        }
        if self.poll_interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "poll_interval_secs must be at least 1".to_string(),
            ));
        }
        if self.call_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "call_timeout_secs must be at least 1".to_string(),
            ));
        }
        if self.base_asset.eq_ignore_ascii_case(&self.quote_asset) {
            return Err(ConfigError::Invalid(format!(
                "base and quote asset are both '{}'",
                self.base_asset
            )));
        }
        if self.symbol.trim().is_empty() {
            return Err(ConfigError::Invalid("symbol must not be empty".to_string()));
        }
        self.strategy
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    /// Credentials for the wallet service, or every missing variable
    pub fn require_credentials(&self) -> Result<&Credentials, ConfigError> {
        self.credentials
            .as_ref()
            .ok_or_else(|| ConfigError::MissingCredentials(missing_credential_vars()))
    }

    pub fn trader_config(&self) -> TraderConfig {
        TraderConfig {
            symbol: self.symbol.clone(),
            base_asset: self.base_asset.clone(),
            quote_asset: self.quote_asset.clone(),
            trade_amount: self.trade_amount,
            poll_interval: Duration::from_secs(self.poll_interval_secs),
            call_timeout: Duration::from_secs(self.call_timeout_secs),
        }
    }
}

impl Credentials {
    /// Read the API key pair from the environment
    pub fn from_env() -> Result<Self, ConfigError> {
        let missing = missing_credential_vars();
        if !missing.is_empty() {
            return Err(ConfigError::MissingCredentials(missing));
        }

        Ok(Self {
            api_key_name: env::var(API_KEY_NAME_ENV).unwrap_or_default(),
            api_key_private_key: env::var(API_KEY_PRIVATE_KEY_ENV)
                .unwrap_or_default()
                .replace("\\n", "\n"),
        })
    }
}

/// Accepts the same spellings as `--network`, in any case
fn parse_network(raw: &str) -> Result<Network, ConfigError> {
    raw.trim()
        .parse::<Network>()
        .map_err(|e| ConfigError::Invalid(format!("{}: {}", NETWORK_ENV, e)))
}

fn missing_credential_vars() -> Vec<String> {
    [API_KEY_NAME_ENV, API_KEY_PRIVATE_KEY_ENV]
        .into_iter()
        .filter(|name| env::var(name).map(|v| v.trim().is_empty()).unwrap_or(true))
        .map(str::to_string)
        .collect()
}
