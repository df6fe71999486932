use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Simple price snapshot - just price and timestamp
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PriceSample {
    pub price: f64,
    pub timestamp: DateTime<Utc>,
}

impl PriceSample {
    pub fn now(price: f64) -> Self {
        Self {
            price,
            timestamp: Utc::now(),
        }
    }
}

/// Networks the wallet service can trade on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Network {
    #[default]
    BaseSepolia,
    BaseMainnet,
    EthereumSepolia,
    EthereumMainnet,
}

impl Network {
    pub fn id(&self) -> &'static str {
        match self {
            Network::BaseSepolia => "base-sepolia",
            Network::BaseMainnet => "base-mainnet",
            Network::EthereumSepolia => "ethereum-sepolia",
            Network::EthereumMainnet => "ethereum-mainnet",
        }
    }

    pub fn is_testnet(&self) -> bool {
        matches!(self, Network::BaseSepolia | Network::EthereumSepolia)
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Network {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "base-sepolia" => Ok(Network::BaseSepolia),
            "base-mainnet" => Ok(Network::BaseMainnet),
            "ethereum-sepolia" => Ok(Network::EthereumSepolia),
            "ethereum-mainnet" => Ok(Network::EthereumMainnet),
            other => Err(format!("unknown network '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TradeSide {
    Buy,
    Sell,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Complete,
    Failed,
}

/// Result of a submitted swap
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionReceipt {
    pub id: Uuid,
    pub tx_hash: Option<String>,
    pub from_asset: String,
    pub to_asset: String,
    pub from_amount: f64,
    /// Amount received, when the executor reports it
    pub to_amount: Option<f64>,
    pub status: TransactionStatus,
    pub timestamp: DateTime<Utc>,
}
