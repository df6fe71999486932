use crate::error::ExecutionError;
use crate::execution::TradeExecutor;
use crate::models::{Network, TransactionReceipt, TransactionStatus};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use uuid::Uuid;

/// API key pair for the wallet service
#[derive(Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub api_key_name: String,
    pub api_key_private_key: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key_name", &self.api_key_name)
            .field("api_key_private_key", &"<redacted>")
            .finish()
    }
}

/// Client for an external wallet service exposing named actions
///
/// Every call is `POST {base}/v1/actions/{action}`. Signing and broadcast
/// happen on the service side.
#[derive(Clone)]
pub struct AgentWalletClient {
    client: Client,
    base_url: String,
    network: Network,
    credentials: Credentials,
}

#[derive(Debug, Serialize)]
struct ActionRequest<'a, A: Serialize> {
    network_id: &'a str,
    args: A,
}

#[derive(Debug, Serialize)]
struct BalanceArgs<'a> {
    asset_id: &'a str,
}

#[derive(Debug, Serialize)]
struct TradeArgs<'a> {
    amount: f64,
    from_asset_id: &'a str,
    to_asset_id: &'a str,
}

#[derive(Debug, Deserialize)]
struct TradeResponse {
    transaction_hash: Option<String>,
    to_amount: Option<f64>,
    #[serde(default = "pending")]
    status: TransactionStatus,
}

fn pending() -> TransactionStatus {
    TransactionStatus::Pending
}

impl AgentWalletClient {
    pub fn new(base_url: impl Into<String>, network: Network, credentials: Credentials) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            network,
            credentials,
        }
    }

    pub fn network(&self) -> Network {
        self.network
    }

    /// Send an action and return the raw response body
    ///
    /// `spending` names the asset and amount leaving the wallet, so that a
    /// client-error response mentioning insufficient funds maps to
    /// `InsufficientFunds` instead of `Rejected`.
    async fn invoke<A: Serialize + Send + Sync>(
        &self,
        action: &str,
        args: A,
        spending: Option<(&str, f64)>,
    ) -> Result<String, ExecutionError> {
        let url = format!("{}/v1/actions/{}", self.base_url, action);
        let body = ActionRequest {
            network_id: self.network.id(),
            args,
        };

        let response = self
            .client
            .post(&url)
            .header("X-Api-Key-Name", &self.credentials.api_key_name)
            .bearer_auth(&self.credentials.api_key_private_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            tracing::warn!(action, status = status.as_u16(), "Wallet action failed");

            if let Some((asset, required)) = spending {
                if status.is_client_error() && text.to_lowercase().contains("insufficient") {
                    return Err(ExecutionError::InsufficientFunds {
                        asset: asset.to_string(),
                        available: None,
                        required,
                    });
                }
            }
            return Err(ExecutionError::Rejected(format!("{} ({}): {}", action, status, text)));
        }

        Ok(text)
    }
}

/// Balance must be a JSON number; anything else is an error, never zero
fn parse_balance(body: &str) -> Result<f64, ExecutionError> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| ExecutionError::MalformedResponse(format!("{}: {}", e, body)))?;

    let balance = value
        .get("balance")
        .and_then(Value::as_f64)
        .ok_or_else(|| ExecutionError::MalformedResponse(format!("no numeric balance in {}", body)))?;

    if !balance.is_finite() || balance < 0.0 {
        return Err(ExecutionError::MalformedResponse(format!(
            "invalid balance {}",
            balance
        )));
    }

    Ok(balance)
}

#[async_trait]
impl TradeExecutor for AgentWalletClient {
    async fn get_balance(&self, asset_id: &str) -> Result<f64, ExecutionError> {
        let body = self.invoke("get_balance", BalanceArgs { asset_id }, None).await?;
        let balance = parse_balance(&body)?;

        tracing::debug!(asset_id, balance, "Fetched wallet balance");
        Ok(balance)
    }

    async fn trade(
        &self,
        from_asset: &str,
        to_asset: &str,
        amount: f64,
    ) -> Result<TransactionReceipt, ExecutionError> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(ExecutionError::InvalidAmount(amount));
        }

        let body = self
            .invoke(
                "trade",
                TradeArgs {
                    amount,
                    from_asset_id: from_asset,
                    to_asset_id: to_asset,
                },
                Some((from_asset, amount)),
            )
            .await?;

        let response: TradeResponse = serde_json::from_str(&body)
            .map_err(|e| ExecutionError::MalformedResponse(format!("{}: {}", e, body)))?;

        tracing::info!(
            from = from_asset,
            to = to_asset,
            amount,
            tx = response.transaction_hash.as_deref().unwrap_or("-"),
            "Trade submitted"
        );

        Ok(TransactionReceipt {
            id: Uuid::new_v4(),
            tx_hash: response.transaction_hash,
            from_asset: from_asset.to_string(),
            to_asset: to_asset.to_string(),
            from_amount: amount,
            to_amount: response.to_amount,
            status: response.status,
            timestamp: Utc::now(),
        })
    }
}
