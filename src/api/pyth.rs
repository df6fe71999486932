use crate::error::OracleError;
use crate::execution::PriceOracle;
use async_trait::async_trait;
use governor::{Quota, RateLimiter};
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::num::NonZeroU32;
use std::sync::Arc;
use tokio::sync::RwLock;

pub const PYTH_HERMES_API: &str = "https://hermes.pyth.network";

const RATE_LIMIT_RPM: NonZeroU32 = match NonZeroU32::new(60) {
    Some(rpm) => rpm,
    None => panic!("rate limit must be non-zero"),
};

type HermesRateLimiter = RateLimiter<
    governor::state::direct::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// Client for the Pyth Hermes price service
///
/// Resolves `Crypto.{SYMBOL}/USD` feed ids once and caches them. Cloning
/// shares the cache and the rate limiter.
#[derive(Clone)]
pub struct PythClient {
    client: Client,
    base_url: String,
    feed_ids: Arc<RwLock<HashMap<String, String>>>,
    rate_limiter: Arc<HermesRateLimiter>,
}

#[derive(Debug, Deserialize)]
struct PriceFeedEntry {
    id: String,
    attributes: FeedAttributes,
}

#[derive(Debug, Deserialize)]
struct FeedAttributes {
    #[serde(default)]
    symbol: String,
}

#[derive(Debug, Deserialize)]
struct LatestPriceResponse {
    #[serde(default)]
    parsed: Vec<ParsedUpdate>,
}

#[derive(Debug, Deserialize)]
struct ParsedUpdate {
    id: String,
    price: HermesPrice,
}

#[derive(Debug, Deserialize)]
struct HermesPrice {
    price: String,
    expo: i32,
    #[allow(dead_code)]
    publish_time: i64,
}

impl PythClient {
    pub fn new() -> Self {
        Self::with_base_url(PYTH_HERMES_API)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            feed_ids: Arc::new(RwLock::new(HashMap::new())),
            rate_limiter: Arc::new(RateLimiter::direct(Quota::per_minute(RATE_LIMIT_RPM))),
        }
    }

    /// Feed id for `symbol` against USD
    pub async fn feed_id(&self, symbol: &str) -> Result<String, OracleError> {
        let symbol = symbol.to_uppercase();
        if let Some(id) = self.feed_ids.read().await.get(&symbol) {
            return Ok(id.clone());
        }

        let url = format!("{}/v2/price_feeds", self.base_url);
        let response = self
            .get(&url, &[("query", symbol.as_str()), ("asset_type", "crypto")])
            .await?;
        let feeds: Vec<PriceFeedEntry> = response
            .json()
            .await
            .map_err(|e| OracleError::MalformedResponse(e.to_string()))?;

        let wanted = format!("Crypto.{}/USD", symbol);
        let id = feeds
            .into_iter()
            .find(|f| f.attributes.symbol.eq_ignore_ascii_case(&wanted))
            .map(|f| f.id)
            .ok_or_else(|| OracleError::UnknownSymbol(symbol.clone()))?;

        tracing::debug!(symbol = %symbol, feed_id = %id, "Resolved Pyth feed");
        self.feed_ids.write().await.insert(symbol, id.clone());

        Ok(id)
    }

    /// Latest USD price for `symbol`
    pub async fn get_price(&self, symbol: &str) -> Result<f64, OracleError> {
        let feed_id = self.feed_id(symbol).await?;

        let url = format!("{}/v2/updates/price/latest", self.base_url);
        let response = self
            .get(&url, &[("ids[]", feed_id.as_str()), ("parsed", "true")])
            .await?;
        let latest: LatestPriceResponse = response
            .json()
            .await
            .map_err(|e| OracleError::MalformedResponse(e.to_string()))?;

        let update = latest
            .parsed
            .into_iter()
            .find(|u| same_feed(&u.id, &feed_id))
            .ok_or_else(|| {
                OracleError::MalformedResponse(format!("no update for feed {}", feed_id))
            })?;

        let price = scale_price(&update.price)?;
        if !price.is_finite() || price <= 0.0 {
            return Err(OracleError::InvalidPrice {
                symbol: symbol.to_string(),
                price,
            });
        }

        tracing::info!(symbol, price, "Fetched price");
        Ok(price)
    }

    async fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<reqwest::Response, OracleError> {
        self.rate_limiter.until_ready().await;

        let response = self.client.get(url).query(query).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(OracleError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response)
    }
}

impl Default for PythClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PriceOracle for PythClient {
    async fn fetch_price(&self, symbol: &str) -> Result<f64, OracleError> {
        self.get_price(symbol).await
    }
}

/// Hermes returns ids without the 0x prefix, but accepts either
fn same_feed(a: &str, b: &str) -> bool {
    a.trim_start_matches("0x")
        .eq_ignore_ascii_case(b.trim_start_matches("0x"))
}

fn scale_price(price: &HermesPrice) -> Result<f64, OracleError> {
    let mantissa: i64 = price
        .price
        .parse()
        .map_err(|_| OracleError::MalformedResponse(format!("bad price '{}'", price.price)))?;
    let mantissa = mantissa as f64;
    if price.expo < 0 {
        Ok(mantissa / 10f64.powi(-price.expo))
    } else {
        Ok(mantissa * 10f64.powi(price.expo))
    }
}
