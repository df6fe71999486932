use crate::error::OracleError;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Source of spot prices, quoted in USD
#[async_trait]
pub trait PriceOracle: Send + Sync {
    async fn fetch_price(&self, symbol: &str) -> Result<f64, OracleError>;
}

#[async_trait]
impl<T: PriceOracle + ?Sized> PriceOracle for Box<T> {
    async fn fetch_price(&self, symbol: &str) -> Result<f64, OracleError> {
        (**self).fetch_price(symbol).await
    }
}

/// Serves a fixed price series, one sample per fetch
///
/// Used by backtests and tests in place of a live oracle.
pub struct ReplayOracle {
    symbol: String,
    prices: Vec<f64>,
    cursor: AtomicUsize,
}

impl ReplayOracle {
    pub fn new(symbol: impl Into<String>, prices: Vec<f64>) -> Self {
        Self {
            symbol: symbol.into(),
            prices,
            cursor: AtomicUsize::new(0),
        }
    }

    /// Samples not yet served
    pub fn remaining(&self) -> usize {
        self.prices
            .len()
            .saturating_sub(self.cursor.load(Ordering::SeqCst))
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}

#[async_trait]
impl PriceOracle for ReplayOracle {
    async fn fetch_price(&self, symbol: &str) -> Result<f64, OracleError> {
        if !symbol.eq_ignore_ascii_case(&self.symbol) {
            return Err(OracleError::UnknownSymbol(symbol.to_string()));
        }

        let index = self.cursor.fetch_add(1, Ordering::SeqCst);
        let price = self
            .prices
            .get(index)
            .copied()
            .ok_or(OracleError::Exhausted(self.prices.len()))?;

        if !price.is_finite() || price <= 0.0 {
            return Err(OracleError::InvalidPrice {
                symbol: self.symbol.clone(),
                price,
            });
        }

        Ok(price)
    }
}
