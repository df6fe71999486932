use crate::error::ExecutionError;
use crate::execution::TradeExecutor;
use crate::models::{TransactionReceipt, TransactionStatus};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

#[derive(Debug, Default)]
struct Book {
    balances: HashMap<String, f64>,
    /// Asset -> price in quote units
    marks: HashMap<String, f64>,
    fills: Vec<TransactionReceipt>,
}

/// In-memory paper-trading wallet
///
/// Fills every trade at the last marked price, minus the configured fee.
/// The quote asset is always worth 1.
pub struct SimulatedExecutor {
    quote_asset: String,
    fee_bps: f64,
    book: Mutex<Book>,
}

impl SimulatedExecutor {
    /// Create a wallet funded with `initial_quote` of the quote asset
    pub fn new(quote_asset: impl Into<String>, initial_quote: f64) -> Self {
        let quote_asset = quote_asset.into().to_lowercase();
        let mut book = Book::default();
        book.balances.insert(quote_asset.clone(), initial_quote);

        Self {
            quote_asset,
            fee_bps: 0.0,
            book: Mutex::new(book),
        }
    }

    pub fn with_fee_bps(mut self, fee_bps: f64) -> Self {
        self.fee_bps = fee_bps;
        self
    }

    pub fn with_balance(self, asset_id: &str, amount: f64) -> Self {
        self.lock().balances.insert(asset_id.to_lowercase(), amount);
        self
    }

    /// Snapshot of every non-zero balance
    pub fn balances(&self) -> HashMap<String, f64> {
        self.lock().balances.clone()
    }

    /// Every trade filled so far, oldest first
    pub fn fills(&self) -> Vec<TransactionReceipt> {
        self.lock().fills.clone()
    }

    /// Total holdings valued at the last marks, in quote units
    pub fn equity(&self) -> f64 {
        let book = self.lock();
        book.balances
            .iter()
            .map(|(asset, amount)| {
                if *asset == self.quote_asset {
                    *amount
                } else {
                    amount * book.marks.get(asset).copied().unwrap_or(0.0)
                }
            })
            .sum()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Book> {
        // The book holds plain numbers, so a poisoned lock is still consistent
        self.book.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn price_of(&self, book: &Book, asset: &str) -> Result<f64, ExecutionError> {
        if asset == self.quote_asset {
            return Ok(1.0);
        }
        book.marks
            .get(asset)
            .copied()
            .ok_or_else(|| ExecutionError::UnknownAsset(asset.to_string()))
    }
}

#[async_trait]
impl TradeExecutor for SimulatedExecutor {
    async fn get_balance(&self, asset_id: &str) -> Result<f64, ExecutionError> {
        let book = self.lock();
        Ok(book
            .balances
            .get(&asset_id.to_lowercase())
            .copied()
            .unwrap_or(0.0))
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

        let from_asset = from_asset.to_lowercase();
        let to_asset = to_asset.to_lowercase();
        if from_asset == to_asset {
            return Err(ExecutionError::Rejected(format!(
                "cannot swap {} into itself",
                from_asset
            )));
        }

        let mut book = self.lock();
        let from_price = self.price_of(&book, &from_asset)?;
        let to_price = self.price_of(&book, &to_asset)?;

        let available = book.balances.get(&from_asset).copied().unwrap_or(0.0);
        if available < amount {
            return Err(ExecutionError::InsufficientFunds {
                asset: from_asset,
                available: Some(available),
                required: amount,
            });
        }

        let fee_multiplier = 1.0 - self.fee_bps / 10_000.0;
        let received = amount * from_price / to_price * fee_multiplier;

        let remaining = available - amount;
        if remaining > 0.0 {
            book.balances.insert(from_asset.clone(), remaining);
        } else {
            book.balances.remove(&from_asset);
        }
        *book.balances.entry(to_asset.clone()).or_insert(0.0) += received;

        let id = Uuid::new_v4();
        let receipt = TransactionReceipt {
            id,
            tx_hash: Some(format!("sim-{}", id.simple())),
            from_asset,
            to_asset,
            from_amount: amount,
            to_amount: Some(received),
            status: TransactionStatus::Complete,
            timestamp: Utc::now(),
        };
        book.fills.push(receipt.clone());

        tracing::info!(
            from = %receipt.from_asset,
            to = %receipt.to_asset,
            amount,
            received,
            "Simulated trade filled"
        );

        Ok(receipt)
    }

    fn mark_price(&self, asset_id: &str, price: f64) {
        self.lock().marks.insert(asset_id.to_lowercase(), price);
    }
}
