use crate::error::ExecutionError;
use crate::models::TransactionReceipt;
use async_trait::async_trait;

/// Wallet capable of reading balances and swapping assets
#[async_trait]
pub trait TradeExecutor: Send + Sync {
    /// Spendable balance of `asset_id`, in whole units
    async fn get_balance(&self, asset_id: &str) -> Result<f64, ExecutionError>;

    /// Swap `amount` of `from_asset` into `to_asset`
    async fn trade(
        &self,
        from_asset: &str,
        to_asset: &str,
        amount: f64,
    ) -> Result<TransactionReceipt, ExecutionError>;

    /// Latest oracle price of `asset_id` in quote units
    ///
    /// Executors that fill locally use this to price trades. Remote wallets
    /// ignore it.
    fn mark_price(&self, _asset_id: &str, _price: f64) {}
}

#[async_trait]
impl<T: TradeExecutor + ?Sized> TradeExecutor for Box<T> {
    async fn get_balance(&self, asset_id: &str) -> Result<f64, ExecutionError> {
        (**self).get_balance(asset_id).await
    }

    async fn trade(
        &self,
        from_asset: &str,
        to_asset: &str,
        amount: f64,
    ) -> Result<TransactionReceipt, ExecutionError> {
        (**self).trade(from_asset, to_asset, amount).await
    }

    fn mark_price(&self, asset_id: &str, price: f64) {
        (**self).mark_price(asset_id, price)
    }
}
