use crate::error::{Error, ExecutionError, Result};
use crate::execution::{PriceOracle, TradeExecutor};
use crate::models::{PriceSample, TransactionReceipt, TransactionStatus};
use crate::strategy::{Decision, HoldReason, Position, TradingState};
use std::future::Future;
use tokio::sync::watch;
use tokio::time::{sleep, timeout, Duration};

/// What to trade and how often
#[derive(Debug, Clone)]
pub struct TraderConfig {
    /// Oracle symbol for the base asset (e.g. "ETH")
    pub symbol: String,
    /// Wallet asset id bought on entry (e.g. "eth")
    pub base_asset: String,
    /// Wallet asset id spent on entry (e.g. "usdc")
    pub quote_asset: String,
    /// Quote-asset notional spent per buy
    pub trade_amount: f64,
    pub poll_interval: Duration,
    /// Upper bound on each oracle or wallet call
    pub call_timeout: Duration,
}

impl Default for TraderConfig {
    fn default() -> Self {
        Self {
            symbol: "ETH".to_string(),
            base_asset: "eth".to_string(),
            quote_asset: "usdc".to_string(),
            trade_amount: 10.0,
            poll_interval: Duration::from_secs(60),
            call_timeout: Duration::from_secs(30),
        }
    }
}

/// Result of a single loop iteration
#[derive(Debug, Clone)]
pub enum TickOutcome {
    Held {
        price: f64,
        reason: HoldReason,
    },
    Bought {
        price: f64,
        quantity: f64,
        receipt: TransactionReceipt,
    },
    Sold {
        price: f64,
        profit_pct: f64,
        receipt: TransactionReceipt,
    },
}

/// Counters for a trading session
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionStats {
    pub ticks: u64,
    pub buys: u64,
    pub sells: u64,
    pub failures: u64,
    pub wins: u64,
    pub losses: u64,
    /// Sum of realized profit fractions across closed trades
    pub realized_pct: f64,
}

impl SessionStats {
    fn record(&mut self, outcome: &TickOutcome) {
        match outcome {
            TickOutcome::Held { .. } => {}
            TickOutcome::Bought { .. } => self.buys += 1,
            TickOutcome::Sold { profit_pct, .. } => {
                self.sells += 1;
                self.realized_pct += profit_pct;
                if *profit_pct > 0.0 {
                    self.wins += 1;
                } else {
                    self.losses += 1;
                }
            }
        }
    }
}

/// Sequential polling loop: fetch price, decide, trade, sleep
///
/// Owns the trading state. Position changes are committed only once the
/// executor has confirmed the trade.
pub struct Trader<O, E> {
    oracle: O,
    executor: E,
    state: TradingState,
    config: TraderConfig,
    stats: SessionStats,
}

impl<O: PriceOracle, E: TradeExecutor> Trader<O, E> {
    pub fn new(oracle: O, executor: E, state: TradingState, config: TraderConfig) -> Self {
        Self {
            oracle,
            executor,
            state,
            config,
            stats: SessionStats::default(),
        }
    }

    pub fn state(&self) -> &TradingState {
        &self.state
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    /// Run one iteration and update the session counters
    pub async fn tick(&mut self) -> Result<TickOutcome> {
        self.stats.ticks += 1;
        let result = self.step().await;

        match &result {
            Ok(outcome) => self.stats.record(outcome),
            Err(_) => self.stats.failures += 1,
        }

        result
    }

    async fn step(&mut self) -> Result<TickOutcome> {
        let call_timeout = self.config.call_timeout;

        let price = bounded(
            "price fetch",
            call_timeout,
            self.oracle.fetch_price(&self.config.symbol),
        )
        .await?;
        self.executor.mark_price(&self.config.base_asset, price);

        let decision = self.state.observe(PriceSample::now(price));

        match decision {
            Decision::Hold(reason) => Ok(TickOutcome::Held { price, reason }),
            Decision::Buy { .. } => {
                let amount = self.config.trade_amount;
                let available = self.balance_of(&self.config.quote_asset).await?;
                if available < amount {
                    return Err(insufficient(&self.config.quote_asset, available, amount));
                }

                let receipt = self
                    .submit(&self.config.quote_asset, &self.config.base_asset, amount)
                    .await?;
                let quantity = receipt.to_amount.unwrap_or(amount / price);

                self.state.commit(&decision, quantity)?;
                Ok(TickOutcome::Bought {
                    price,
                    quantity,
                    receipt,
                })
            }
            Decision::Sell { profit_pct, .. } => {
                let held = match self.state.position() {
                    Position::Long { quantity, .. } => quantity,
                    Position::Neutral => 0.0,
                };
                let available = self.balance_of(&self.config.base_asset).await?;
                if available <= 0.0 {
                    return Err(insufficient(&self.config.base_asset, available, held));
                }

                // Entry quantity may be an estimate when the receipt had no
                // fill amount; never sell more than the wallet holds
                let quantity = held.min(available);
                if quantity < held {
                    tracing::warn!(
                        held,
                        available,
                        "Wallet holds less {} than recorded, selling the balance",
                        self.config.base_asset
                    );
                }

                let receipt = self
                    .submit(&self.config.base_asset, &self.config.quote_asset, quantity)
                    .await?;

                self.state.commit(&decision, quantity)?;
                Ok(TickOutcome::Sold {
                    price,
                    profit_pct,
                    receipt,
                })
            }
        }
    }

    async fn balance_of(&self, asset: &str) -> Result<f64> {
        bounded(
            "balance check",
            self.config.call_timeout,
            self.executor.get_balance(asset),
        )
        .await
    }

    async fn submit(&self, from: &str, to: &str, amount: f64) -> Result<TransactionReceipt> {
        tracing::info!(from, to, amount, "Submitting trade");

        let receipt = match bounded(
            "trade",
            self.config.call_timeout,
            self.executor.trade(from, to, amount),
        )
        .await
        {
            Ok(receipt) => receipt,
            Err(e @ Error::Timeout(..)) => {
                tracing::error!(
                    from,
                    to,
                    amount,
                    "❌ Trade timed out; the swap may still have executed, check the wallet"
                );
                return Err(e);
            }
            Err(e) => return Err(e),
        };

        if receipt.status == TransactionStatus::Failed {
            return Err(ExecutionError::Rejected(format!(
                "transaction {} failed",
                receipt.tx_hash.as_deref().unwrap_or("<unknown>")
            ))
            .into());
        }

        Ok(receipt)
    }

    /// Poll until `shutdown` flips to true or its sender is dropped
    ///
    /// Per-iteration failures are logged and the loop carries on after the
    /// normal delay.
    pub async fn run(&mut self, mut shutdown: watch::Receiver<bool>) -> SessionStats {
        tracing::info!(
            symbol = %self.config.symbol,
            interval_secs = self.config.poll_interval.as_secs(),
            "💹 Trading loop starting"
        );

        loop {
            if *shutdown.borrow() {
                break;
            }

            match self.tick().await {
                Ok(outcome) => log_outcome(&outcome),
                Err(e) => tracing::warn!("✗ Iteration failed: {}", e),
            }

            tokio::select! {
                _ = sleep(self.config.poll_interval) => {}
                _ = shutdown.changed() => break,
            }
        }

        tracing::info!(
            ticks = self.stats.ticks,
            buys = self.stats.buys,
            sells = self.stats.sells,
            failures = self.stats.failures,
            realized_pct = self.stats.realized_pct * 100.0,
            "Trading loop stopped"
        );

        self.stats.clone()
    }
}

fn insufficient(asset: &str, available: f64, required: f64) -> Error {
    ExecutionError::InsufficientFunds {
        asset: asset.to_string(),
        available: Some(available),
        required,
    }
    .into()
}

async fn bounded<T, E, F>(what: &'static str, limit: Duration, call: F) -> Result<T>
where
    F: Future<Output = std::result::Result<T, E>>,
    E: Into<Error>,
{
    match timeout(limit, call).await {
        Ok(result) => result.map_err(Into::into),
        Err(_) => Err(Error::Timeout(what, limit.as_secs())),
    }
}

/// Log a completed iteration at info level
pub fn log_outcome(outcome: &TickOutcome) {
    match outcome {
        TickOutcome::Held { price, reason } => {
            tracing::info!(price, "Holding: {:?}", reason);
        }
        TickOutcome::Bought {
            price,
            quantity,
            receipt,
        } => {
            tracing::info!(
                price,
                quantity,
                tx = receipt.tx_hash.as_deref().unwrap_or("-"),
                "✅ Bought"
            );
        }
        TickOutcome::Sold {
            price,
            profit_pct,
            receipt,
        } => {
            tracing::info!(
                price,
                profit_pct = profit_pct * 100.0,
                tx = receipt.tx_hash.as_deref().unwrap_or("-"),
                "✅ Sold"
            );
        }
    }
}
