use crate::backtest::metrics::{BacktestMetrics, TradeRecord};
use crate::execution::{ReplayOracle, SimulatedExecutor, TickOutcome, Trader, TraderConfig};
use crate::strategy::{StrategyConfig, TradingState};
use crate::Result;
use tokio::time::Duration;

/// Replays a price series through the live trading loop
///
/// Uses a `ReplayOracle` and a paper wallet, so the exact code path that
/// trades live is the one being measured.
pub struct BacktestRunner {
    initial_quote: f64,
    trade_amount: f64,
    fee_bps: f64,
    strategy: StrategyConfig,
}

impl BacktestRunner {
    pub fn new(initial_quote: f64, trade_amount: f64, strategy: StrategyConfig) -> Self {
        Self {
            initial_quote,
            trade_amount,
            fee_bps: 0.0,
            strategy,
        }
    }

    pub fn with_fee_bps(mut self, fee_bps: f64) -> Self {
        self.fee_bps = fee_bps;
        self
    }

    /// Run a backtest over `prices` (oldest first)
    pub async fn run(&self, prices: Vec<f64>) -> Result<BacktestMetrics> {
        self.strategy.validate()?;

        let config = TraderConfig {
            trade_amount: self.trade_amount,
            poll_interval: Duration::ZERO,
            ..Default::default()
        };
        let samples = prices.len();
        let oracle = ReplayOracle::new(config.symbol.clone(), prices);
        let executor = SimulatedExecutor::new(config.quote_asset.clone(), self.initial_quote)
            .with_fee_bps(self.fee_bps);

        let mut trader = Trader::new(
            oracle,
            executor,
            TradingState::new(self.strategy.clone()),
            config,
        );

        tracing::info!(samples, "Starting backtest");

        let mut trades = Vec::new();
        let mut equity_curve = Vec::with_capacity(samples);
        let mut entry: Option<(f64, f64, f64)> = None;

        for _ in 0..samples {
            match trader.tick().await {
                Ok(TickOutcome::Bought {
                    price,
                    quantity,
                    receipt,
                }) => {
                    entry = Some((price, quantity, receipt.from_amount));
                }
                Ok(TickOutcome::Sold { price, receipt, .. }) => {
                    if let Some((entry_price, quantity, cost)) = entry.take() {
                        let proceeds = receipt.to_amount.unwrap_or(quantity * price);
                        trades.push(TradeRecord {
                            entry_price,
                            exit_price: price,
                            quantity,
                            cost,
                            proceeds,
                            pnl: proceeds - cost,
                            pnl_pct: (price - entry_price) / entry_price * 100.0,
                        });
                    }
                }
                Ok(TickOutcome::Held { .. }) => {}
                Err(e) => tracing::debug!("Backtest tick failed: {}", e),
            }

            equity_curve.push(trader.executor().equity());
        }

        let metrics = BacktestMetrics::calculate(
            trades,
            &equity_curve,
            self.initial_quote,
            trader.stats().failures,
            trader.state().position().is_long(),
        );

        tracing::info!(
            "Backtest complete: {} trades, P&L: ${:.2} ({:.2}%)",
            metrics.total_trades,
            metrics.total_pnl,
            metrics.total_return_pct
        );

        Ok(metrics)
    }

    /// Run backtest and print report
    pub async fn run_and_report(&self, prices: Vec<f64>, scenario_name: &str) -> Result<BacktestMetrics> {
        println!("\n🔬 Running backtest: {}", scenario_name);
        println!("   Samples: {}", prices.len());
        println!("   Initial Balance: ${:.2}", self.initial_quote);

        let metrics = self.run(prices).await?;
        metrics.print_report();

        Ok(metrics)
    }
}
