use swapbot::backtest::{BacktestMetrics, BacktestRunner, MarketScenario, SyntheticPriceGenerator};
use swapbot::strategy::StrategyConfig;
use swapbot::Result;

const SEED: u64 = 42;
const SAMPLES: usize = 500;
const INITIAL_QUOTE: f64 = 1_000.0;
const TRADE_AMOUNT: f64 = 100.0;
const FEE_BPS: f64 = 30.0;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("swapbot=warn")
        .init();

    println!("\n╔═══════════════════════════════════════════════════════╗");
    println!("║          SWAPBOT BACKTESTING SUITE                    ║");
    println!("╚═══════════════════════════════════════════════════════╝");

    let strategy = StrategyConfig::default();
    println!(
        "\nStrategy: SMA({}) entry, +{:.1}% take profit, -{:.1}% stop loss",
        strategy.ma_period,
        strategy.take_profit_pct * 100.0,
        strategy.stop_loss_pct * 100.0
    );

    let runner = BacktestRunner::new(INITIAL_QUOTE, TRADE_AMOUNT, strategy).with_fee_bps(FEE_BPS);

    let scenarios = [
        (MarketScenario::Uptrend, "📈 Uptrend"),
        (MarketScenario::Downtrend, "📉 Downtrend"),
        (MarketScenario::Sideways, "↔️  Sideways (mean-reverting)"),
        (MarketScenario::Volatile, "⚡ Volatile (±5% swings)"),
    ];

    let mut all_metrics = Vec::new();

    for (scenario, name) in scenarios {
        let mut generator = SyntheticPriceGenerator::new(SEED);
        let prices = generator.generate(scenario, SAMPLES);

        match runner.run_and_report(prices, name).await {
            Ok(metrics) => all_metrics.push((name.to_string(), metrics)),
            Err(e) => eprintln!("❌ Backtest failed for {}: {}", name, e),
        }
    }

    print_summary_comparison(&all_metrics);

    Ok(())
}

fn print_summary_comparison(results: &[(String, BacktestMetrics)]) {
    println!("\n╔═══════════════════════════════════════════════════════╗");
    println!("║              SCENARIO COMPARISON                      ║");
    println!("╚═══════════════════════════════════════════════════════╝\n");

    println!(
        "{:<30} {:>10} {:>10} {:>8} {:>8} {:>8}",
        "Scenario", "P&L", "Return%", "Trades", "Win%", "MaxDD%"
    );
    println!("{}", "─".repeat(78));

    for (name, metrics) in results {
        println!(
            "{:<30} {:>10.2} {:>10.2} {:>8} {:>8.1} {:>8.2}",
            name,
            metrics.total_pnl,
            metrics.total_return_pct,
            metrics.total_trades,
            metrics.win_rate,
            metrics.max_drawdown_pct
        );
    }

    println!();

    if let Some((best_name, best)) = results
        .iter()
        .max_by(|a, b| a.1.total_return_pct.total_cmp(&b.1.total_return_pct))
    {
        println!("🏆 Best Scenario: {} ({:+.2}%)", best_name, best.total_return_pct);
    }

    if let Some((worst_name, worst)) = results
        .iter()
        .min_by(|a, b| a.1.total_return_pct.total_cmp(&b.1.total_return_pct))
    {
        println!("⚠️  Worst Scenario: {} ({:+.2}%)", worst_name, worst.total_return_pct);
    }

    let total_trades: usize = results.iter().map(|(_, m)| m.total_trades).sum();
    let avg_win_rate = if results.is_empty() {
        0.0
    } else {
        results.iter().map(|(_, m)| m.win_rate).sum::<f64>() / results.len() as f64
    };

    println!("\n📊 Overall Statistics:");
    println!("   Total Trades Across All Scenarios: {}", total_trades);
    println!("   Average Win Rate: {:.1}%", avg_win_rate);

    println!("\n═══════════════════════════════════════════════════════\n");
}
