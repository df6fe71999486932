use serde::{Deserialize, Serialize};

/// One closed round trip
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TradeRecord {
    pub entry_price: f64,
    pub exit_price: f64,
    pub quantity: f64,
    /// Quote spent on entry
    pub cost: f64,
    /// Quote received on exit
    pub proceeds: f64,
    pub pnl: f64,
    /// Price move from entry to exit, in percent
    pub pnl_pct: f64,
}

impl TradeRecord {
    pub fn is_win(&self) -> bool {
        self.pnl > 0.0
    }
}

/// Backtest performance summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestMetrics {
    pub samples: usize,
    pub failed_ticks: u64,

    // P&L
    pub initial_value: f64,
    pub final_value: f64,
    pub total_pnl: f64,
    pub total_return_pct: f64,

    // Trades
    pub total_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    pub win_rate: f64,
    pub still_open: bool,

    // Risk
    pub max_drawdown_pct: f64,

    pub trades: Vec<TradeRecord>,
}

impl BacktestMetrics {
    /// Summarize closed trades and the per-tick equity curve
    pub fn calculate(
        trades: Vec<TradeRecord>,
        equity_curve: &[f64],
        initial_value: f64,
        failed_ticks: u64,
        still_open: bool,
    ) -> Self {
        let final_value = equity_curve.last().copied().unwrap_or(initial_value);
        let total_pnl = final_value - initial_value;
        let total_return_pct = if initial_value > 0.0 {
            total_pnl / initial_value * 100.0
        } else {
            0.0
        };

        let total_trades = trades.len();
        let winning_trades = trades.iter().filter(|t| t.is_win()).count();
        let losing_trades = total_trades - winning_trades;
        let win_rate = if total_trades > 0 {
            winning_trades as f64 / total_trades as f64 * 100.0
        } else {
            0.0
        };

        Self {
            samples: equity_curve.len(),
            failed_ticks,
            initial_value,
            final_value,
            total_pnl,
            total_return_pct,
            total_trades,
            winning_trades,
            losing_trades,
            win_rate,
            still_open,
            max_drawdown_pct: Self::max_drawdown_pct(initial_value, equity_curve),
            trades,
        }
    }

    fn max_drawdown_pct(initial_value: f64, equity_curve: &[f64]) -> f64 {
        let mut peak = initial_value;
        let mut max_dd = 0.0_f64;

        for value in equity_curve {
            peak = peak.max(*value);
            if peak > 0.0 {
                max_dd = max_dd.max((peak - value) / peak);
            }
        }

        max_dd * 100.0
    }

    /// Print a formatted report to stdout
    pub fn print_report(&self) {
        println!("\n╔═══════════════════════════════════════════════════════╗");
        println!("║              BACKTEST PERFORMANCE REPORT              ║");
        println!("╚═══════════════════════════════════════════════════════╝\n");

        println!("📊 P&L SUMMARY");
        println!("  Initial Value:         ${:.2}", self.initial_value);
        println!("  Final Value:           ${:.2}", self.final_value);
        println!(
            "  P&L:                   ${:.2} ({:+.2}%)",
            self.total_pnl, self.total_return_pct
        );
        println!("  Max Drawdown:          {:.2}%", self.max_drawdown_pct);

        println!("\n📈 TRADE STATISTICS");
        println!("  Samples:               {}", self.samples);
        println!("  Closed Trades:         {}", self.total_trades);
        println!(
            "  Winning Trades:        {} ({:.1}%)",
            self.winning_trades, self.win_rate
        );
        println!("  Losing Trades:         {}", self.losing_trades);
        println!("  Failed Ticks:          {}", self.failed_ticks);
        if self.still_open {
            println!("  Position still open at end of series");
        }

        println!("\n═══════════════════════════════════════════════════════\n");
    }
}
