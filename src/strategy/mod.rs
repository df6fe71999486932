// Trading decision engine
pub mod price_history;
pub mod signals;
pub mod state;

pub use price_history::PriceHistory;
pub use signals::{Decision, ExitReason, HoldReason};
pub use state::{Position, TradingState};

use crate::error::StrategyError;
use serde::{Deserialize, Serialize};

/// Thresholds for the moving-average entry and the exit band
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StrategyConfig {
    /// Samples kept in the rolling history
    pub history_capacity: usize,

    /// Samples averaged for the entry signal
    pub ma_period: usize,

    /// Exit once profit reaches this fraction (0.02 = 2%)
    pub take_profit_pct: f64,

    /// Exit once loss reaches this fraction (0.01 = 1%)
    pub stop_loss_pct: f64,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            history_capacity: 10,
            ma_period: 5,
            take_profit_pct: 0.02,
            stop_loss_pct: 0.01,
        }
    }
}

impl StrategyConfig {
    pub fn validate(&self) -> Result<(), StrategyError> {
        if self.ma_period == 0 {
            return Err(StrategyError::InvalidConfig(
                "ma_period must be at least 1".to_string(),
            ));
        }
        if self.ma_period > self.history_capacity {
            return Err(StrategyError::InvalidConfig(format!(
                "ma_period ({}) exceeds history_capacity ({})",
                self.ma_period, self.history_capacity
            )));
        }
        let positive = |v: f64| v.is_finite() && v > 0.0;
        if !positive(self.take_profit_pct) || !positive(self.stop_loss_pct) {
            return Err(StrategyError::InvalidConfig(
                "take_profit_pct and stop_loss_pct must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
