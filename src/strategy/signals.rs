use crate::models::TradeSide;
use std::fmt;

/// Why an open position is being closed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    TakeProfit,
    StopLoss,
}

/// Why no trade was proposed
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HoldReason {
    /// Not enough samples for the moving average yet
    CollectingData { have: usize, need: usize },
    /// Neutral, and price is not below the moving average
    AtOrAboveAverage { average: f64 },
    /// Long, and profit is inside the take-profit/stop-loss band
    WithinBand { profit_pct: f64 },
}

/// Outcome of observing one price sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Decision {
    Buy {
        price: f64,
        average: f64,
    },
    Sell {
        price: f64,
        entry_price: f64,
        profit_pct: f64,
        exit_reason: ExitReason,
    },
    Hold(HoldReason),
}

impl Decision {
    pub fn side(&self) -> Option<TradeSide> {
        match self {
            Decision::Buy { .. } => Some(TradeSide::Buy),
            Decision::Sell { .. } => Some(TradeSide::Sell),
            Decision::Hold(_) => None,
        }
    }

    pub fn is_hold(&self) -> bool {
        matches!(self, Decision::Hold(_))
    }

    /// Realized profit fraction, for sells only
    pub fn profit_pct(&self) -> Option<f64> {
        match self {
            Decision::Sell { profit_pct, .. } => Some(*profit_pct),
            _ => None,
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decision::Buy { price, average } => {
                write!(f, "BUY @ {:.4} (below moving average {:.4})", price, average)
            }
            Decision::Sell {
                price,
                profit_pct,
                exit_reason,
                ..
            } => write!(
                f,
                "SELL @ {:.4} ({:?}, {:+.2}%)",
                price,
                exit_reason,
                profit_pct * 100.0
            ),
            Decision::Hold(HoldReason::CollectingData { have, need }) => {
                write!(f, "HOLD (collecting data {}/{})", have, need)
            }
            Decision::Hold(HoldReason::AtOrAboveAverage { average }) => {
                write!(f, "HOLD (price not below average {:.4})", average)
            }
            Decision::Hold(HoldReason::WithinBand { profit_pct }) => {
                write!(f, "HOLD (in position, {:+.2}%)", profit_pct * 100.0)
            }
        }
    }
}
