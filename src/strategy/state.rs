use crate::error::StrategyError;
use crate::indicators::calculate_sma;
use crate::models::PriceSample;
use crate::strategy::{Decision, ExitReason, HoldReason, PriceHistory, StrategyConfig};

/// Slack on the exit band comparisons, far below any meaningful price move
const BAND_EPSILON: f64 = 1e-9;

/// Whether the strategy currently holds the risk asset
///
/// The entry price only exists while long.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Position {
    Neutral,
    Long { entry_price: f64, quantity: f64 },
}

impl Position {
    pub fn is_long(&self) -> bool {
        matches!(self, Position::Long { .. })
    }

    pub fn entry_price(&self) -> Option<f64> {
        match self {
            Position::Long { entry_price, .. } => Some(*entry_price),
            Position::Neutral => None,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Position::Neutral => "neutral",
            Position::Long { .. } => "long",
        }
    }
}

/// Moving-average dip buyer with a fixed exit band
///
/// `observe` records a sample and proposes a trade. The position only moves
/// when the caller `commit`s a decision after the trade went through, so a
/// failed trade leaves the state untouched.
#[derive(Debug, Clone)]
pub struct TradingState {
    config: StrategyConfig,
    position: Position,
    history: PriceHistory,
}

impl TradingState {
    pub fn new(config: StrategyConfig) -> Self {
        let history = PriceHistory::new(config.history_capacity);
        Self {
            config,
            position: Position::Neutral,
            history,
        }
    }

    pub fn config(&self) -> &StrategyConfig {
        &self.config
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn entry_price(&self) -> Option<f64> {
        self.position.entry_price()
    }

    pub fn history(&self) -> &PriceHistory {
        &self.history
    }

    /// Record a price sample and decide what to do about it
    pub fn observe(&mut self, sample: PriceSample) -> Decision {
        self.history.push(sample);
        let decision = self.decide(sample.price);

        tracing::debug!(
            price = sample.price,
            samples = self.history.len(),
            position = self.position.name(),
            %decision,
            "Observed price"
        );

        decision
    }

    /// Decide against the recorded history without mutating anything
    ///
    /// `price` is expected to be the most recent recorded sample.
    pub fn decide(&self, price: f64) -> Decision {
        match self.position {
            Position::Neutral => self.entry_decision(price),
            Position::Long { entry_price, .. } => self.exit_decision(price, entry_price),
        }
    }

    fn entry_decision(&self, price: f64) -> Decision {
        let need = self.config.ma_period;
        let Some(average) = calculate_sma(self.history.prices(), need) else {
            return Decision::Hold(HoldReason::CollectingData {
                have: self.history.len(),
                need,
            });
        };

        if price < average {
            Decision::Buy { price, average }
        } else {
            Decision::Hold(HoldReason::AtOrAboveAverage { average })
        }
    }

    fn exit_decision(&self, price: f64, entry_price: f64) -> Decision {
        let profit_pct = (price - entry_price) / entry_price;

        // Both edges inclusive; prices like 9.0 -> 9.18 land a hair under 2%
        let exit_reason = if profit_pct >= self.config.take_profit_pct - BAND_EPSILON {
            Some(ExitReason::TakeProfit)
        } else if profit_pct <= -self.config.stop_loss_pct + BAND_EPSILON {
            Some(ExitReason::StopLoss)
        } else {
            None
        };

        match exit_reason {
            Some(exit_reason) => Decision::Sell {
                price,
                entry_price,
                profit_pct,
                exit_reason,
            },
            None => Decision::Hold(HoldReason::WithinBand { profit_pct }),
        }
    }

    /// Apply a decision whose trade has been confirmed
    ///
    /// # Arguments
    /// * `quantity` - Base-asset quantity acquired by a buy (ignored for sells)
    pub fn commit(&mut self, decision: &Decision, quantity: f64) -> Result<(), StrategyError> {
        match (decision, self.position) {
            (Decision::Buy { price, .. }, Position::Neutral) => {
                self.position = Position::Long {
                    entry_price: *price,
                    quantity,
                };
                tracing::info!(entry_price = price, quantity, "Entered long position");
                Ok(())
            }
            (Decision::Sell { profit_pct, .. }, Position::Long { .. }) => {
                self.position = Position::Neutral;
                tracing::info!(profit_pct = profit_pct * 100.0, "Closed position");
                Ok(())
            }
            (Decision::Hold(_), _) => Ok(()),
            (Decision::Buy { .. }, position) => Err(StrategyError::InvalidTransition {
                action: "buy",
                position: position.name(),
            }),
            (Decision::Sell { .. }, position) => Err(StrategyError::InvalidTransition {
                action: "sell",
                position: position.name(),
            }),
        }
    }
}

impl Default for TradingState {
    fn default() -> Self {
        Self::new(StrategyConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(state: &mut TradingState, prices: &[f64]) -> Vec<Decision> {
        prices
            .iter()
            .map(|p| state.observe(PriceSample::now(*p)))
            .collect()
    }

    fn long_at(entry_price: f64) -> TradingState {
        let mut state = TradingState::default();
        let decisions = feed(&mut state, &[entry_price + 1.0; 4]);
        assert!(decisions.iter().all(Decision::is_hold));
        let buy = state.observe(PriceSample::now(entry_price));
        assert!(matches!(buy, Decision::Buy { .. }));
        state.commit(&buy, 1.0).unwrap();
        state
    }

    #[test]
    fn test_starts_neutral() {
        let state = TradingState::default();
        assert_eq!(state.position(), Position::Neutral);
        assert!(state.entry_price().is_none());
        assert!(state.history().is_empty());
    }

    #[test]
    fn test_holds_until_five_samples() {
        let mut state = TradingState::default();

        // Strictly falling prices would buy as soon as the average exists
        let decisions = feed(&mut state, &[14.0, 13.0, 12.0, 11.0]);
        for (i, decision) in decisions.iter().enumerate() {
            assert_eq!(
                *decision,
                Decision::Hold(HoldReason::CollectingData {
                    have: i + 1,
                    need: 5
                })
            );
        }

        let fifth = state.observe(PriceSample::now(10.0));
        assert!(matches!(fifth, Decision::Buy { .. }));
    }

    #[test]
    fn test_buy_below_average() {
        let mut state = TradingState::default();
        feed(&mut state, &[10.0; 5]);

        let decision = state.observe(PriceSample::now(9.0));
        assert_eq!(
            decision,
            Decision::Buy {
                price: 9.0,
                average: 9.8
            }
        );

        // Deciding alone does not move the position
        assert_eq!(state.position(), Position::Neutral);

        state.commit(&decision, 2.0).unwrap();
        assert_eq!(state.entry_price(), Some(9.0));
        assert_eq!(
            state.position(),
            Position::Long {
                entry_price: 9.0,
                quantity: 2.0
            }
        );
    }

    #[test]
    fn test_hold_at_average() {
        let mut state = TradingState::default();
        let decisions = feed(&mut state, &[10.0; 6]);
        assert_eq!(
            decisions[5],
            Decision::Hold(HoldReason::AtOrAboveAverage { average: 10.0 })
        );
    }

    #[test]
    fn test_take_profit_at_two_percent() {
        let mut state = long_at(100.0);
        let decision = state.observe(PriceSample::now(102.0));

        assert_eq!(
            decision,
            Decision::Sell {
                price: 102.0,
                entry_price: 100.0,
                profit_pct: 0.02,
                exit_reason: ExitReason::TakeProfit,
            }
        );
    }

    #[test]
    fn test_stop_loss_boundary_is_inclusive() {
        let mut state = long_at(100.0);
        let decision = state.observe(PriceSample::now(99.0));

        assert!(matches!(
            decision,
            Decision::Sell {
                exit_reason: ExitReason::StopLoss,
                ..
            }
        ));
        assert_eq!(decision.profit_pct(), Some(-0.01));
    }

    #[test]
    fn test_band_edges_inclusive_at_uneven_entry_prices() {
        let mut state = long_at(9.0);
        assert!(matches!(
            state.observe(PriceSample::now(9.18)),
            Decision::Sell {
                exit_reason: ExitReason::TakeProfit,
                ..
            }
        ));
        assert!(matches!(
            state.observe(PriceSample::now(8.91)),
            Decision::Sell {
                exit_reason: ExitReason::StopLoss,
                ..
            }
        ));
        assert!(state.observe(PriceSample::now(9.17)).is_hold());
        assert!(state.observe(PriceSample::now(8.92)).is_hold());

        for entry in [3.3, 7.0, 9.0, 50.0, 1234.56] {
            let state = long_at(entry);
            assert!(!state.decide(entry * 1.02).is_hold(), "entry {}", entry);
            assert!(!state.decide(entry * 0.99).is_hold(), "entry {}", entry);
        }
    }

    #[test]
    fn test_hold_inside_band() {
        let mut state = long_at(100.0);
        let decision = state.observe(PriceSample::now(100.5));

        match decision {
            Decision::Hold(HoldReason::WithinBand { profit_pct }) => {
                assert!((profit_pct - 0.005).abs() < 1e-12);
            }
            other => panic!("expected hold, got {:?}", other),
        }
        assert!(state.position().is_long());
    }

    #[test]
    fn test_sell_commit_returns_to_neutral() {
        let mut state = long_at(100.0);
        let decision = state.observe(PriceSample::now(103.0));
        state.commit(&decision, 0.0).unwrap();

        assert_eq!(state.position(), Position::Neutral);
        assert!(state.entry_price().is_none());
    }

    #[test]
    fn test_uncommitted_buy_keeps_neutral() {
        let mut state = TradingState::default();
        feed(&mut state, &[10.0; 5]);

        // Trade failed, so no commit: next sample is judged as neutral again
        let first = state.observe(PriceSample::now(9.0));
        assert!(matches!(first, Decision::Buy { .. }));
        let second = state.observe(PriceSample::now(8.0));
        assert!(matches!(second, Decision::Buy { price, .. } if price == 8.0));
    }

    #[test]
    fn test_invalid_transitions_rejected() {
        let mut state = long_at(100.0);
        let buy = Decision::Buy {
            price: 90.0,
            average: 95.0,
        };
        assert_eq!(
            state.commit(&buy, 1.0),
            Err(StrategyError::InvalidTransition {
                action: "buy",
                position: "long"
            })
        );

        let mut neutral = TradingState::default();
        let sell = Decision::Sell {
            price: 1.0,
            entry_price: 1.0,
            profit_pct: 0.0,
            exit_reason: ExitReason::TakeProfit,
        };
        assert!(neutral.commit(&sell, 0.0).is_err());
        assert_eq!(neutral.position(), Position::Neutral);
    }

    #[test]
    fn test_history_bounded_and_fifo() {
        let mut state = TradingState::default();
        feed(&mut state, &(0..11).map(|i| 50.0 + i as f64).collect::<Vec<_>>());

        assert_eq!(state.history().len(), 10);
        assert!(!state.history().prices().any(|p| p == 50.0));
    }

    #[test]
    fn test_entry_price_iff_long_over_random_walk() {
        let mut state = TradingState::default();
        let mut price = 100.0;

        for i in 0..500 {
            // Deterministic zig-zag with drift changes
            let step = match i % 7 {
                0 | 3 => -1.7,
                1 | 5 => 1.1,
                2 => 2.9,
                _ => -0.4,
            };
            price += step;

            let before = state.position();
            let decision = state.observe(PriceSample::now(price));

            match decision {
                Decision::Buy { .. } => assert!(!before.is_long()),
                Decision::Sell { .. } => assert!(before.is_long()),
                Decision::Hold(_) => {}
            }

            state.commit(&decision, 1.0).unwrap();
            assert_eq!(state.position().is_long(), state.entry_price().is_some());
            if !decision.is_hold() {
                assert_ne!(before.is_long(), state.position().is_long());
            }
        }
    }
}
