use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Market scenario types for synthetic price series
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarketScenario {
    /// Steady climb with light noise
    Uptrend,
    /// Steady decline with light noise
    Downtrend,
    /// Mean-reverting chop around the starting price
    Sideways,
    /// Large random swings (±5% per sample)
    Volatile,
}

impl MarketScenario {
    pub const ALL: [MarketScenario; 4] = [
        MarketScenario::Uptrend,
        MarketScenario::Downtrend,
        MarketScenario::Sideways,
        MarketScenario::Volatile,
    ];
}

/// Generates reproducible price series for backtesting
pub struct SyntheticPriceGenerator {
    rng: StdRng,
    base_price: f64,
}

impl SyntheticPriceGenerator {
    /// Create a new generator with a seed for reproducibility
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            base_price: 2000.0,
        }
    }

    pub fn with_base_price(mut self, base_price: f64) -> Self {
        self.base_price = base_price;
        self
    }

    /// Generate `num_samples` prices, oldest first
    pub fn generate(&mut self, scenario: MarketScenario, num_samples: usize) -> Vec<f64> {
        let mut prices = Vec::with_capacity(num_samples);
        let mut price = self.base_price;
        let floor = self.base_price * 0.1;

        for _ in 0..num_samples {
            let change = match scenario {
                MarketScenario::Uptrend => price * (0.002 + self.rng.gen_range(-0.004..0.004)),
                MarketScenario::Downtrend => {
                    price * (-0.002 + self.rng.gen_range(-0.004..0.004))
                }
                MarketScenario::Sideways => {
                    let reversion = (self.base_price - price) * 0.1;
                    reversion + price * self.rng.gen_range(-0.01..0.01)
                }
                MarketScenario::Volatile => price * self.rng.gen_range(-0.05..0.05),
            };

            price = (price + change).max(floor);
            prices.push(price);
        }

        prices
    }
}
