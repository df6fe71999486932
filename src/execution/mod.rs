// Price polling, wallet execution and the trading loop
pub mod executor;
pub mod price_feed;
pub mod simulated;
pub mod trader;

pub use executor::TradeExecutor;
pub use price_feed::{PriceOracle, ReplayOracle};
pub use simulated::SimulatedExecutor;
pub use trader::{log_outcome, SessionStats, TickOutcome, Trader, TraderConfig};
