pub mod agent_wallet;
pub mod pyth;

pub use agent_wallet::{AgentWalletClient, Credentials};
pub use pyth::PythClient;
