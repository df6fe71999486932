use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use swapbot::api::{AgentWalletClient, PythClient};
use swapbot::config::Settings;
use swapbot::execution::{log_outcome, SimulatedExecutor, TradeExecutor, Trader};
use swapbot::models::Network;
use swapbot::strategy::TradingState;
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "swapbot")]
#[command(about = "Moving-average swap bot for a single token pair")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to a TOML config file (defaults to ./swapbot.toml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the trading loop until Ctrl+C
    Run {
        /// Trade against an in-memory wallet instead of the wallet service
        #[arg(long)]
        simulate: bool,

        /// Seconds between iterations
        #[arg(short, long)]
        interval: Option<u64>,

        /// Network id (base-sepolia, base-mainnet)
        #[arg(short, long)]
        network: Option<Network>,

        /// Run a single iteration and exit
        #[arg(long)]
        once: bool,
    },

    /// Show the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let mut settings = match Settings::load(cli.config.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!("❌ {}", e);
            std::process::exit(1);
        }
    };

    match cli.command {
        Commands::Run {
            simulate,
            interval,
            network,
            once,
        } => {
            settings.simulate |= simulate;
            if let Some(secs) = interval {
                settings.poll_interval_secs = secs;
            }
            if let Some(network) = network {
                settings.network = network;
            }
            if let Err(e) = settings.validate() {
                tracing::error!("❌ {}", e);
                std::process::exit(1);
            }

            run(settings, once).await
        }
        Commands::Config => show_config(&settings),
    }
}

fn setup_logging(verbose: bool) {
    let default = if verbose { "swapbot=debug" } else { "swapbot=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn run(settings: Settings, once: bool) -> anyhow::Result<()> {
    tracing::info!(
        network = %settings.network,
        symbol = %settings.symbol,
        pair = %format!("{}/{}", settings.base_asset, settings.quote_asset),
        trade_amount = settings.trade_amount,
        simulate = settings.simulate,
        "🚀 Swapbot starting"
    );

    if !settings.network.is_testnet() && !settings.simulate {
        tracing::warn!("⚠️  Trading with real funds on {}", settings.network);
    }

    let executor = match build_executor(&settings) {
        Ok(executor) => executor,
        Err(e) => {
            tracing::error!("❌ Failed to initialize wallet: {:#}", e);
            std::process::exit(1);
        }
    };

    let oracle = PythClient::with_base_url(settings.oracle_url.clone());
    let mut trader = Trader::new(
        oracle,
        executor,
        TradingState::new(settings.strategy.clone()),
        settings.trader_config(),
    );

    if once {
        match trader.tick().await {
            Ok(outcome) => log_outcome(&outcome),
            Err(e) => tracing::warn!("✗ Iteration failed: {}", e),
        }
        return Ok(());
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let handle = tokio::spawn(async move { trader.run(shutdown_rx).await });

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for Ctrl+C")?;
    tracing::info!("👋 Shutting down...");
    shutdown_tx.send(true).ok();

    let stats = handle.await.context("trading loop panicked")?;
    tracing::info!(
        "📊 Session: {} ticks, {} buys, {} sells ({} wins / {} losses), {} failures, realized {:+.2}%",
        stats.ticks,
        stats.buys,
        stats.sells,
        stats.wins,
        stats.losses,
        stats.failures,
        stats.realized_pct * 100.0
    );

    Ok(())
}

fn build_executor(settings: &Settings) -> anyhow::Result<Box<dyn TradeExecutor>> {
    if settings.simulate {
        tracing::info!(
            "📝 Paper trading with {:.2} {}",
            settings.initial_quote_balance,
            settings.quote_asset
        );
        let executor =
            SimulatedExecutor::new(settings.quote_asset.clone(), settings.initial_quote_balance)
                .with_fee_bps(settings.simulated_fee_bps);
        return Ok(Box::new(executor));
    }

    let credentials = settings.require_credentials()?;
    tracing::info!("🔑 Using wallet service at {}", settings.wallet_url);

    Ok(Box::new(AgentWalletClient::new(
        settings.wallet_url.clone(),
        settings.network,
        credentials.clone(),
    )))
}

fn show_config(settings: &Settings) -> anyhow::Result<()> {
    let rendered = serde_json::to_string_pretty(settings)?;
    println!("{}", rendered);

    match &settings.credentials {
        Some(credentials) => println!("credentials: {:?}", credentials),
        None => println!("credentials: <not set>"),
    }

    Ok(())
}
