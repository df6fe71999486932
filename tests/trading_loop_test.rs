use mockito::Matcher;
use swapbot::api::{AgentWalletClient, Credentials, PythClient};
use swapbot::execution::{ReplayOracle, SimulatedExecutor, TickOutcome};
use swapbot::strategy::HoldReason;
use swapbot::*;
use tokio::time::Duration;

fn trader_config() -> TraderConfig {
    TraderConfig {
        trade_amount: 100.0,
        poll_interval: Duration::ZERO,
        call_timeout: Duration::from_secs(5),
        ..Default::default()
    }
}

fn credentials() -> Credentials {
    Credentials {
        api_key_name: "organizations/test/apiKeys/key".to_string(),
        api_key_private_key: "secret".to_string(),
    }
}

#[tokio::test]
async fn test_paper_trading_take_profit_cycle() {
    let _ = tracing_subscriber::fmt::try_init();

    let prices = vec![10.0, 10.0, 10.0, 10.0, 10.0, 9.0, 9.1, 9.3];
    let mut trader = Trader::new(
        ReplayOracle::new("ETH", prices),
        SimulatedExecutor::new("usdc", 1000.0),
        TradingState::default(),
        trader_config(),
    );

    let mut outcomes = Vec::new();
    for _ in 0..8 {
        outcomes.push(trader.tick().await.unwrap());
    }

    // Warm-up: four samples short of a full window, then flat at the average
    for outcome in &outcomes[..4] {
        assert!(matches!(
            outcome,
            TickOutcome::Held {
                reason: HoldReason::CollectingData { need: 5, .. },
                ..
            }
        ));
    }
    assert!(matches!(
        outcomes[4],
        TickOutcome::Held {
            reason: HoldReason::AtOrAboveAverage { .. },
            ..
        }
    ));
    assert!(matches!(outcomes[5], TickOutcome::Bought { price, .. } if price == 9.0));
    assert!(matches!(
        outcomes[6],
        TickOutcome::Held {
            reason: HoldReason::WithinBand { .. },
            ..
        }
    ));
    match &outcomes[7] {
        TickOutcome::Sold { profit_pct, .. } => assert!(*profit_pct >= 0.02),
        other => panic!("expected a sell, got {:?}", other),
    }

    assert_eq!(trader.state().position(), Position::Neutral);
    assert_eq!(trader.stats().buys, 1);
    assert_eq!(trader.stats().sells, 1);
    assert_eq!(trader.stats().wins, 1);

    let quote = trader.executor().get_balance("usdc").await.unwrap();
    assert!((quote - (900.0 + 100.0 / 9.0 * 9.3)).abs() < 1e-9);
    assert_eq!(trader.executor().get_balance("eth").await.unwrap(), 0.0);
}

#[tokio::test]
async fn test_paper_trading_stop_loss() {
    let prices = vec![10.0, 10.0, 10.0, 10.0, 10.0, 9.0, 8.9];
    let mut trader = Trader::new(
        ReplayOracle::new("ETH", prices),
        SimulatedExecutor::new("usdc", 1000.0),
        TradingState::default(),
        trader_config(),
    );

    for _ in 0..6 {
        trader.tick().await.unwrap();
    }
    assert!(trader.state().position().is_long());

    match trader.tick().await.unwrap() {
        TickOutcome::Sold { profit_pct, .. } => assert!(profit_pct <= -0.01),
        other => panic!("expected stop loss, got {:?}", other),
    }
    assert_eq!(trader.stats().losses, 1);
    assert!(trader.executor().get_balance("usdc").await.unwrap() < 1000.0);
}

#[tokio::test]
async fn test_wallet_service_buy_commits_position() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/v1/actions/get_balance")
        .match_body(Matcher::PartialJson(serde_json::json!({
            "args": { "asset_id": "usdc" }
        })))
        .with_status(200)
        .with_body(r#"{"balance": 500.0}"#)
        .create_async()
        .await;
    let trade = server
        .mock("POST", "/v1/actions/trade")
        .match_body(Matcher::PartialJson(serde_json::json!({
            "network_id": "base-sepolia",
            "args": { "from_asset_id": "usdc", "to_asset_id": "eth", "amount": 100.0 }
        })))
        .with_status(200)
        .with_body(r#"{"transaction_hash": "0xfeed", "to_amount": 11.0, "status": "complete"}"#)
        .expect(1)
        .create_async()
        .await;

    let wallet = AgentWalletClient::new(server.url(), Network::BaseSepolia, credentials());
    let mut trader = Trader::new(
        ReplayOracle::new("ETH", vec![10.0, 10.0, 10.0, 10.0, 10.0, 9.0]),
        wallet,
        TradingState::default(),
        trader_config(),
    );

    for _ in 0..5 {
        trader.tick().await.unwrap();
    }
    match trader.tick().await.unwrap() {
        TickOutcome::Bought {
            price,
            quantity,
            receipt,
        } => {
            assert_eq!(price, 9.0);
            assert_eq!(quantity, 11.0);
            assert_eq!(receipt.tx_hash.as_deref(), Some("0xfeed"));
        }
        other => panic!("expected a buy, got {:?}", other),
    }

    assert_eq!(
        trader.state().position(),
        Position::Long {
            entry_price: 9.0,
            quantity: 11.0
        }
    );
    trade.assert_async().await;
}

#[tokio::test]
async fn test_failed_transaction_leaves_state_neutral() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/v1/actions/get_balance")
        .with_status(200)
        .with_body(r#"{"balance": 500.0}"#)
        .create_async()
        .await;
    server
        .mock("POST", "/v1/actions/trade")
        .with_status(200)
        .with_body(r#"{"transaction_hash": "0xdead", "status": "failed"}"#)
        .create_async()
        .await;

    let wallet = AgentWalletClient::new(server.url(), Network::BaseSepolia, credentials());
    let mut trader = Trader::new(
        ReplayOracle::new("ETH", vec![10.0, 10.0, 10.0, 10.0, 10.0, 9.0]),
        wallet,
        TradingState::default(),
        trader_config(),
    );

    for _ in 0..5 {
        trader.tick().await.unwrap();
    }
    let result = trader.tick().await;

    assert!(matches!(result, Err(Error::Execution(_))));
    assert_eq!(trader.state().position(), Position::Neutral);
    assert_eq!(trader.state().entry_price(), None);
    assert_eq!(trader.stats().failures, 1);
    // The sample is still recorded for the average
    assert_eq!(trader.state().history().len(), 6);
}

#[tokio::test]
async fn test_insufficient_wallet_balance_skips_trade() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/v1/actions/get_balance")
        .with_status(200)
        .with_body(r#"{"balance": 5.0}"#)
        .create_async()
        .await;
    let trade = server
        .mock("POST", "/v1/actions/trade")
        .expect(0)
        .create_async()
        .await;

    let wallet = AgentWalletClient::new(server.url(), Network::BaseSepolia, credentials());
    let mut trader = Trader::new(
        ReplayOracle::new("ETH", vec![10.0, 10.0, 10.0, 10.0, 10.0, 9.0]),
        wallet,
        TradingState::default(),
        trader_config(),
    );

    for _ in 0..5 {
        trader.tick().await.unwrap();
    }
    assert!(matches!(
        trader.tick().await,
        Err(Error::Execution(error::ExecutionError::InsufficientFunds { .. }))
    ));
    assert_eq!(trader.state().position(), Position::Neutral);
    trade.assert_async().await;
}

#[tokio::test]
async fn test_pyth_oracle_drives_first_tick() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/v2/price_feeds")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            serde_json::json!([{
                "id": "abc123",
                "attributes": { "symbol": "Crypto.ETH/USD" }
            }])
            .to_string(),
        )
        .create_async()
        .await;
    server
        .mock("GET", "/v2/updates/price/latest")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            serde_json::json!({
                "parsed": [{
                    "id": "abc123",
                    "price": { "price": "312345", "expo": -2, "publish_time": 1_700_000_000 }
                }]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let mut trader = Trader::new(
        PythClient::with_base_url(server.url()),
        SimulatedExecutor::new("usdc", 1000.0),
        TradingState::default(),
        trader_config(),
    );

    match trader.tick().await.unwrap() {
        TickOutcome::Held { price, reason } => {
            assert_eq!(price, 3123.45);
            assert_eq!(reason, HoldReason::CollectingData { have: 1, need: 5 });
        }
        other => panic!("expected a hold, got {:?}", other),
    }
    assert_eq!(trader.state().history().latest().map(|s| s.price), Some(3123.45));
}

#[tokio::test]
async fn test_wallet_without_fill_amount_still_exits() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/v1/actions/get_balance")
        .match_body(Matcher::PartialJson(serde_json::json!({
            "args": { "asset_id": "usdc" }
        })))
        .with_body(r#"{"balance": 500.0}"#)
        .create_async()
        .await;
    // Fees left the wallet with less than 100 / 9
    server
        .mock("POST", "/v1/actions/get_balance")
        .match_body(Matcher::PartialJson(serde_json::json!({
            "args": { "asset_id": "eth" }
        })))
        .with_body(r#"{"balance": 11.05}"#)
        .create_async()
        .await;
    server
        .mock("POST", "/v1/actions/trade")
        .match_body(Matcher::PartialJson(serde_json::json!({
            "args": { "from_asset_id": "usdc" }
        })))
        .with_body(r#"{"transaction_hash": "0xbuy", "status": "pending"}"#)
        .create_async()
        .await;
    let sell = server
        .mock("POST", "/v1/actions/trade")
        .match_body(Matcher::PartialJson(serde_json::json!({
            "args": { "from_asset_id": "eth", "to_asset_id": "usdc", "amount": 11.05 }
        })))
        .with_body(r#"{"transaction_hash": "0xsell", "to_amount": 104.9, "status": "complete"}"#)
        .expect(1)
        .create_async()
        .await;

    let wallet = AgentWalletClient::new(server.url(), Network::BaseSepolia, credentials());
    let mut trader = Trader::new(
        ReplayOracle::new("ETH", vec![10.0, 10.0, 10.0, 10.0, 10.0, 9.0, 9.5]),
        wallet,
        TradingState::default(),
        trader_config(),
    );

    for _ in 0..5 {
        trader.tick().await.unwrap();
    }

    // Pending with no fill amount: committed with the notional estimate
    match trader.tick().await.unwrap() {
        TickOutcome::Bought {
            quantity, receipt, ..
        } => {
            assert!((quantity - 100.0 / 9.0).abs() < 1e-9);
            assert_eq!(receipt.status, TransactionStatus::Pending);
        }
        other => panic!("expected a buy, got {:?}", other),
    }
    assert_eq!(trader.state().entry_price(), Some(9.0));

    match trader.tick().await.unwrap() {
        TickOutcome::Sold { receipt, .. } => assert_eq!(receipt.from_amount, 11.05),
        other => panic!("expected a sell, got {:?}", other),
    }
    assert_eq!(trader.state().position(), Position::Neutral);
    sell.assert_async().await;
}
