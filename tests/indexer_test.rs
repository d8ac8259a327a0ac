mod common;

use common::{addr, index, raw, Protocol, TxBuilder};
use prism_indexer::datasource::{ChainError, JsonLinesFeed, MockChain};
use prism_indexer::domain::{
    CollateralToken, EntityKind, LongShortToken, Market, OrderingKey, Pool, Token, TokenType,
    TrackedContract,
};
use prism_indexer::store::{EntityStore, MemoryStore, StoreExt};
use prism_indexer::{Indexer, IndexerError};
use std::io::Write;
use std::sync::Arc;
use tempfile::NamedTempFile;

#[tokio::test]
async fn test_bootstrap_registers_protocol() {
    let protocol = Protocol::new();
    let store = Arc::new(MemoryStore::new());
    let stats = index(store.clone(), protocol.chain(), protocol.bootstrap())
        .await
        .unwrap();
    assert_eq!(stats.handled, 4);

    let collateral = store
        .load::<CollateralToken>(protocol.collateral.as_str())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(collateral.base_token, protocol.base);
    assert_eq!(collateral.treasury, Some(protocol.treasury.clone()));

    let base = store
        .load::<Token>(protocol.base.as_str())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(base.token_type, TokenType::CollateralBase);
    assert_eq!(base.symbol, "USDC");

    assert!(store
        .exists::<TrackedContract>(protocol.market.as_str())
        .await
        .unwrap());
    let market = store
        .load::<Market>(protocol.market.as_str())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(market.long_token, protocol.long);
    assert_eq!(market.created_at_block, 1);

    for side in [&protocol.long, &protocol.short] {
        let token = store.load::<Token>(side.as_str()).await.unwrap().unwrap();
        assert_eq!(token.token_type, TokenType::LongShort);
        assert_eq!(token.decimals, 18);
        let long_short = store
            .load::<LongShortToken>(side.as_str())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(long_short.market, protocol.market);
    }

    let pool = store
        .load::<Pool>(protocol.pool.as_str())
        .await
        .unwrap()
        .unwrap();
    assert!(pool.long_short_is_token0);
    assert_eq!(pool.collateral_token, protocol.collateral);
}

#[tokio::test]
async fn test_market_created_from_untracked_contract_is_ignored() {
    let protocol = Protocol::new();
    let store = Arc::new(MemoryStore::new());

    // MarketCreated without the preceding MarketAdded.
    let events: Vec<_> = protocol
        .bootstrap()
        .into_iter()
        .filter(|e| e.tag() != prism_indexer::domain::EventTag::MarketAdded)
        .collect();
    let stats = index(store.clone(), protocol.chain(), events).await.unwrap();

    assert_eq!(stats.ignored, 2);
    assert_eq!(store.count(EntityKind::Market).await, 0);
    assert_eq!(store.count(EntityKind::LongShortToken).await, 0);
    assert_eq!(store.count(EntityKind::Pool).await, 0);
}

#[tokio::test]
async fn test_non_erc20_collateral_is_not_registered() {
    let protocol = Protocol::new();
    let store = Arc::new(MemoryStore::new());
    let chain = MockChain::new();

    let stats = index(store.clone(), chain, protocol.bootstrap()).await.unwrap();
    assert_eq!(stats.handled, 2);
    assert_eq!(store.count(EntityKind::CollateralToken).await, 0);
    assert_eq!(store.count(EntityKind::Token).await, 0);
}

#[tokio::test]
async fn test_rerun_resumes_from_cursor() {
    let protocol = Protocol::new();
    let user = addr(1);
    let store = Arc::new(MemoryStore::new());

    let mut first = protocol.bootstrap();
    first.extend(protocol.deposit(2, &user, 100));
    let stats = index(store.clone(), protocol.chain(), first.clone())
        .await
        .unwrap();
    assert_eq!(stats.handled, 6);
    let snapshot = store.total().await;
    assert_eq!(
        store.load_cursor().await.unwrap(),
        Some(OrderingKey {
            block_number: 2,
            transaction_index: 0,
            log_index: 1,
        })
    );

    // Replaying the same feed changes nothing.
    let replay = index(store.clone(), protocol.chain(), first.clone())
        .await
        .unwrap();
    assert_eq!(replay.skipped, 6);
    assert_eq!(replay.handled, 0);
    assert_eq!(store.total().await, snapshot);

    // An extended feed only applies the new events.
    let mut extended = first;
    extended.extend(protocol.withdraw(3, &user, 50));
    let resumed = index(store.clone(), protocol.chain(), extended)
        .await
        .unwrap();
    assert_eq!(resumed.skipped, 6);
    assert_eq!(resumed.handled, 2);
}

#[tokio::test]
async fn test_out_of_order_feed_aborts() {
    let protocol = Protocol::new();
    let user = addr(1);
    let store = Arc::new(MemoryStore::new());

    let mut events = protocol.bootstrap();
    events.extend(protocol.deposit(3, &user, 100));
    events.extend(protocol.withdraw(2, &user, 50));
    let result = index(store.clone(), protocol.chain(), events).await;

    match result {
        Err(IndexerError::OutOfOrder { previous, got }) => {
            assert_eq!(previous.block_number, 3);
            assert_eq!(got.block_number, 2);
        }
        other => panic!("expected OutOfOrder, got {:?}", other),
    }
    // Everything before the offending event was applied.
    assert_eq!(store.load_cursor().await.unwrap().unwrap().block_number, 3);
}

#[tokio::test]
async fn test_chain_failure_aborts_run() {
    let protocol = Protocol::new();
    let store = Arc::new(MemoryStore::new());
    let chain = protocol.chain().failing(ChainError::Http { status: 503 });

    let result = index(store.clone(), chain, protocol.bootstrap()).await;
    assert!(matches!(
        result,
        Err(IndexerError::Chain(ChainError::Http { status: 503 }))
    ));
    assert_eq!(store.load_cursor().await.unwrap(), None);
}

#[tokio::test]
async fn test_json_lines_feed_drives_indexer() {
    let protocol = Protocol::new();
    let user = addr(1);
    let mut events = protocol.bootstrap();
    events.extend(protocol.deposit(2, &user, 100));

    let mut file = NamedTempFile::new().unwrap();
    for event in &events {
        writeln!(file, "{}", serde_json::to_string(event).unwrap()).unwrap();
        writeln!(file).unwrap();
    }
    file.flush().unwrap();

    let store = Arc::new(MemoryStore::new());
    let indexer = Indexer::new(store.clone(), Arc::new(protocol.chain()));
    let stats = indexer
        .run(&mut JsonLinesFeed::new(file.path()))
        .await
        .unwrap();
    assert_eq!(stats.handled, events.len() as u64);
}

#[tokio::test]
async fn test_malformed_feed_line_aborts() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "{{\"not\": \"an event\"}}").unwrap();
    file.flush().unwrap();

    let store = Arc::new(MemoryStore::new());
    let indexer = Indexer::new(store, Arc::new(MockChain::new()));
    let result = indexer.run(&mut JsonLinesFeed::new(file.path())).await;
    assert!(matches!(result, Err(IndexerError::Feed(_))));
}

#[tokio::test]
async fn test_amounts_beyond_decimal_range_are_skipped() {
    let protocol = Protocol::new();
    let user = addr(1);
    let huge = raw(1, 29);

    let mut events = protocol.bootstrap();
    events.extend(
        TxBuilder::new(2, 0)
            .transfer(&addr(0x5e), &addr(1), &addr(2), huge)
            .transfer(&protocol.collateral, &addr(1), &addr(2), huge)
            .build(),
    );
    events.extend(protocol.deposit(3, &user, 100));

    let mut file = NamedTempFile::new().unwrap();
    for event in &events {
        writeln!(file, "{}", serde_json::to_string(event).unwrap()).unwrap();
    }
    file.flush().unwrap();

    let store = Arc::new(MemoryStore::new());
    let indexer = Indexer::new(store.clone(), Arc::new(protocol.chain()));
    let stats = indexer
        .run(&mut JsonLinesFeed::new(file.path()))
        .await
        .unwrap();
    assert_eq!(stats.ignored, 2);
    assert_eq!(stats.handled, 6);
    assert_eq!(store.count(EntityKind::Transaction).await, 2);
}
