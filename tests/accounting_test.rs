mod common;

use common::{addr, dec, index, raw, signed, Protocol, TxBuilder, Q96};
use prism_indexer::domain::{Address, LongShortToken, OrderingKey, Pool, Position, U256};
use prism_indexer::store::{EntityStore, MemoryStore, StoreExt};
use std::sync::Arc;

/// A swap that only moves the pool price, routed to a third party.
fn price_tick(protocol: &Protocol, block: u64, sqrt_price_x96: u128) -> TxBuilder {
    TxBuilder::new(block, 0).swap(
        &protocol.pool,
        &addr(0x77),
        &addr(0x77),
        -signed(raw(1, protocol.long_decimals)),
        signed(raw(1, protocol.collateral_decimals)),
        sqrt_price_x96,
    )
}

async fn position(store: &MemoryStore, protocol: &Protocol, owner: &Address) -> Position {
    store
        .load::<Position>(&Position::key(&protocol.long, owner))
        .await
        .unwrap()
        .expect("position missing")
}

#[tokio::test]
async fn test_one_to_one_price_update() {
    let protocol = Protocol::with_decimals(18, 18);
    let store = Arc::new(MemoryStore::new());

    let mut events = protocol.bootstrap();
    events.extend(price_tick(&protocol, 2, Q96).build());
    index(store.clone(), protocol.chain(), events).await.unwrap();

    let pool = store
        .load::<Pool>(protocol.pool.as_str())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(pool.sqrt_price_x96, U256::from(Q96));
    assert_eq!(pool.token0_price, dec("1"));
    assert_eq!(pool.token1_price, dec("1"));

    let long = store
        .load::<LongShortToken>(protocol.long.as_str())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(long.price_usd, dec("1"));
    assert_eq!(long.pool, Some(protocol.pool.clone()));
}

#[tokio::test]
async fn test_price_follows_long_side_of_pool() {
    let protocol = Protocol::with_decimals(18, 18);
    let store = Arc::new(MemoryStore::new());

    // sqrt price 1.5 -> 2.25 collateral per long token.
    let mut events = protocol.bootstrap();
    events.extend(price_tick(&protocol, 2, Q96 * 3 / 2).build());
    index(store.clone(), protocol.chain(), events).await.unwrap();

    let pool = store
        .load::<Pool>(protocol.pool.as_str())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(pool.token1_price, dec("2.25"));
    let long = store
        .load::<LongShortToken>(protocol.long.as_str())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(long.price_usd, pool.token1_price);
}

#[tokio::test]
async fn test_cost_basis_is_volume_weighted_over_buys() {
    let protocol = Protocol::with_decimals(18, 18);
    let user = addr(1);
    let long = protocol.long.clone();
    let chain = protocol
        .chain()
        .with_balance_at(&long, &user, 2, raw(10, 18))
        .with_balance_at(&long, &user, 3, raw(40, 18))
        .with_balance_at(&long, &user, 4, raw(60, 18));
    let store = Arc::new(MemoryStore::new());

    // 10 @ 0.25, 30 @ 1, 20 @ 2.25
    let buys = [(2, Q96 / 2, 10), (3, Q96, 30), (4, Q96 * 3 / 2, 20)];
    let mut events = protocol.bootstrap();
    for (block, sqrt, amount) in buys {
        events.extend(
            price_tick(&protocol, block, sqrt)
                .transfer(&long, &protocol.pool, &user, raw(amount, 18))
                .build(),
        );
    }
    index(store.clone(), chain, events).await.unwrap();

    let position = position(&store, &protocol, &user).await;
    assert_eq!(position.balance, dec("60"));
    // (10 * 0.25 + 30 * 1 + 20 * 2.25) / 60
    let expected = dec("77.5") / dec("60");
    assert!(
        (position.cost_basis - expected).abs() < dec("0.000000000000000001"),
        "cost basis {} != {}",
        position.cost_basis,
        expected
    );
    assert_eq!(position.updated_at_block, 4);
}

#[tokio::test]
async fn test_sells_keep_basis_and_exit_resets_it() {
    let protocol = Protocol::with_decimals(18, 18);
    let user = addr(1);
    let long = protocol.long.clone();
    let chain = protocol
        .chain()
        .with_balance_at(&long, &user, 2, raw(40, 18))
        .with_balance_at(&long, &user, 3, raw(25, 18))
        .with_balance_at(&long, &user, 4, raw(0, 18));
    let store = Arc::new(MemoryStore::new());

    let mut events = protocol.bootstrap();
    events.extend(
        price_tick(&protocol, 2, Q96 / 2)
            .transfer(&long, &protocol.pool, &user, raw(40, 18))
            .build(),
    );
    events.extend(
        price_tick(&protocol, 3, Q96)
            .transfer(&long, &user, &protocol.pool, raw(15, 18))
            .build(),
    );
    index(store.clone(), chain.clone(), events).await.unwrap();

    let after_sell = position(&store, &protocol, &user).await;
    assert_eq!(after_sell.balance, dec("25"));
    assert_eq!(after_sell.cost_basis, dec("0.25"));

    let exit = TxBuilder::new(4, 0)
        .transfer(&long, &user, &protocol.pool, raw(25, 18))
        .build();
    index(store.clone(), chain, exit).await.unwrap();

    let closed = position(&store, &protocol, &user).await;
    assert!(closed.balance.is_zero());
    assert!(closed.cost_basis.is_zero());
}

#[tokio::test]
async fn test_pool_and_mint_endpoints_hold_no_positions() {
    let protocol = Protocol::with_decimals(18, 18);
    let user = addr(1);
    let long = protocol.long.clone();
    let chain = protocol
        .chain()
        .with_balance_at(&long, &user, 2, raw(5, 18));
    let store = Arc::new(MemoryStore::new());

    let mut events = protocol.bootstrap();
    events.extend(
        TxBuilder::new(2, 0)
            .transfer(&long, &Address::zero(), &user, raw(5, 18))
            .transfer(&long, &user, &protocol.pool, raw(5, 18))
            .build(),
    );
    index(store.clone(), chain, events).await.unwrap();

    let positions = store.load_all::<Position>().await.unwrap();
    assert_eq!(positions.len(), 1);
    assert_eq!(positions[0].owner, user);
}

#[tokio::test]
async fn test_self_transfer_leaves_cost_basis_alone() {
    let protocol = Protocol::with_decimals(18, 18);
    let user = addr(1);
    let long = protocol.long.clone();
    let chain = protocol
        .chain()
        .with_balance_at(&long, &user, 2, raw(10, 18));
    let store = Arc::new(MemoryStore::new());

    let mut events = protocol.bootstrap();
    events.extend(
        price_tick(&protocol, 2, Q96 / 2)
            .transfer(&long, &protocol.pool, &user, raw(10, 18))
            .build(),
    );
    // Price moves to 4, then the owner sends tokens to itself.
    events.extend(
        price_tick(&protocol, 3, Q96 * 2)
            .transfer(&long, &user, &user, raw(5, 18))
            .build(),
    );
    index(store.clone(), chain, events).await.unwrap();

    let position = position(&store, &protocol, &user).await;
    assert_eq!(position.balance, dec("10"));
    assert_eq!(position.cost_basis, dec("0.25"));
    assert_eq!(position.updated_at_block, 2);
}

#[tokio::test]
async fn test_replayed_event_is_not_blended_twice() {
    let protocol = Protocol::with_decimals(18, 18);
    let user = addr(1);
    let long = protocol.long.clone();
    let chain = protocol
        .chain()
        .with_balance_at(&long, &user, 2, raw(10, 18))
        .with_balance_at(&long, &user, 3, raw(40, 18));
    let store = Arc::new(MemoryStore::new());

    let mut events = protocol.bootstrap();
    events.extend(
        price_tick(&protocol, 2, Q96 / 2)
            .transfer(&long, &protocol.pool, &user, raw(10, 18))
            .build(),
    );
    events.extend(
        price_tick(&protocol, 3, Q96)
            .transfer(&long, &protocol.pool, &user, raw(30, 18))
            .build(),
    );
    index(store.clone(), chain.clone(), events.clone())
        .await
        .unwrap();
    let before = position(&store, &protocol, &user).await;
    assert_eq!(before.cost_basis, dec("0.8125"));

    // The writes of block 3 landed but the cursor did not advance past them.
    store
        .store_cursor(OrderingKey {
            block_number: 2,
            transaction_index: 0,
            log_index: 1,
        })
        .await
        .unwrap();
    let stats = index(store.clone(), chain, events).await.unwrap();
    assert_eq!(stats.handled, 2);

    let after = position(&store, &protocol, &user).await;
    assert_eq!(after, before);
}

#[tokio::test]
async fn test_balance_beyond_decimal_range_skips_position() {
    let protocol = Protocol::with_decimals(18, 18);
    let user = addr(1);
    let long = protocol.long.clone();
    let chain = protocol
        .chain()
        .with_balance_at(&long, &user, 2, U256::from(1u8) << 200);
    let store = Arc::new(MemoryStore::new());

    let mut events = protocol.bootstrap();
    events.extend(
        TxBuilder::new(2, 0)
            .transfer(&long, &protocol.pool, &user, raw(5, 18))
            .build(),
    );
    let stats = index(store.clone(), chain, events).await.unwrap();
    assert_eq!(stats.handled, 5);
    assert!(store.load_all::<Position>().await.unwrap().is_empty());
}
