//! Shared fixtures: a small deployed protocol and helpers to script
//! transactions against it.

#![allow(dead_code)]

use prism_indexer::datasource::{MockChain, VecFeed};
use prism_indexer::domain::{
    Address, ChainEvent, Decimal, EventMeta, LoggedEvent, TxHash, I256, U256,
};
use prism_indexer::store::EntityStore;
use prism_indexer::{IndexStats, Indexer, IndexerError};
use std::sync::Arc;

pub const Q96: u128 = 1 << 96;

pub fn addr(n: u64) -> Address {
    Address::parse(&format!("0x{:040x}", n)).unwrap()
}

pub fn dec(s: &str) -> Decimal {
    Decimal::from_str_canonical(s).unwrap()
}

/// `amount * 10^decimals` as a raw on-chain integer.
pub fn raw(amount: u128, decimals: u32) -> U256 {
    U256::from(amount) * U256::from(10u128.pow(decimals))
}

/// A raw amount as a signed pool delta.
pub fn signed(value: U256) -> I256 {
    I256::from_dec_str(&value.to_string()).unwrap()
}

pub fn tx_hash(block: u64, tx_index: u32) -> TxHash {
    TxHash::parse(&format!("0x{:056x}{:08x}", block, tx_index)).unwrap()
}

/// Addresses of one deployed market with its collateral and pool.
#[derive(Debug, Clone)]
pub struct Protocol {
    pub factory: Address,
    pub amm_factory: Address,
    pub market: Address,
    pub long: Address,
    pub short: Address,
    pub collateral: Address,
    pub base: Address,
    pub treasury: Address,
    pub pool: Address,
    pub long_decimals: u32,
    pub collateral_decimals: u32,
}

impl Protocol {
    /// Long/short tokens with 18 decimals, collateral and base with 6.
    pub fn new() -> Self {
        Self::with_decimals(18, 6)
    }

    pub fn with_decimals(long_decimals: u32, collateral_decimals: u32) -> Self {
        Self {
            factory: addr(0xf0),
            amm_factory: addr(0xf1),
            market: addr(0xa0),
            long: addr(0xa1),
            short: addr(0xa2),
            collateral: addr(0xc0),
            base: addr(0xb0),
            treasury: addr(0xe0),
            pool: addr(0xd0),
            long_decimals,
            collateral_decimals,
        }
    }

    pub fn chain(&self) -> MockChain {
        MockChain::new()
            .with_token(&self.long, self.long_decimals, "Prism Long", "pLONG")
            .with_token(&self.short, self.long_decimals, "Prism Short", "pSHORT")
            .with_token(&self.collateral, self.collateral_decimals, "Prism USD", "pUSD")
            .with_token(&self.base, self.collateral_decimals, "USD Coin", "USDC")
            .with_base_token(&self.collateral, &self.base)
            .with_treasury(&self.collateral, &self.treasury)
    }

    /// Factory events that register the collateral, the market and its
    /// long/collateral pool (long token is token0), all in block 1.
    pub fn bootstrap(&self) -> Vec<LoggedEvent> {
        let mut tx = TxBuilder::new(1, 0);
        tx.push(
            &self.factory,
            ChainEvent::CollateralValidityChanged {
                collateral: self.collateral.clone(),
                allowed: true,
            },
        );
        tx.push(
            &self.factory,
            ChainEvent::MarketAdded {
                market: self.market.clone(),
                long_short_hash: format!("0x{}", "42".repeat(32)),
            },
        );
        tx.push(
            &self.market,
            ChainEvent::MarketCreated {
                long_token: self.long.clone(),
                short_token: self.short.clone(),
                floor_long_price: dec("0.1"),
                ceiling_long_price: dec("0.9"),
                floor_valuation: dec("0"),
                ceiling_valuation: dec("100"),
                minting_fee: dec("0.01"),
                redemption_fee: dec("0.01"),
                expiry_time: 1_800_000_000,
            },
        );
        tx.push(
            &self.amm_factory,
            ChainEvent::PoolCreated {
                token0: self.long.clone(),
                token1: self.collateral.clone(),
                fee: 3000,
                tick_spacing: 60,
                pool: self.pool.clone(),
            },
        );
        tx.build()
    }

    /// Owner sends base into the collateral contract and gets it minted back.
    pub fn deposit(&self, block: u64, owner: &Address, amount: u128) -> Vec<LoggedEvent> {
        let value = raw(amount, self.collateral_decimals);
        TxBuilder::new(block, 0)
            .transfer(&self.base, owner, &self.collateral, value)
            .transfer(&self.collateral, &Address::zero(), owner, value)
            .build()
    }

    /// Owner burns collateral and gets base back from the collateral contract.
    pub fn withdraw(&self, block: u64, owner: &Address, amount: u128) -> Vec<LoggedEvent> {
        let value = raw(amount, self.collateral_decimals);
        TxBuilder::new(block, 0)
            .transfer(&self.collateral, owner, &Address::zero(), value)
            .transfer(&self.base, &self.collateral, owner, value)
            .build()
    }

    /// Owner pays `collateral` into the pool for `long` long tokens.
    pub fn open(
        &self,
        block: u64,
        owner: &Address,
        collateral: u128,
        long: u128,
        sqrt_price_x96: u128,
    ) -> Vec<LoggedEvent> {
        let paid = raw(collateral, self.collateral_decimals);
        let bought = raw(long, self.long_decimals);
        TxBuilder::new(block, 0)
            .transfer(&self.collateral, owner, &self.pool, paid)
            .transfer(&self.long, &self.pool, owner, bought)
            .swap(&self.pool, owner, owner, -signed(bought), signed(paid), sqrt_price_x96)
            .build()
    }

    /// Owner sells `long` long tokens back to the pool for `collateral`.
    pub fn close(
        &self,
        block: u64,
        owner: &Address,
        long: u128,
        collateral: u128,
        sqrt_price_x96: u128,
    ) -> Vec<LoggedEvent> {
        let sold = raw(long, self.long_decimals);
        let received = raw(collateral, self.collateral_decimals);
        TxBuilder::new(block, 0)
            .transfer(&self.long, owner, &self.pool, sold)
            .transfer(&self.collateral, &self.pool, owner, received)
            .swap(&self.pool, owner, owner, signed(sold), -signed(received), sqrt_price_x96)
            .build()
    }
}

/// Events of one transaction, numbered by log index in push order.
pub struct TxBuilder {
    block: u64,
    tx_index: u32,
    events: Vec<LoggedEvent>,
}

impl TxBuilder {
    pub fn new(block: u64, tx_index: u32) -> Self {
        Self {
            block,
            tx_index,
            events: Vec::new(),
        }
    }

    pub fn hash(&self) -> TxHash {
        tx_hash(self.block, self.tx_index)
    }

    pub fn push(&mut self, emitter: &Address, event: ChainEvent) {
        let meta = EventMeta {
            block_number: self.block,
            block_timestamp: 1_700_000_000 + self.block as i64 * 12,
            transaction_index: self.tx_index,
            log_index: self.events.len() as u32,
            tx_hash: self.hash(),
            address: emitter.clone(),
        };
        self.events.push(LoggedEvent { meta, event });
    }

    pub fn transfer(mut self, token: &Address, from: &Address, to: &Address, value: U256) -> Self {
        self.push(
            token,
            ChainEvent::Transfer {
                from: from.clone(),
                to: to.clone(),
                value,
            },
        );
        self
    }

    pub fn swap(
        mut self,
        pool: &Address,
        sender: &Address,
        recipient: &Address,
        amount0: I256,
        amount1: I256,
        sqrt_price_x96: u128,
    ) -> Self {
        self.push(
            pool,
            ChainEvent::Swap {
                sender: sender.clone(),
                recipient: recipient.clone(),
                amount0,
                amount1,
                sqrt_price_x96: U256::from(sqrt_price_x96),
                liquidity: 1_000_000,
                tick: 0,
            },
        );
        self
    }

    pub fn build(self) -> Vec<LoggedEvent> {
        self.events
    }
}

/// Re-number log indices so the events appear in the given order.
pub fn reorder(events: &[LoggedEvent], order: &[usize]) -> Vec<LoggedEvent> {
    order
        .iter()
        .enumerate()
        .map(|(log_index, &i)| {
            let mut event = events[i].clone();
            event.meta.log_index = log_index as u32;
            event
        })
        .collect()
}

pub async fn index(
    store: Arc<dyn EntityStore>,
    chain: MockChain,
    events: Vec<LoggedEvent>,
) -> Result<IndexStats, IndexerError> {
    let indexer = Indexer::new(store, Arc::new(chain));
    indexer.run(&mut VecFeed::new(events)).await
}
