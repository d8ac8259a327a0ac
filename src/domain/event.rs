//! Chain events as delivered by the event feed.
//!
//! Events arrive already decoded; every event carries the log metadata needed
//! to order it canonically and to derive deterministic entity ids.

use crate::domain::raw::{i256_string, u128_string, u256_string, I256, U256};
use crate::domain::{Address, BlockNumber, Decimal, TxHash};
use serde::{Deserialize, Serialize};

/// Log metadata attached to every event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventMeta {
    pub block_number: BlockNumber,
    /// Block timestamp in seconds.
    pub block_timestamp: i64,
    pub transaction_index: u32,
    pub log_index: u32,
    pub tx_hash: TxHash,
    /// Contract that emitted the log.
    pub address: Address,
}

impl EventMeta {
    /// Canonical chain order: block, then transaction, then log.
    pub fn ordering_key(&self) -> OrderingKey {
        OrderingKey {
            block_number: self.block_number,
            transaction_index: self.transaction_index,
            log_index: self.log_index,
        }
    }
}

/// Position of a log in canonical chain order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OrderingKey {
    pub block_number: BlockNumber,
    pub transaction_index: u32,
    pub log_index: u32,
}

impl std::fmt::Display for OrderingKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            self.block_number, self.transaction_index, self.log_index
        )
    }
}

/// A decoded event with its metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggedEvent {
    pub meta: EventMeta,
    pub event: ChainEvent,
}

impl LoggedEvent {
    pub fn tag(&self) -> EventTag {
        self.event.tag()
    }
}

/// Events consumed by the indexer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ChainEvent {
    /// ERC20 `Transfer(from, to, value)`.
    Transfer {
        from: Address,
        to: Address,
        #[serde(with = "u256_string")]
        value: U256,
    },
    /// Concentrated-liquidity pool `Swap`. Amounts are signed from the pool's view.
    Swap {
        sender: Address,
        recipient: Address,
        #[serde(with = "i256_string")]
        amount0: I256,
        #[serde(with = "i256_string")]
        amount1: I256,
        /// Q64.96, up to 160 bits.
        #[serde(with = "u256_string")]
        sqrt_price_x96: U256,
        #[serde(with = "u128_string")]
        liquidity: u128,
        tick: i32,
    },
    /// Factory registered a new market contract.
    MarketAdded {
        market: Address,
        long_short_hash: String,
    },
    /// Emitted by a market on construction.
    MarketCreated {
        long_token: Address,
        short_token: Address,
        floor_long_price: Decimal,
        ceiling_long_price: Decimal,
        floor_valuation: Decimal,
        ceiling_valuation: Decimal,
        minting_fee: Decimal,
        redemption_fee: Decimal,
        expiry_time: u64,
    },
    CollateralValidityChanged {
        collateral: Address,
        allowed: bool,
    },
    /// AMM factory `PoolCreated(token0, token1, fee, tickSpacing, pool)`.
    PoolCreated {
        token0: Address,
        token1: Address,
        fee: u32,
        tick_spacing: i32,
        pool: Address,
    },
}

impl ChainEvent {
    pub fn tag(&self) -> EventTag {
        match self {
            ChainEvent::Transfer { .. } => EventTag::Transfer,
            ChainEvent::Swap { .. } => EventTag::Swap,
            ChainEvent::MarketAdded { .. } => EventTag::MarketAdded,
            ChainEvent::MarketCreated { .. } => EventTag::MarketCreated,
            ChainEvent::CollateralValidityChanged { .. } => EventTag::CollateralValidityChanged,
            ChainEvent::PoolCreated { .. } => EventTag::PoolCreated,
        }
    }
}

/// Dispatch key for handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventTag {
    Transfer,
    Swap,
    MarketAdded,
    MarketCreated,
    CollateralValidityChanged,
    PoolCreated,
}

impl std::fmt::Display for EventTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            EventTag::Transfer => "Transfer",
            EventTag::Swap => "Swap",
            EventTag::MarketAdded => "MarketAdded",
            EventTag::MarketCreated => "MarketCreated",
            EventTag::CollateralValidityChanged => "CollateralValidityChanged",
            EventTag::PoolCreated => "PoolCreated",
        };
        write!(f, "{}", name)
    }
}
