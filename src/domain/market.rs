//! Market, pool and tracked-contract entities.

use crate::domain::{Address, BlockNumber, Decimal, Entity, EntityKind, U256};
use serde::{Deserialize, Serialize};

/// A long/short market. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Market {
    pub id: String,
    pub long_token: Address,
    pub short_token: Address,
    pub floor_long_price: Decimal,
    pub ceiling_long_price: Decimal,
    pub floor_valuation: Decimal,
    pub ceiling_valuation: Decimal,
    pub minting_fee: Decimal,
    pub redemption_fee: Decimal,
    pub expiry_time: u64,
    pub created_at_block: BlockNumber,
    pub created_at_timestamp: i64,
}

impl Entity for Market {
    const KIND: EntityKind = EntityKind::Market;

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrackedKind {
    Market,
}

/// A contract whose own events the indexer has started listening to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackedContract {
    pub id: String,
    pub kind: TrackedKind,
    pub registered_at_block: BlockNumber,
}

impl Entity for TrackedContract {
    const KIND: EntityKind = EntityKind::TrackedContract;

    fn id(&self) -> &str {
        &self.id
    }
}

/// AMM pool pairing a long/short token with a collateral token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pool {
    pub id: String,
    pub token0: Address,
    pub token1: Address,
    pub long_short_token: Address,
    pub collateral_token: Address,
    pub long_short_is_token0: bool,
    #[serde(with = "crate::domain::raw::u256_string")]
    pub sqrt_price_x96: U256,
    /// token0 per token1.
    pub token0_price: Decimal,
    /// token1 per token0.
    pub token1_price: Decimal,
}

impl Pool {
    /// Whether the collateral token sits at index 0.
    pub fn collateral_is_token0(&self) -> bool {
        !self.long_short_is_token0
    }
}

impl Entity for Pool {
    const KIND: EntityKind = EntityKind::Pool;

    fn id(&self) -> &str {
        &self.id
    }
}
