//! Token entities: ERC20 metadata plus the collateral and long/short extensions.

use crate::domain::{Address, Decimal, Entity, EntityKind};
use serde::{Deserialize, Serialize};

/// Role a token plays in the protocol. Assigned once, on first observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenType {
    Collateral,
    LongShort,
    CollateralBase,
}

impl std::fmt::Display for TokenType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenType::Collateral => write!(f, "COLLATERAL"),
            TokenType::LongShort => write!(f, "LONG_SHORT"),
            TokenType::CollateralBase => write!(f, "COLLATERAL_BASE"),
        }
    }
}

/// ERC20 metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    pub id: String,
    pub address: Address,
    pub decimals: u32,
    pub name: String,
    pub symbol: String,
    pub token_type: TokenType,
}

impl Entity for Token {
    const KIND: EntityKind = EntityKind::Token;

    fn id(&self) -> &str {
        &self.id
    }
}

/// Deposit receipt token backed 1:1 by a base token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollateralToken {
    pub id: String,
    pub token: Address,
    pub base_token: Address,
    pub treasury: Option<Address>,
}

impl Entity for CollateralToken {
    const KIND: EntityKind = EntityKind::CollateralToken;

    fn id(&self) -> &str {
        &self.id
    }
}

/// Synthetic position token of a market.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LongShortToken {
    pub id: String,
    pub token: Address,
    pub market: Address,
    pub pool: Option<Address>,
    /// Collateral per long/short token, from the latest swap in its pool.
    pub price_usd: Decimal,
}

impl Entity for LongShortToken {
    const KIND: EntityKind = EntityKind::LongShortToken;

    fn id(&self) -> &str {
        &self.id
    }
}
