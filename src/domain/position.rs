//! Per-owner long/short holdings with a running cost basis.

use crate::domain::{Address, BlockNumber, Decimal, Entity, EntityKind, OrderingKey};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub id: String,
    pub owner: Address,
    pub long_short_token: Address,
    pub balance: Decimal,
    pub cost_basis: Decimal,
    pub updated_at_block: BlockNumber,
    /// Last event folded into the balance and cost basis.
    #[serde(default)]
    pub last_event: Option<OrderingKey>,
}

impl Position {
    pub fn key(token: &Address, owner: &Address) -> String {
        format!("{}-{}", token, owner)
    }

    pub fn new(token: Address, owner: Address, block: BlockNumber) -> Self {
        Self {
            id: Self::key(&token, &owner),
            owner,
            long_short_token: token,
            balance: Decimal::zero(),
            cost_basis: Decimal::zero(),
            updated_at_block: block,
            last_event: None,
        }
    }
}

impl Entity for Position {
    const KIND: EntityKind = EntityKind::Position;

    fn id(&self) -> &str {
        &self.id
    }
}
