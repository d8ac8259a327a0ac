//! Entity identity shared by everything persisted in the entity store.

use serde::de::DeserializeOwned;
use serde::Serialize;

/// Entity table names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Token,
    CollateralToken,
    LongShortToken,
    Market,
    TrackedContract,
    Pool,
    Position,
    Transaction,
    HistoricalEvent,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Token => "Token",
            EntityKind::CollateralToken => "CollateralToken",
            EntityKind::LongShortToken => "LongShortToken",
            EntityKind::Market => "Market",
            EntityKind::TrackedContract => "TrackedContract",
            EntityKind::Pool => "Pool",
            EntityKind::Position => "Position",
            EntityKind::Transaction => "Transaction",
            EntityKind::HistoricalEvent => "HistoricalEvent",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A record keyed by a stable string id.
pub trait Entity: Serialize + DeserializeOwned + Send + Sync {
    const KIND: EntityKind;

    fn id(&self) -> &str;
}
