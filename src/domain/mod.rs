//! Domain types for the long/short protocol indexer.
//!
//! This module provides:
//! - Lossless numeric handling via Decimal wrapper
//! - Domain primitives: Address, TxHash, BlockNumber
//! - Full-width raw integers for on-chain amounts and prices
//! - Decoded chain events with canonical ordering
//! - Entity records persisted through the entity store

pub mod decimal;
pub mod entity;
pub mod event;
pub mod market;
pub mod position;
pub mod primitives;
pub mod raw;
pub mod token;
pub mod transaction;

pub use decimal::Decimal;
pub use entity::{Entity, EntityKind};
pub use event::{ChainEvent, EventMeta, EventTag, LoggedEvent, OrderingKey};
pub use market::{Market, Pool, TrackedContract, TrackedKind};
pub use position::Position;
pub use primitives::{Address, AddressParseError, BlockNumber, TxHash};
pub use raw::{I256, U256};
pub use token::{CollateralToken, LongShortToken, Token, TokenType};
pub use transaction::{Action, HistoricalEvent, HistoricalEventType, Transaction, TransactionKind};
