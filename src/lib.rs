pub mod api;
pub mod config;
pub mod datasource;
pub mod db;
pub mod domain;
pub mod engine;
pub mod error;
pub mod handlers;
pub mod orchestration;
pub mod store;

pub use config::Config;
pub use datasource::{
    ChainError, ChainReader, EventFeed, JsonLinesFeed, MockChain, RpcChainReader, VecFeed,
};
pub use db::{init_db, SqliteStore};
pub use domain::{
    Address, ChainEvent, Decimal, EventMeta, HistoricalEvent, HistoricalEventType, LoggedEvent,
    Position, Token, TokenType, Transaction, TxHash, I256, U256,
};
pub use error::{AppError, IndexerError};
pub use handlers::{DispatchTable, EventHandler, HandleOutcome, HandlerContext};
pub use orchestration::{IndexStats, Indexer};
pub use store::{EntityStore, MemoryStore, StoreError, StoreExt};
