//! External collaborators: read-only contract calls and the event feed.

use crate::domain::{Address, BlockNumber, U256};
use async_trait::async_trait;
use thiserror::Error;

pub mod abi;
pub mod feed;
pub mod mock;
pub mod rpc;

pub use feed::{EventFeed, FeedError, JsonLinesFeed, VecFeed};
pub use mock::MockChain;
pub use rpc::RpcChainReader;

/// Read-only view of the contracts the indexer needs to introspect.
///
/// Calls are evaluated at `block` so that replays observe the same state.
#[async_trait]
pub trait ChainReader: Send + Sync + std::fmt::Debug {
    /// ERC20 `decimals()`.
    async fn decimals(&self, token: &Address, block: BlockNumber) -> Result<u32, ChainError>;

    /// ERC20 `name()`.
    async fn name(&self, token: &Address, block: BlockNumber) -> Result<String, ChainError>;

    /// ERC20 `symbol()`.
    async fn symbol(&self, token: &Address, block: BlockNumber) -> Result<String, ChainError>;

    /// ERC20 `balanceOf(owner)` as a raw integer amount.
    async fn balance_of(
        &self,
        token: &Address,
        owner: &Address,
        block: BlockNumber,
    ) -> Result<U256, ChainError>;

    /// Collateral `getBaseToken()`.
    async fn base_token(
        &self,
        collateral: &Address,
        block: BlockNumber,
    ) -> Result<Address, ChainError>;

    /// Collateral `getTreasury()`.
    async fn treasury(
        &self,
        collateral: &Address,
        block: BlockNumber,
    ) -> Result<Address, ChainError>;
}

/// Error type for contract calls.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    /// The call reverted or the target has no code. Recoverable.
    #[error("call reverted")]
    Reverted,
    #[error("network error: {0}")]
    Network(String),
    #[error("HTTP error {status}")]
    Http { status: u16 },
    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },
    #[error("decode error: {0}")]
    Decode(String),
}

impl ChainError {
    pub fn is_revert(&self) -> bool {
        matches!(self, ChainError::Reverted)
    }
}

/// Turn a revert into `None`; every other chain failure stays an error.
pub fn revert_as_none<T>(result: Result<T, ChainError>) -> Result<Option<T>, ChainError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(ChainError::Reverted) => Ok(None),
        Err(e) => Err(e),
    }
}
