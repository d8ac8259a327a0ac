//! Mock chain reader for testing without network calls.

use super::{ChainError, ChainReader};
use crate::domain::{Address, BlockNumber, U256};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone)]
struct TokenMetadata {
    decimals: u32,
    name: String,
    symbol: String,
}

/// Mock chain that answers from predefined contract state.
///
/// Calls against unknown contracts revert, like calls to an address without code.
#[derive(Debug, Clone, Default)]
pub struct MockChain {
    tokens: HashMap<Address, TokenMetadata>,
    balances: HashMap<(Address, Address), BTreeMap<BlockNumber, U256>>,
    base_tokens: HashMap<Address, Address>,
    treasuries: HashMap<Address, Address>,
    failure: Option<ChainError>,
}

impl MockChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an ERC20.
    pub fn with_token(mut self, address: &Address, decimals: u32, name: &str, symbol: &str) -> Self {
        self.tokens.insert(
            address.clone(),
            TokenMetadata {
                decimals,
                name: name.to_string(),
                symbol: symbol.to_string(),
            },
        );
        self
    }

    /// Set the raw balance of `owner` from `block` onwards.
    pub fn with_balance_at(
        mut self,
        token: &Address,
        owner: &Address,
        block: BlockNumber,
        raw: U256,
    ) -> Self {
        self.balances
            .entry((token.clone(), owner.clone()))
            .or_default()
            .insert(block, raw);
        self
    }

    /// Register a collateral token's base token.
    pub fn with_base_token(mut self, collateral: &Address, base: &Address) -> Self {
        self.base_tokens.insert(collateral.clone(), base.clone());
        self
    }

    pub fn with_treasury(mut self, collateral: &Address, treasury: &Address) -> Self {
        self.treasuries.insert(collateral.clone(), treasury.clone());
        self
    }

    /// Make every call fail with `error`.
    pub fn failing(mut self, error: ChainError) -> Self {
        self.failure = Some(error);
        self
    }

    fn check(&self) -> Result<(), ChainError> {
        match &self.failure {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    fn metadata(&self, token: &Address) -> Result<&TokenMetadata, ChainError> {
        self.check()?;
        self.tokens.get(token).ok_or(ChainError::Reverted)
    }
}

#[async_trait]
impl ChainReader for MockChain {
    async fn decimals(&self, token: &Address, _block: BlockNumber) -> Result<u32, ChainError> {
        Ok(self.metadata(token)?.decimals)
    }

    async fn name(&self, token: &Address, _block: BlockNumber) -> Result<String, ChainError> {
        Ok(self.metadata(token)?.name.clone())
    }

    async fn symbol(&self, token: &Address, _block: BlockNumber) -> Result<String, ChainError> {
        Ok(self.metadata(token)?.symbol.clone())
    }

    async fn balance_of(
        &self,
        token: &Address,
        owner: &Address,
        block: BlockNumber,
    ) -> Result<U256, ChainError> {
        self.metadata(token)?;
        Ok(self
            .balances
            .get(&(token.clone(), owner.clone()))
            .and_then(|history| history.range(..=block).next_back())
            .map(|(_, raw)| *raw)
            .unwrap_or_default())
    }

    async fn base_token(
        &self,
        collateral: &Address,
        _block: BlockNumber,
    ) -> Result<Address, ChainError> {
        self.check()?;
        self.base_tokens
            .get(collateral)
            .cloned()
            .ok_or(ChainError::Reverted)
    }

    async fn treasury(
        &self,
        collateral: &Address,
        _block: BlockNumber,
    ) -> Result<Address, ChainError> {
        self.check()?;
        self.treasuries
            .get(collateral)
            .cloned()
            .ok_or(ChainError::Reverted)
    }
}
