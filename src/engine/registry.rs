//! Token registry: resolves ERC20 metadata once and caches it as a `Token`.

use super::math::MAX_DECIMALS;
use crate::datasource::{revert_as_none, ChainReader};
use crate::domain::{Address, BlockNumber, Token, TokenType};
use crate::error::IndexerError;
use crate::store::{EntityStore, StoreExt};
use tracing::{debug, info, warn};

/// Load the cached token, or introspect the contract and create it.
///
/// Returns `Ok(None)` when the address does not behave like an ERC20 (any of
/// `decimals`, `name`, `symbol` reverts) or uses more decimals than the
/// indexer can represent. The type of an existing token is never changed.
pub async fn fetch_or_create_token(
    store: &dyn EntityStore,
    chain: &dyn ChainReader,
    address: &Address,
    token_type: TokenType,
    block: BlockNumber,
) -> Result<Option<Token>, IndexerError> {
    if let Some(existing) = store.load::<Token>(address.as_str()).await? {
        if existing.token_type != token_type {
            debug!(
                token = %address,
                existing = %existing.token_type,
                requested = %token_type,
                "token already classified, keeping first type"
            );
        }
        return Ok(Some(existing));
    }

    let decimals = revert_as_none(chain.decimals(address, block).await)?;
    let name = revert_as_none(chain.name(address, block).await)?;
    let symbol = revert_as_none(chain.symbol(address, block).await)?;

    let (Some(decimals), Some(name), Some(symbol)) = (decimals, name, symbol) else {
        debug!(token = %address, "ERC20 introspection reverted, not a token");
        return Ok(None);
    };

    if decimals > MAX_DECIMALS {
        warn!(token = %address, decimals, "unsupported token decimals");
        return Ok(None);
    }

    let token = Token {
        id: address.as_str().to_string(),
        address: address.clone(),
        decimals,
        name,
        symbol,
        token_type,
    };
    store.save(&token).await?;
    info!(token = %address, symbol = %token.symbol, token_type = %token_type, "token registered");

    Ok(Some(token))
}
