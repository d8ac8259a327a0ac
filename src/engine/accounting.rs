//! Pool price mirroring and per-owner cost-basis accounting.

use super::math::{convert_token_to_decimal, sqrt_price_x96_to_token_prices};
use crate::datasource::{ChainError, ChainReader};
use crate::domain::{Address, Decimal, LongShortToken, OrderingKey, Pool, Position, Token, U256};
use crate::error::IndexerError;
use crate::store::{EntityStore, StoreError, StoreExt};
use tracing::{debug, warn};

/// Mirror a swap's price into the pool and the traded long/short token.
///
/// The long/short token's `price_usd` is collateral per long/short token:
/// `token1_price` when it is token0, `token0_price` otherwise. Nothing is
/// written if the pool's tokens are not indexed yet.
pub async fn update_long_short_prices(
    store: &dyn EntityStore,
    pool: &mut Pool,
    sqrt_price_x96: U256,
) -> Result<(), StoreError> {
    let token0 = store.load::<Token>(pool.token0.as_str()).await?;
    let token1 = store.load::<Token>(pool.token1.as_str()).await?;
    let long_short = store
        .load::<LongShortToken>(pool.long_short_token.as_str())
        .await?;
    let (Some(token0), Some(token1), Some(mut long_short)) = (token0, token1, long_short) else {
        debug!(pool = %pool.id, "pool tokens not indexed, skipping price update");
        return Ok(());
    };

    let Some([price0, price1]) =
        sqrt_price_x96_to_token_prices(sqrt_price_x96, token0.decimals, token1.decimals)
    else {
        warn!(pool = %pool.id, sqrt_price_x96 = %sqrt_price_x96, "sqrt price out of range");
        return Ok(());
    };

    pool.sqrt_price_x96 = sqrt_price_x96;
    pool.token0_price = price0;
    pool.token1_price = price1;
    store.save(&*pool).await?;

    long_short.price_usd = if pool.long_short_is_token0 {
        price1
    } else {
        price0
    };
    store.save(&long_short).await?;

    debug!(
        pool = %pool.id,
        token = %long_short.id,
        price_usd = %long_short.price_usd,
        "long/short price updated"
    );
    Ok(())
}

/// Weighted-average cost basis after `delta` moved into a position.
///
/// Buys blend the current price in:
/// `(prev * cost + delta * price) / (prev + delta)`. Sells keep the basis,
/// and an emptied position resets to zero.
pub fn next_cost_basis(
    prev_balance: Decimal,
    cost_basis: Decimal,
    delta: Decimal,
    price: Decimal,
) -> Option<Decimal> {
    let balance = prev_balance.checked_add(delta)?;
    if balance.is_zero() {
        return Some(Decimal::zero());
    }
    if !delta.is_positive() {
        return Some(cost_basis);
    }
    prev_balance
        .checked_mul(cost_basis)?
        .checked_add(delta.checked_mul(price)?)?
        .checked_div(balance)
}

/// Recompute an owner's position after a transfer of `raw_delta` (signed).
///
/// The post-transfer balance is read from the chain at the event's block; the
/// previous balance is derived from it. No-op for tokens that are not
/// long/short tokens, and for events the position has already absorbed, so a
/// replayed event cannot blend its price in twice.
pub async fn update_position(
    store: &dyn EntityStore,
    chain: &dyn ChainReader,
    owner: &Address,
    token_address: &Address,
    raw_delta: Decimal,
    event: OrderingKey,
) -> Result<Option<Position>, IndexerError> {
    let Some(long_short) = store
        .load::<LongShortToken>(token_address.as_str())
        .await?
    else {
        debug!(token = %token_address, "not a long/short token, position untouched");
        return Ok(None);
    };
    let Some(token) = store.load::<Token>(token_address.as_str()).await? else {
        return Ok(None);
    };

    let key = Position::key(token_address, owner);
    let block = event.block_number;
    let mut position = match store.load::<Position>(&key).await? {
        Some(existing) => existing,
        None => Position::new(token_address.clone(), owner.clone(), block),
    };
    if position.last_event.is_some_and(|last| event <= last) {
        debug!(position = %key, event = %event, "event already applied to position");
        return Ok(Some(position));
    }

    let raw_balance = match chain.balance_of(token_address, owner, block).await {
        Ok(raw) => raw,
        Err(ChainError::Reverted) => {
            warn!(token = %token_address, owner = %owner, "balanceOf reverted");
            return Ok(None);
        }
        Err(e) => return Err(e.into()),
    };

    let balance = Decimal::from_u256(raw_balance)
        .and_then(|raw| convert_token_to_decimal(raw, token.decimals));
    let delta = convert_token_to_decimal(raw_delta, token.decimals);
    let (Some(balance), Some(delta)) = (balance, delta) else {
        warn!(token = %token_address, owner = %owner, "position amounts out of range");
        return Ok(None);
    };
    let prev_balance = balance - delta;

    match next_cost_basis(prev_balance, position.cost_basis, delta, long_short.price_usd) {
        Some(cost_basis) => position.cost_basis = cost_basis,
        None => warn!(position = %key, "cost basis overflow, keeping previous value"),
    }
    position.balance = balance;
    position.updated_at_block = block;
    position.last_event = Some(event);
    store.save(&position).await?;

    debug!(
        position = %key,
        balance = %position.balance,
        cost_basis = %position.cost_basis,
        "position updated"
    );
    Ok(Some(position))
}
