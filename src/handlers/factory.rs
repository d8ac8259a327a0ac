//! Factory-side events that grow the set of tracked contracts.

use super::{EventHandler, HandleOutcome, HandlerContext};
use crate::datasource::revert_as_none;
use crate::domain::{
    Address, ChainEvent, CollateralToken, Decimal, LoggedEvent, LongShortToken, Market, Pool,
    TokenType, TrackedContract, TrackedKind, U256,
};
use crate::engine::fetch_or_create_token;
use crate::error::IndexerError;
use crate::store::StoreExt;
use async_trait::async_trait;
use tracing::{debug, info, warn};

/// `MarketAdded`: start listening to the new market contract.
pub struct MarketAddedHandler;

#[async_trait]
impl EventHandler for MarketAddedHandler {
    async fn handle(
        &self,
        ctx: &HandlerContext<'_>,
        event: &LoggedEvent,
    ) -> Result<HandleOutcome, IndexerError> {
        let ChainEvent::MarketAdded { market, .. } = &event.event else {
            return Ok(HandleOutcome::Ignored);
        };
        if ctx.store.exists::<TrackedContract>(market.as_str()).await? {
            return Ok(HandleOutcome::Ignored);
        }

        ctx.store
            .save(&TrackedContract {
                id: market.as_str().to_string(),
                kind: TrackedKind::Market,
                registered_at_block: event.meta.block_number,
            })
            .await?;
        info!(market = %market, block = event.meta.block_number, "market tracked");
        Ok(HandleOutcome::Applied)
    }
}

/// `MarketCreated`: record the market and register its two sides.
pub struct MarketCreatedHandler;

#[async_trait]
impl EventHandler for MarketCreatedHandler {
    async fn handle(
        &self,
        ctx: &HandlerContext<'_>,
        event: &LoggedEvent,
    ) -> Result<HandleOutcome, IndexerError> {
        let ChainEvent::MarketCreated {
            long_token,
            short_token,
            floor_long_price,
            ceiling_long_price,
            floor_valuation,
            ceiling_valuation,
            minting_fee,
            redemption_fee,
            expiry_time,
        } = &event.event
        else {
            return Ok(HandleOutcome::Ignored);
        };
        let market = &event.meta.address;

        if !ctx.store.exists::<TrackedContract>(market.as_str()).await? {
            debug!(market = %market, "MarketCreated from untracked contract");
            return Ok(HandleOutcome::Ignored);
        }
        if ctx.store.exists::<Market>(market.as_str()).await? {
            return Ok(HandleOutcome::Ignored);
        }

        ctx.store
            .save(&Market {
                id: market.as_str().to_string(),
                long_token: long_token.clone(),
                short_token: short_token.clone(),
                floor_long_price: *floor_long_price,
                ceiling_long_price: *ceiling_long_price,
                floor_valuation: *floor_valuation,
                ceiling_valuation: *ceiling_valuation,
                minting_fee: *minting_fee,
                redemption_fee: *redemption_fee,
                expiry_time: *expiry_time,
                created_at_block: event.meta.block_number,
                created_at_timestamp: event.meta.block_timestamp,
            })
            .await?;

        for side in [long_token, short_token] {
            register_long_short(ctx, side, market, event.meta.block_number).await?;
        }

        info!(
            market = %market,
            long = %long_token,
            short = %short_token,
            "market created"
        );
        Ok(HandleOutcome::Applied)
    }
}

async fn register_long_short(
    ctx: &HandlerContext<'_>,
    token_address: &Address,
    market: &Address,
    block: u64,
) -> Result<(), IndexerError> {
    let Some(token) =
        fetch_or_create_token(ctx.store, ctx.chain, token_address, TokenType::LongShort, block)
            .await?
    else {
        warn!(token = %token_address, market = %market, "market side is not an ERC20");
        return Ok(());
    };
    if ctx.store.exists::<LongShortToken>(&token.id).await? {
        return Ok(());
    }

    ctx.store
        .save(&LongShortToken {
            id: token.id.clone(),
            token: token.address.clone(),
            market: market.clone(),
            pool: None,
            price_usd: Decimal::zero(),
        })
        .await?;
    Ok(())
}

/// `CollateralValidityChanged`: register newly allowed collateral together
/// with its base token.
pub struct CollateralValidityChangedHandler;

#[async_trait]
impl EventHandler for CollateralValidityChangedHandler {
    async fn handle(
        &self,
        ctx: &HandlerContext<'_>,
        event: &LoggedEvent,
    ) -> Result<HandleOutcome, IndexerError> {
        let ChainEvent::CollateralValidityChanged {
            collateral,
            allowed,
        } = &event.event
        else {
            return Ok(HandleOutcome::Ignored);
        };
        let block = event.meta.block_number;

        // Disallowing only stops new markets; existing records stay valid.
        if !allowed {
            debug!(collateral = %collateral, "collateral disallowed");
            return Ok(HandleOutcome::Ignored);
        }
        if ctx.store.exists::<CollateralToken>(collateral.as_str()).await? {
            return Ok(HandleOutcome::Ignored);
        }

        let Some(token) =
            fetch_or_create_token(ctx.store, ctx.chain, collateral, TokenType::Collateral, block)
                .await?
        else {
            warn!(collateral = %collateral, "collateral is not an ERC20");
            return Ok(HandleOutcome::Ignored);
        };

        let Some(base_address) = revert_as_none(ctx.chain.base_token(collateral, block).await)?
        else {
            warn!(collateral = %collateral, "getBaseToken reverted");
            return Ok(HandleOutcome::Ignored);
        };
        let Some(base) = fetch_or_create_token(
            ctx.store,
            ctx.chain,
            &base_address,
            TokenType::CollateralBase,
            block,
        )
        .await?
        else {
            warn!(collateral = %collateral, base = %base_address, "base token is not an ERC20");
            return Ok(HandleOutcome::Ignored);
        };

        let treasury = revert_as_none(ctx.chain.treasury(collateral, block).await)?;

        ctx.store
            .save(&CollateralToken {
                id: token.id.clone(),
                token: token.address.clone(),
                base_token: base.address.clone(),
                treasury,
            })
            .await?;
        info!(
            collateral = %collateral,
            symbol = %token.symbol,
            base = %base.symbol,
            "collateral registered"
        );
        Ok(HandleOutcome::Applied)
    }
}

/// `PoolCreated`: track pools that pair a long/short token with collateral.
pub struct PoolCreatedHandler;

#[async_trait]
impl EventHandler for PoolCreatedHandler {
    async fn handle(
        &self,
        ctx: &HandlerContext<'_>,
        event: &LoggedEvent,
    ) -> Result<HandleOutcome, IndexerError> {
        let ChainEvent::PoolCreated {
            token0,
            token1,
            pool,
            ..
        } = &event.event
        else {
            return Ok(HandleOutcome::Ignored);
        };

        if ctx.store.exists::<Pool>(pool.as_str()).await? {
            return Ok(HandleOutcome::Ignored);
        }

        let store = ctx.store;
        let long_short_is_token0 = if store.exists::<LongShortToken>(token0.as_str()).await?
            && store.exists::<CollateralToken>(token1.as_str()).await?
        {
            true
        } else if store.exists::<LongShortToken>(token1.as_str()).await?
            && store.exists::<CollateralToken>(token0.as_str()).await?
        {
            false
        } else {
            debug!(pool = %pool, "pool does not pair long/short with collateral");
            return Ok(HandleOutcome::Ignored);
        };

        let (long_short, collateral) = if long_short_is_token0 {
            (token0, token1)
        } else {
            (token1, token0)
        };

        store
            .save(&Pool {
                id: pool.as_str().to_string(),
                token0: token0.clone(),
                token1: token1.clone(),
                long_short_token: long_short.clone(),
                collateral_token: collateral.clone(),
                long_short_is_token0,
                sqrt_price_x96: U256::ZERO,
                token0_price: Decimal::zero(),
                token1_price: Decimal::zero(),
            })
            .await?;

        if let Some(mut entity) = store.load::<LongShortToken>(long_short.as_str()).await? {
            if entity.pool.is_none() {
                entity.pool = Some(pool.clone());
                store.save(&entity).await?;
            }
        }

        info!(pool = %pool, long_short = %long_short, collateral = %collateral, "pool tracked");
        Ok(HandleOutcome::Applied)
    }
}
