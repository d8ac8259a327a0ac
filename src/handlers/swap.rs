//! AMM `Swap` on a tracked pool.

use super::{is_protocol_contract, EventHandler, HandleOutcome, HandlerContext};
use crate::domain::{Action, ChainEvent, Decimal, LoggedEvent, Pool, Token, TransactionKind};
use crate::engine::{
    convert_token_to_decimal, get_historical_event, make_transaction, update_long_short_prices,
};
use crate::error::IndexerError;
use crate::store::StoreExt;
use async_trait::async_trait;
use tracing::{debug, warn};

pub struct SwapHandler;

#[async_trait]
impl EventHandler for SwapHandler {
    async fn handle(
        &self,
        ctx: &HandlerContext<'_>,
        event: &LoggedEvent,
    ) -> Result<HandleOutcome, IndexerError> {
        let ChainEvent::Swap {
            sender,
            recipient,
            amount0,
            amount1,
            sqrt_price_x96,
            ..
        } = &event.event
        else {
            return Ok(HandleOutcome::Ignored);
        };
        let store = ctx.store;
        let pool_address = &event.meta.address;

        let Some(mut pool) = store.load::<Pool>(pool_address.as_str()).await? else {
            return Ok(HandleOutcome::Ignored);
        };
        update_long_short_prices(store, &mut pool, *sqrt_price_x96).await?;

        if recipient.is_zero() || is_protocol_contract(store, recipient).await? {
            debug!(pool = %pool.id, recipient = %recipient, "swap routed to protocol contract");
            return Ok(HandleOutcome::Applied);
        }

        let long_short = store.load::<Token>(pool.long_short_token.as_str()).await?;
        let collateral = store.load::<Token>(pool.collateral_token.as_str()).await?;
        let (Some(long_short), Some(collateral)) = (long_short, collateral) else {
            return Ok(HandleOutcome::Applied);
        };

        // Amounts are the pool's deltas: negative means the pool paid out.
        let (long_short_delta, collateral_delta) = if pool.long_short_is_token0 {
            (*amount0, *amount1)
        } else {
            (*amount1, *amount0)
        };
        let action = if long_short_delta.is_negative() {
            Action::Open
        } else {
            Action::Close
        };

        let amount = Decimal::from_u256(long_short_delta.unsigned_abs())
            .and_then(|raw| convert_token_to_decimal(raw, long_short.decimals));
        let amount_usd = Decimal::from_u256(collateral_delta.unsigned_abs())
            .and_then(|raw| convert_token_to_decimal(raw, collateral.decimals));
        let (Some(amount), Some(amount_usd)) = (amount, amount_usd) else {
            warn!(pool = %pool.id, "swap amounts out of range");
            return Ok(HandleOutcome::Applied);
        };

        let mut tx = make_transaction(&event.meta, recipient, action, TransactionKind::Swap);
        tx.amount = amount;
        tx.amount_usd = amount_usd;
        tx.from = sender.clone();
        tx.to = recipient.clone();
        tx.pool = Some(pool_address.clone());
        tx.long_short_token = Some(pool.long_short_token.clone());
        tx.collateral_token = Some(pool.collateral_token.clone());
        store.save(&tx).await?;
        get_historical_event(store, &tx).await?;

        debug!(
            pool = %pool.id,
            owner = %recipient,
            action = %action,
            amount = %amount,
            "swap recorded"
        );
        Ok(HandleOutcome::Applied)
    }
}
