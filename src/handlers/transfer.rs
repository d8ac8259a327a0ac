//! ERC20 `Transfer` of collateral, base or long/short tokens.

use super::{is_protocol_contract, EventHandler, HandleOutcome, HandlerContext};
use crate::domain::{
    Action, Address, ChainEvent, CollateralToken, Decimal, LoggedEvent, LongShortToken,
    OrderingKey, Pool, Token, TokenType,
};
use crate::engine::{get_historical_event, make_transfer_transaction, update_position};
use crate::error::IndexerError;
use crate::store::{EntityStore, StoreError, StoreExt};
use async_trait::async_trait;
use tracing::{debug, warn};

pub struct TransferHandler;

#[async_trait]
impl EventHandler for TransferHandler {
    async fn handle(
        &self,
        ctx: &HandlerContext<'_>,
        event: &LoggedEvent,
    ) -> Result<HandleOutcome, IndexerError> {
        let ChainEvent::Transfer { from, to, value } = &event.event else {
            return Ok(HandleOutcome::Ignored);
        };
        let store = ctx.store;
        let emitter = &event.meta.address;

        let Some(token) = store.load::<Token>(emitter.as_str()).await? else {
            return Ok(HandleOutcome::Ignored);
        };
        let Some(value) = Decimal::from_u256(*value) else {
            warn!(token = %emitter, value = %value, "transfer amount out of range");
            return Ok(HandleOutcome::Ignored);
        };

        let mut price_usd = None;
        let mut collateral_counterparty = None;
        match token.token_type {
            TokenType::Collateral => {}
            TokenType::CollateralBase => {
                // Base tokens move all the time; only deposits into and
                // withdrawals out of collateral contracts are indexed.
                let from_collateral = store.exists::<CollateralToken>(from.as_str()).await?;
                let to_collateral = store.exists::<CollateralToken>(to.as_str()).await?;
                collateral_counterparty = match (from_collateral, to_collateral) {
                    (true, _) => Some(from.clone()),
                    (false, true) => Some(to.clone()),
                    (false, false) => {
                        debug!(token = %emitter, "base transfer outside collateral contracts");
                        return Ok(HandleOutcome::Ignored);
                    }
                };
            }
            TokenType::LongShort => {
                let Some(long_short) = store.load::<LongShortToken>(emitter.as_str()).await?
                else {
                    return Ok(HandleOutcome::Ignored);
                };
                price_usd = Some(long_short.price_usd);
            }
        }

        let legs = [(from, to, Action::Send), (to, from, Action::Receive)];
        let mut written = Vec::with_capacity(legs.len());
        for (owner, counterparty, action) in legs {
            if owner.is_zero() || is_protocol_contract(store, owner).await? {
                continue;
            }
            let Some(mut tx) = make_transfer_transaction(
                &event.meta,
                owner,
                action,
                &token,
                from,
                to,
                value,
                price_usd,
            ) else {
                warn!(token = %emitter, value = %value, "transfer amount out of range");
                continue;
            };
            if store.exists::<Pool>(counterparty.as_str()).await? {
                tx.pool = Some(counterparty.clone());
            }
            if collateral_counterparty.is_some() {
                tx.collateral_token = collateral_counterparty.clone();
            }
            store.save(&tx).await?;
            written.push(tx);
        }

        for tx in &written {
            get_historical_event(store, tx).await?;
        }

        if token.token_type == TokenType::LongShort {
            let key = event.meta.ordering_key();
            update_endpoint_positions(ctx, emitter, from, to, value, key).await?;
        }

        Ok(if written.is_empty() {
            HandleOutcome::Ignored
        } else {
            HandleOutcome::Applied
        })
    }
}

async fn update_endpoint_positions(
    ctx: &HandlerContext<'_>,
    token: &Address,
    from: &Address,
    to: &Address,
    value: Decimal,
    event: OrderingKey,
) -> Result<(), IndexerError> {
    // A self-transfer leaves the balance untouched and buys nothing.
    if from == to {
        debug!(token = %token, owner = %from, "self-transfer, positions untouched");
        return Ok(());
    }
    for (owner, delta) in [(from, -value), (to, value)] {
        if !holds_positions(ctx.store, owner).await? {
            continue;
        }
        update_position(ctx.store, ctx.chain, owner, token, delta, event).await?;
    }
    Ok(())
}

async fn holds_positions(store: &dyn EntityStore, owner: &Address) -> Result<bool, StoreError> {
    Ok(!owner.is_zero() && !store.exists::<Pool>(owner.as_str()).await?)
}
