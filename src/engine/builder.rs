//! Builds transaction legs and folds them into historical events.

use super::classifier::{classify, default_event};
use super::math::convert_token_to_decimal;
use crate::domain::{
    Action, Address, Decimal, EventMeta, HistoricalEvent, Token, TokenType, Transaction,
    TransactionKind,
};
use crate::store::{EntityStore, StoreError, StoreExt};
use tracing::debug;

/// Deterministic leg id: `{action}-{owner}-{txHash}-{logIndex}`.
pub fn transaction_id(action: Action, owner: &Address, meta: &EventMeta) -> String {
    format!("{}-{}-{}-{}", action, owner, meta.tx_hash, meta.log_index)
}

/// Unsaved leg with zeroed amounts; callers fill in amounts and counterparties.
pub fn make_transaction(
    meta: &EventMeta,
    owner: &Address,
    action: Action,
    kind: TransactionKind,
) -> Transaction {
    Transaction {
        id: transaction_id(action, owner, meta),
        action,
        kind,
        owner: owner.clone(),
        token_type: None,
        token: None,
        amount: Decimal::zero(),
        amount_usd: Decimal::zero(),
        from: Address::zero(),
        to: Address::zero(),
        base_token: None,
        collateral_token: None,
        long_short_token: None,
        pool: None,
        block_number: meta.block_number,
        timestamp: meta.block_timestamp,
        hash: meta.tx_hash.clone(),
        log_index: meta.log_index,
        historical_event: HistoricalEvent::key(&meta.tx_hash, owner),
    }
}

/// Leg for an ERC20 `Transfer`.
///
/// `price_usd` values the amount; without one the amount itself is used,
/// which holds for the dollar-pegged collateral and base tokens.
/// Returns `None` if the raw value cannot be scaled.
#[allow(clippy::too_many_arguments)]
pub fn make_transfer_transaction(
    meta: &EventMeta,
    owner: &Address,
    action: Action,
    token: &Token,
    from: &Address,
    to: &Address,
    raw_value: Decimal,
    price_usd: Option<Decimal>,
) -> Option<Transaction> {
    let amount = convert_token_to_decimal(raw_value, token.decimals)?;
    let amount_usd = match price_usd {
        Some(price) => amount.checked_mul(price)?,
        None => amount,
    };

    let mut tx = make_transaction(meta, owner, action, TransactionKind::Transfer);
    tx.token_type = Some(token.token_type);
    tx.token = Some(token.address.clone());
    tx.amount = amount;
    tx.amount_usd = amount_usd;
    tx.from = from.clone();
    tx.to = to.clone();
    match token.token_type {
        TokenType::CollateralBase => tx.base_token = Some(token.address.clone()),
        TokenType::Collateral => tx.collateral_token = Some(token.address.clone()),
        TokenType::LongShort => tx.long_short_token = Some(token.address.clone()),
    }
    Some(tx)
}

/// Append `transaction` to its historical event and reclassify the aggregate.
///
/// The aggregate starts from its default classification (amounts of the
/// leg with the smallest id, `SWAP` if any leg is a swap, else `TRANSFER`);
/// open/close, then deposit, then withdraw may override it. Appending is
/// idempotent and the result does not depend on the order legs arrive in.
pub async fn get_historical_event(
    store: &dyn EntityStore,
    transaction: &Transaction,
) -> Result<HistoricalEvent, StoreError> {
    let mut historical = match store
        .load::<HistoricalEvent>(&transaction.historical_event)
        .await?
    {
        Some(existing) => existing,
        None => HistoricalEvent {
            id: transaction.historical_event.clone(),
            owner: transaction.owner.clone(),
            hash: transaction.hash.clone(),
            block_number: transaction.block_number,
            timestamp: transaction.timestamp,
            event: default_event(std::slice::from_ref(transaction)),
            amount: transaction.amount,
            amount_usd: transaction.amount_usd,
            tx_count: 0,
            transactions: Vec::new(),
            long_short_token: None,
        },
    };

    if !historical.transactions.contains(&transaction.id) {
        historical.transactions.push(transaction.id.clone());
    }
    historical.tx_count = historical.transactions.len() as u32;

    let mut legs = Vec::with_capacity(historical.transactions.len());
    for id in &historical.transactions {
        if id == &transaction.id {
            legs.push(transaction.clone());
        } else if let Some(leg) = store.load::<Transaction>(id).await? {
            legs.push(leg);
        }
    }

    let summary = legs
        .iter()
        .min_by(|a, b| a.id.cmp(&b.id))
        .unwrap_or(transaction);
    historical.event = default_event(&legs);
    historical.amount = summary.amount;
    historical.amount_usd = summary.amount_usd;
    historical.long_short_token = summary.long_short_token.clone();

    if let Some(classification) = classify(&historical.owner, &legs) {
        historical.event = classification.event;
        historical.amount = classification.amount;
        historical.amount_usd = classification.amount_usd;
        historical.long_short_token = classification.long_short_token;
    }

    debug!(
        id = %historical.id,
        event = %historical.event,
        tx_count = historical.tx_count,
        "historical event updated"
    );
    store.save(&historical).await?;

    Ok(historical)
}
