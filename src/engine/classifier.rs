//! Classification of a historical event from the set of its legs.
//!
//! Every predicate looks only at the set of transactions, never at their
//! arrival order, so replaying the same legs in any order yields the same
//! classification. When several legs qualify for the same role, the one with
//! the smallest id is used.

use crate::domain::{
    Action, Address, Decimal, HistoricalEventType, TokenType, Transaction,
};

/// Summary fields written onto a classified historical event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub event: HistoricalEventType,
    pub amount: Decimal,
    pub amount_usd: Decimal,
    pub long_short_token: Option<Address>,
}

impl Classification {
    fn from_leg(event: HistoricalEventType, leg: &Transaction) -> Self {
        Self {
            event,
            amount: leg.amount,
            amount_usd: leg.amount_usd,
            long_short_token: leg.long_short_token.clone(),
        }
    }
}

fn pick<'a>(
    transactions: &'a [Transaction],
    predicate: impl Fn(&Transaction) -> bool,
) -> Option<&'a Transaction> {
    transactions
        .iter()
        .filter(|tx| predicate(tx))
        .min_by(|a, b| a.id.cmp(&b.id))
}

fn from_pool(tx: &Transaction) -> bool {
    tx.pool.as_ref() == Some(&tx.from)
}

fn to_pool(tx: &Transaction) -> bool {
    tx.pool.as_ref() == Some(&tx.to)
}

/// Base token into a collateral contract plus a collateral mint to the owner.
pub fn is_deposit(owner: &Address, transactions: &[Transaction]) -> Option<Classification> {
    if transactions.len() < 2 {
        return None;
    }

    pick(transactions, |tx| {
        tx.action == Action::Receive
            && tx.is_transfer_of(TokenType::Collateral)
            && tx.from.is_zero()
            && &tx.to == owner
    })?;

    let base_sent = pick(transactions, |tx| {
        tx.action == Action::Send
            && tx.is_transfer_of(TokenType::CollateralBase)
            && &tx.from == owner
            && tx.collateral_token.as_ref() == Some(&tx.to)
    })?;

    Some(Classification::from_leg(
        HistoricalEventType::Deposit,
        base_sent,
    ))
}

/// Base token out of a collateral contract plus a collateral burn by the owner.
pub fn is_withdraw(owner: &Address, transactions: &[Transaction]) -> Option<Classification> {
    if transactions.len() < 2 {
        return None;
    }

    pick(transactions, |tx| {
        tx.action == Action::Receive
            && tx.is_transfer_of(TokenType::CollateralBase)
            && &tx.to == owner
            && tx.collateral_token.as_ref() == Some(&tx.from)
    })?;

    let burned = pick(transactions, |tx| {
        tx.action == Action::Send
            && tx.is_transfer_of(TokenType::Collateral)
            && &tx.from == owner
            && tx.to.is_zero()
    })?;

    Some(Classification::from_leg(HistoricalEventType::Withdraw, burned))
}

/// Two transfers against a pool plus the swap that paid the owner.
pub fn is_open_close(owner: &Address, transactions: &[Transaction]) -> Option<Classification> {
    if transactions.len() != 3 {
        return None;
    }

    let swap = pick(transactions, |tx| tx.is_swap() && &tx.to == owner)?;

    let long_short_in = pick(transactions, |tx| {
        tx.action == Action::Receive
            && tx.is_transfer_of(TokenType::LongShort)
            && &tx.to == owner
            && from_pool(tx)
    });
    let collateral_out = pick(transactions, |tx| {
        tx.action == Action::Send
            && tx.is_transfer_of(TokenType::Collateral)
            && &tx.from == owner
            && to_pool(tx)
    });
    if let (Some(long_short_in), Some(_)) = (long_short_in, collateral_out) {
        let mut classification = Classification::from_leg(HistoricalEventType::Open, swap);
        classification.long_short_token = long_short_in.long_short_token.clone();
        return Some(classification);
    }

    let long_short_out = pick(transactions, |tx| {
        tx.action == Action::Send
            && tx.is_transfer_of(TokenType::LongShort)
            && &tx.from == owner
            && to_pool(tx)
    });
    let collateral_in = pick(transactions, |tx| {
        tx.action == Action::Receive
            && tx.is_transfer_of(TokenType::Collateral)
            && &tx.to == owner
            && from_pool(tx)
    });
    if let (Some(long_short_out), Some(_)) = (long_short_out, collateral_in) {
        return Some(Classification::from_leg(
            HistoricalEventType::Close,
            long_short_out,
        ));
    }

    None
}

/// Try the classifiers in priority order: open/close, deposit, withdraw.
pub fn classify(owner: &Address, transactions: &[Transaction]) -> Option<Classification> {
    is_open_close(owner, transactions)
        .or_else(|| is_deposit(owner, transactions))
        .or_else(|| is_withdraw(owner, transactions))
}

/// Classification of an aggregate no pattern matched.
pub fn default_event(transactions: &[Transaction]) -> HistoricalEventType {
    if transactions.iter().any(Transaction::is_swap) {
        HistoricalEventType::Swap
    } else {
        HistoricalEventType::Transfer
    }
}
