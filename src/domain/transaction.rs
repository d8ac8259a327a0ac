//! Transaction legs and the per-(hash, owner) historical event aggregate.

use crate::domain::{Address, BlockNumber, Decimal, Entity, EntityKind, TokenType, TxHash};
use serde::{Deserialize, Serialize};

/// Direction of a leg from its owner's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    Send,
    Receive,
    Open,
    Close,
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Send => write!(f, "SEND"),
            Action::Receive => write!(f, "RECEIVE"),
            Action::Open => write!(f, "OPEN"),
            Action::Close => write!(f, "CLOSE"),
        }
    }
}

/// Raw event a leg was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionKind {
    Transfer,
    Swap,
}

/// A single leg. Immutable once saved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub action: Action,
    pub kind: TransactionKind,
    pub owner: Address,
    /// Type of the transferred token; `None` for swap legs.
    pub token_type: Option<TokenType>,
    pub token: Option<Address>,
    pub amount: Decimal,
    #[serde(rename = "amountUSD")]
    pub amount_usd: Decimal,
    pub from: Address,
    pub to: Address,
    pub base_token: Option<Address>,
    pub collateral_token: Option<Address>,
    pub long_short_token: Option<Address>,
    pub pool: Option<Address>,
    pub block_number: BlockNumber,
    pub timestamp: i64,
    pub hash: TxHash,
    pub log_index: u32,
    pub historical_event: String,
}

impl Transaction {
    pub fn is_transfer_of(&self, token_type: TokenType) -> bool {
        self.kind == TransactionKind::Transfer && self.token_type == Some(token_type)
    }

    pub fn is_swap(&self) -> bool {
        self.kind == TransactionKind::Swap
    }
}

impl Entity for Transaction {
    const KIND: EntityKind = EntityKind::Transaction;

    fn id(&self) -> &str {
        &self.id
    }
}

/// Classification of a historical event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HistoricalEventType {
    Transfer,
    Swap,
    Deposit,
    Withdraw,
    Open,
    Close,
}

impl std::fmt::Display for HistoricalEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            HistoricalEventType::Transfer => "TRANSFER",
            HistoricalEventType::Swap => "SWAP",
            HistoricalEventType::Deposit => "DEPOSIT",
            HistoricalEventType::Withdraw => "WITHDRAW",
            HistoricalEventType::Open => "OPEN",
            HistoricalEventType::Close => "CLOSE",
        };
        write!(f, "{}", name)
    }
}

/// All legs of one on-chain transaction seen from one owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalEvent {
    pub id: String,
    pub owner: Address,
    pub hash: TxHash,
    pub block_number: BlockNumber,
    pub timestamp: i64,
    pub event: HistoricalEventType,
    pub amount: Decimal,
    #[serde(rename = "amountUSD")]
    pub amount_usd: Decimal,
    pub tx_count: u32,
    pub transactions: Vec<String>,
    pub long_short_token: Option<Address>,
}

impl HistoricalEvent {
    pub fn key(hash: &TxHash, owner: &Address) -> String {
        format!("{}-{}", hash, owner)
    }
}

impl Entity for HistoricalEvent {
    const KIND: EntityKind = EntityKind::HistoricalEvent;

    fn id(&self) -> &str {
        &self.id
    }
}
