//! Domain primitives: Address, TxHash, BlockNumber.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Block height.
pub type BlockNumber = u64;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressParseError {
    #[error("missing 0x prefix: {0}")]
    MissingPrefix(String),
    #[error("expected {expected} hex bytes, got {actual}")]
    WrongLength { expected: usize, actual: usize },
    #[error("invalid hex: {0}")]
    InvalidHex(String),
}

fn parse_hex_bytes(s: &str, expected: usize) -> Result<String, AddressParseError> {
    let body = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .ok_or_else(|| AddressParseError::MissingPrefix(s.to_string()))?;
    let bytes = hex::decode(body).map_err(|e| AddressParseError::InvalidHex(e.to_string()))?;
    if bytes.len() != expected {
        return Err(AddressParseError::WrongLength {
            expected,
            actual: bytes.len(),
        });
    }
    Ok(format!("0x{}", hex::encode(bytes)))
}

/// 20-byte account or contract address, stored lowercased with a 0x prefix.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(String);

impl Address {
    /// Parse and normalize an address.
    pub fn parse(s: &str) -> Result<Self, AddressParseError> {
        parse_hex_bytes(s, 20).map(Address)
    }

    /// The zero address, used as the mint source and burn sink.
    pub fn zero() -> Self {
        Address(format!("0x{}", "0".repeat(40)))
    }

    pub fn is_zero(&self) -> bool {
        self.0[2..].bytes().all(|b| b == b'0')
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Raw 20 bytes, for ABI encoding.
    pub fn to_bytes(&self) -> [u8; 20] {
        let mut out = [0u8; 20];
        // The string is validated on construction.
        if let Ok(bytes) = hex::decode(&self.0[2..]) {
            out.copy_from_slice(&bytes);
        }
        out
    }
}

impl FromStr for Address {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Address::parse(s)
    }
}

impl TryFrom<String> for Address {
    type Error = AddressParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Address::parse(&value)
    }
}

impl From<Address> for String {
    fn from(value: Address) -> Self {
        value.0
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 32-byte transaction hash.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TxHash(String);

impl TxHash {
    pub fn parse(s: &str) -> Result<Self, AddressParseError> {
        parse_hex_bytes(s, 32).map(TxHash)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for TxHash {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TxHash::parse(s)
    }
}

impl TryFrom<String> for TxHash {
    type Error = AddressParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        TxHash::parse(&value)
    }
}

impl From<TxHash> for String {
    fn from(value: TxHash) -> Self {
        value.0
    }
}

impl std::fmt::Display for TxHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
