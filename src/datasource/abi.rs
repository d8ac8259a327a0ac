//! Minimal ABI encoding for the handful of view calls the indexer makes.

use super::ChainError;
use crate::domain::{Address, U256};

pub const DECIMALS: [u8; 4] = [0x31, 0x3c, 0xe5, 0x67];
pub const NAME: [u8; 4] = [0x06, 0xfd, 0xde, 0x03];
pub const SYMBOL: [u8; 4] = [0x95, 0xd8, 0x9b, 0x41];
pub const BALANCE_OF: [u8; 4] = [0x70, 0xa0, 0x82, 0x31];
pub const GET_BASE_TOKEN: [u8; 4] = [0x98, 0xac, 0xd7, 0xa6];
pub const GET_TREASURY: [u8; 4] = [0x3b, 0x19, 0xe8, 0x4a];

const WORD: usize = 32;

/// Calldata for a call without arguments.
pub fn encode_call(selector: [u8; 4]) -> String {
    format!("0x{}", hex::encode(selector))
}

/// Calldata for a call taking a single address.
pub fn encode_call_with_address(selector: [u8; 4], arg: &Address) -> String {
    let mut data = Vec::with_capacity(4 + WORD);
    data.extend_from_slice(&selector);
    data.extend_from_slice(&[0u8; 12]);
    data.extend_from_slice(&arg.to_bytes());
    format!("0x{}", hex::encode(data))
}

/// Decode `0x`-prefixed return data. Empty data means the target has no code.
pub fn decode_hex(result: &str) -> Result<Vec<u8>, ChainError> {
    let body = result.strip_prefix("0x").unwrap_or(result);
    let bytes = hex::decode(body).map_err(|e| ChainError::Decode(e.to_string()))?;
    if bytes.is_empty() {
        return Err(ChainError::Reverted);
    }
    Ok(bytes)
}

fn word(data: &[u8], index: usize) -> Result<&[u8], ChainError> {
    data.get(index * WORD..(index + 1) * WORD)
        .ok_or_else(|| ChainError::Decode(format!("missing word {}", index)))
}

fn word_as_u128(word: &[u8]) -> Result<u128, ChainError> {
    if word[..16].iter().any(|b| *b != 0) {
        return Err(ChainError::Decode("uint exceeds 128 bits".to_string()));
    }
    let mut buf = [0u8; 16];
    buf.copy_from_slice(&word[16..]);
    Ok(u128::from_be_bytes(buf))
}

pub fn decode_u32(data: &[u8]) -> Result<u32, ChainError> {
    let value = word_as_u128(word(data, 0)?)?;
    u32::try_from(value).map_err(|_| ChainError::Decode(format!("{} exceeds u32", value)))
}

/// Decode a full-width uint256.
pub fn decode_uint256(data: &[u8]) -> Result<U256, ChainError> {
    Ok(U256::from_be_slice(word(data, 0)?))
}

pub fn decode_address(data: &[u8]) -> Result<Address, ChainError> {
    let w = word(data, 0)?;
    if w[..12].iter().any(|b| *b != 0) {
        return Err(ChainError::Decode("dirty address padding".to_string()));
    }
    Address::parse(&format!("0x{}", hex::encode(&w[12..])))
        .map_err(|e| ChainError::Decode(e.to_string()))
}

/// Decode a dynamic `string`, falling back to `bytes32` for legacy tokens.
pub fn decode_string(data: &[u8]) -> Result<String, ChainError> {
    if data.len() == WORD {
        let end = data.iter().position(|b| *b == 0).unwrap_or(WORD);
        return Ok(String::from_utf8_lossy(&data[..end]).into_owned());
    }

    let offset = word_as_u128(word(data, 0)?)? as usize;
    if offset % WORD != 0 {
        return Err(ChainError::Decode(format!("unaligned offset {}", offset)));
    }
    let len = word_as_u128(word(data, offset / WORD)?)? as usize;
    let start = offset + WORD;
    let bytes = data
        .get(start..start + len)
        .ok_or_else(|| ChainError::Decode("string out of bounds".to_string()))?;
    Ok(String::from_utf8_lossy(bytes).into_owned())
}
