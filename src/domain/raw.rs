//! Raw on-chain integers.
//!
//! Token amounts and prices arrive as full-width EVM words. They are carried
//! as `U256`/`I256` until a handler has decided the event is relevant, and only
//! then scaled into [`Decimal`](crate::domain::Decimal), which may not fit.

pub use alloy_primitives::{I256, U256};

/// Serde adapter for `U256` values carried as decimal strings.
pub mod u256_string {
    use super::U256;
    use serde::{Deserialize, Deserializer, Serializer};
    use std::str::FromStr;

    pub fn serialize<S: Serializer>(value: &U256, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<U256, D::Error> {
        let s = String::deserialize(deserializer)?;
        U256::from_str(&s).map_err(serde::de::Error::custom)
    }
}

/// Serde adapter for `I256` values carried as signed decimal strings.
pub mod i256_string {
    use super::I256;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &I256, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<I256, D::Error> {
        let s = String::deserialize(deserializer)?;
        I256::from_dec_str(&s).map_err(serde::de::Error::custom)
    }
}

/// Serde adapter for `u128` values carried as decimal strings.
pub mod u128_string {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &u128, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u128, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse::<u128>().map_err(serde::de::Error::custom)
    }
}
