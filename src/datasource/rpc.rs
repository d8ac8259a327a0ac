//! JSON-RPC `eth_call` implementation of [`ChainReader`].

use super::abi;
use super::{ChainError, ChainReader};
use crate::domain::{Address, BlockNumber, U256};
use async_trait::async_trait;
use backoff::future::retry;
use backoff::ExponentialBackoff;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

/// JSON-RPC error code used by nodes for `execution reverted`.
const REVERT_CODE: i64 = 3;

#[derive(Debug, Clone)]
pub struct RpcChainReader {
    client: Client,
    url: String,
    max_elapsed: Duration,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    result: Option<String>,
    error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

impl RpcChainReader {
    pub fn new(url: String, max_elapsed: Duration) -> Self {
        Self {
            client: Client::new(),
            url,
            max_elapsed,
        }
    }

    /// Perform `eth_call` against `to` at `block`, returning raw return data.
    async fn eth_call(
        &self,
        to: &Address,
        data: String,
        block: BlockNumber,
    ) -> Result<Vec<u8>, ChainError> {
        let payload = serde_json::json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "eth_call",
            "params": [
                { "to": to.as_str(), "data": data },
                format!("0x{:x}", block),
            ],
        });
        let backoff = ExponentialBackoff {
            max_elapsed_time: Some(self.max_elapsed),
            ..Default::default()
        };

        let response = retry(backoff, || async {
            let response = self
                .client
                .post(&self.url)
                .json(&payload)
                .send()
                .await
                .map_err(|e| {
                    warn!(error = %e, "eth_call transport failure, retrying");
                    backoff::Error::transient(ChainError::Network(e.to_string()))
                })?;

            let status = response.status();
            if status == 429 || status.is_server_error() {
                return Err(backoff::Error::transient(ChainError::Http {
                    status: status.as_u16(),
                }));
            }
            if !status.is_success() {
                return Err(backoff::Error::permanent(ChainError::Http {
                    status: status.as_u16(),
                }));
            }

            response
                .json::<RpcResponse>()
                .await
                .map_err(|e| backoff::Error::permanent(ChainError::Decode(e.to_string())))
        })
        .await?;

        debug!(to = %to, block, "eth_call returned");
        interpret_response(response)
    }
}

fn interpret_response(response: RpcResponse) -> Result<Vec<u8>, ChainError> {
    if let Some(error) = response.error {
        if error.code == REVERT_CODE || error.message.to_lowercase().contains("revert") {
            return Err(ChainError::Reverted);
        }
        return Err(ChainError::Rpc {
            code: error.code,
            message: error.message,
        });
    }
    match response.result {
        Some(result) => abi::decode_hex(&result),
        None => Err(ChainError::Decode("response has neither result nor error".to_string())),
    }
}

#[async_trait]
impl ChainReader for RpcChainReader {
    async fn decimals(&self, token: &Address, block: BlockNumber) -> Result<u32, ChainError> {
        let data = self
            .eth_call(token, abi::encode_call(abi::DECIMALS), block)
            .await?;
        abi::decode_u32(&data)
    }

    async fn name(&self, token: &Address, block: BlockNumber) -> Result<String, ChainError> {
        let data = self.eth_call(token, abi::encode_call(abi::NAME), block).await?;
        abi::decode_string(&data)
    }

    async fn symbol(&self, token: &Address, block: BlockNumber) -> Result<String, ChainError> {
        let data = self
            .eth_call(token, abi::encode_call(abi::SYMBOL), block)
            .await?;
        abi::decode_string(&data)
    }

    async fn balance_of(
        &self,
        token: &Address,
        owner: &Address,
        block: BlockNumber,
    ) -> Result<U256, ChainError> {
        let data = self
            .eth_call(
                token,
                abi::encode_call_with_address(abi::BALANCE_OF, owner),
                block,
            )
            .await?;
        abi::decode_uint256(&data)
    }

    async fn base_token(
        &self,
        collateral: &Address,
        block: BlockNumber,
    ) -> Result<Address, ChainError> {
        let data = self
            .eth_call(collateral, abi::encode_call(abi::GET_BASE_TOKEN), block)
            .await?;
        abi::decode_address(&data)
    }

    async fn treasury(
        &self,
        collateral: &Address,
        block: BlockNumber,
    ) -> Result<Address, ChainError> {
        let data = self
            .eth_call(collateral, abi::encode_call(abi::GET_TREASURY), block)
            .await?;
        abi::decode_address(&data)
    }
}
