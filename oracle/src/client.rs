//! JSON-RPC client for the ledger's `balanceOf` view call.

use crate::error::OracleError;
use crate::OwnershipOracle;

use async_trait::async_trait;
use holdgate_types::WalletAddress;
use serde::Deserialize;
use std::time::Duration;

/// Default timeout for a single ledger request.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default connection timeout.
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Function selector of `balanceOf(address)`.
const BALANCE_OF_SELECTOR: &str = "70a08231";

/// Ownership oracle backed by a JSON-RPC `eth_call` against the configured
/// asset contract.
pub struct JsonRpcOracle {
    /// HTTP client (reusable connection pool).
    http_client: reqwest::Client,
    /// JSON-RPC endpoint URL.
    rpc_url: String,
    /// Asset contract address queried for balances.
    contract: WalletAddress,
}

/// Raw JSON-RPC response envelope.
#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<String>,
    #[serde(default)]
    error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

impl JsonRpcOracle {
    /// Create an oracle with default timeout settings.
    pub fn new(rpc_url: impl Into<String>, contract: WalletAddress) -> Self {
        Self::with_timeout(rpc_url, contract, DEFAULT_TIMEOUT)
    }

    /// Create an oracle with a custom request timeout.
    pub fn with_timeout(
        rpc_url: impl Into<String>,
        contract: WalletAddress,
        timeout: Duration,
    ) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            http_client,
            rpc_url: rpc_url.into(),
            contract,
        }
    }
}

#[async_trait]
impl OwnershipOracle for JsonRpcOracle {
    async fn balance_of(&self, address: &WalletAddress) -> Result<u64, OracleError> {
        let body = serde_json::json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "eth_call",
            "params": [
                {
                    "to": self.contract.as_str(),
                    "data": balance_call_data(address),
                },
                "latest",
            ],
        });

        let response = self
            .http_client
            .post(&self.rpc_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    OracleError::Unreachable(format!("request timed out: {e}"))
                } else if e.is_connect() {
                    OracleError::Unreachable(format!("connection failed: {e}"))
                } else {
                    OracleError::RequestFailed(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            return Err(OracleError::RequestFailed(format!(
                "HTTP status {}",
                response.status()
            )));
        }

        let rpc: RpcResponse = response.json().await.map_err(|e| {
            OracleError::InvalidResponse(format!("failed to parse RPC response: {e}"))
        })?;

        if let Some(err) = rpc.error {
            return Err(OracleError::Rpc(format!("{} (code {})", err.message, err.code)));
        }

        let result = rpc
            .result
            .ok_or_else(|| OracleError::InvalidResponse("response has no result".into()))?;

        parse_quantity(&result)
    }
}

/// ABI-encode the `balanceOf(address)` call: 4-byte selector followed by the
/// address left-padded to 32 bytes.
fn balance_call_data(address: &WalletAddress) -> String {
    format!(
        "0x{BALANCE_OF_SELECTOR}{:0>64}",
        &address.as_str()[2..]
    )
}

/// Parse a hex quantity (`0x`-prefixed, typically 32 bytes) into a `u64`.
fn parse_quantity(raw: &str) -> Result<u64, OracleError> {
    let stripped = raw
        .strip_prefix("0x")
        .ok_or_else(|| OracleError::InvalidResponse(format!("result is not hex: {raw}")))?;

    let significant = stripped.trim_start_matches('0');
    if significant.is_empty() {
        return Ok(0);
    }
    if significant.len() > 16 {
        return Err(OracleError::InvalidResponse(format!(
            "balance exceeds 64 bits: {raw}"
        )));
    }

    u64::from_str_radix(significant, 16)
        .map_err(|e| OracleError::InvalidResponse(format!("result is not hex: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr() -> WalletAddress {
        WalletAddress::parse("0xab5801a7d398351b8be11c439e05c5b3259aec9b").unwrap()
    }

    #[test]
    fn call_data_encoding() {
        let data = balance_call_data(&addr());
        assert_eq!(
            data,
            "0x70a08231000000000000000000000000ab5801a7d398351b8be11c439e05c5b3259aec9b"
        );
        // 0x + selector (8) + padded address (64)
        assert_eq!(data.len(), 2 + 8 + 64);
    }

    #[test]
    fn parse_zero_balance() {
        let full_width = format!("0x{}", "0".repeat(64));
        assert_eq!(parse_quantity(&full_width).unwrap(), 0);
        assert_eq!(parse_quantity("0x0").unwrap(), 0);
    }

    #[test]
    fn parse_small_balance() {
        let two = format!("0x{}2", "0".repeat(63));
        assert_eq!(parse_quantity(&two).unwrap(), 2);
    }

    #[test]
    fn parse_rejects_missing_prefix() {
        assert!(matches!(
            parse_quantity("deadbeef"),
            Err(OracleError::InvalidResponse(_))
        ));
    }

    #[test]
    fn parse_rejects_oversized_quantity() {
        let huge = format!("0x{}", "f".repeat(64));
        assert!(matches!(
            parse_quantity(&huge),
            Err(OracleError::InvalidResponse(_))
        ));
    }

    #[test]
    fn rpc_error_deserialization() {
        let json = r#"{"jsonrpc":"2.0","id":1,"error":{"code":-32000,"message":"execution reverted"}}"#;
        let resp: RpcResponse = serde_json::from_str(json).unwrap();
        assert!(resp.result.is_none());
        let err = resp.error.unwrap();
        assert_eq!(err.code, -32000);
        assert_eq!(err.message, "execution reverted");
    }

    #[test]
    fn rpc_result_deserialization() {
        let json = r#"{"jsonrpc":"2.0","id":1,"result":"0x1"}"#;
        let resp: RpcResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.result.as_deref(), Some("0x1"));
        assert!(resp.error.is_none());
    }
}
