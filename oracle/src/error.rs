use thiserror::Error;

#[derive(Debug, Error)]
pub enum OracleError {
    #[error("ledger endpoint unreachable: {0}")]
    Unreachable(String),

    #[error("ledger request failed: {0}")]
    RequestFailed(String),

    #[error("ledger RPC error: {0}")]
    Rpc(String),

    #[error("invalid response from ledger: {0}")]
    InvalidResponse(String),
}
