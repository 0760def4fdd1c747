use holdgate_crypto::SignatureError;
use holdgate_oracle::OracleError;
use holdgate_roles::RoleError;
use holdgate_store::StoreError;
use thiserror::Error;

/// Everything that can go wrong in the verification lifecycle.
///
/// The variants map one-to-one onto the recovery story the caller needs:
/// input errors are fixed by resubmitting, token errors by re-issuing,
/// signature errors by re-signing; oracle errors are transient and must
/// never be conflated with a genuine zero balance; role errors after a
/// successful proof are surfaced distinctly because the cryptographic work
/// already succeeded.
#[derive(Debug, Error)]
pub enum VerificationError {
    #[error("missing required field: {0}")]
    MissingInput(&'static str),

    #[error("invalid or unknown token")]
    UnknownToken,

    #[error("token has expired")]
    TokenExpired,

    #[error(transparent)]
    Signature(#[from] SignatureError),

    #[error("signature does not match the provided address")]
    AddressMismatch,

    #[error("ownership check failed: {0}")]
    Oracle(#[from] OracleError),

    #[error("no holdings found for this wallet")]
    NoHoldings,

    #[error("verified, but granting the role failed: {0}")]
    RoleGrantFailed(RoleError),

    #[error("wallet removed, but revoking the role failed: {0}")]
    RoleRevokeFailed(RoleError),

    #[error("identity {0} has no verified wallet")]
    NotVerified(String),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}
