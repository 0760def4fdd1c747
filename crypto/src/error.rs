use thiserror::Error;

#[derive(Debug, Error)]
pub enum SignatureError {
    #[error("signature is not valid hex: {0}")]
    InvalidHex(String),

    #[error("signature must be 65 bytes, got {0}")]
    WrongLength(usize),

    #[error("invalid recovery id: {0}")]
    InvalidRecoveryId(u8),

    #[error("signature does not recover to a valid public key: {0}")]
    RecoveryFailed(String),
}
