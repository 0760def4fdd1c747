use holdgate_verification::VerificationError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    #[error("unknown action: {0}")]
    UnknownAction(String),

    #[error(transparent)]
    Verification(#[from] VerificationError),
}
