//! Mapping from engine errors to HTTP responses.

use axum::http::StatusCode;
use holdgate_verification::VerificationError;
use thiserror::Error;

use crate::handlers::ErrorResponse;

/// Server-level failures (bind, serve). Engine errors never reach this;
/// they are mapped to responses at the handler boundary.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(String),
}

/// Map a verification error onto a status code and canonical error body.
///
/// The status classes are part of the external contract: missing input is
/// 400, an unknown token 404, an expired token 410 (distinct from unknown so
/// clients can prompt for re-issuance), a non-holder 403, upstream failures
/// 500 with reasons that tell a transient oracle outage apart from a role
/// grant that failed after the proof already succeeded.
pub fn error_response(err: &VerificationError) -> (StatusCode, ErrorResponse) {
    match err {
        VerificationError::MissingInput(field) => (
            StatusCode::BAD_REQUEST,
            ErrorResponse::new(format!("Missing required field: {field}"), "missing_input"),
        ),
        VerificationError::UnknownToken => (
            StatusCode::NOT_FOUND,
            ErrorResponse::new("Invalid or expired token", "unknown_token"),
        ),
        VerificationError::TokenExpired => (
            StatusCode::GONE,
            ErrorResponse::new(
                "Token has expired. Please request a new verification link.",
                "token_expired",
            ),
        ),
        VerificationError::Signature(_) => (
            StatusCode::BAD_REQUEST,
            ErrorResponse::new("Invalid signature", "invalid_signature"),
        ),
        VerificationError::AddressMismatch => (
            StatusCode::BAD_REQUEST,
            ErrorResponse::new(
                "Signature does not match the provided address",
                "address_mismatch",
            ),
        ),
        VerificationError::Oracle(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorResponse::new(
                "Failed to check asset balance. Please try again.",
                "oracle_unavailable",
            ),
        ),
        VerificationError::NoHoldings => {
            let mut body = ErrorResponse::new("No holdings found in this wallet", "no_holdings");
            body.balance = Some(0);
            (StatusCode::FORBIDDEN, body)
        }
        VerificationError::RoleGrantFailed(_) => {
            let mut body = ErrorResponse::new(
                "Verified, but assigning the role failed. Please contact an admin.",
                "role_grant_failed",
            );
            body.verified = Some(true);
            (StatusCode::INTERNAL_SERVER_ERROR, body)
        }
        VerificationError::RoleRevokeFailed(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorResponse::new(
                "Wallet removed, but revoking the role failed.",
                "role_revoke_failed",
            ),
        ),
        VerificationError::NotVerified(_) => (
            StatusCode::NOT_FOUND,
            ErrorResponse::new("No verified wallet for this identity", "not_verified"),
        ),
        VerificationError::Store(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorResponse::new("An internal error occurred. Please try again.", "store_error"),
        ),
    }
}
