//! Request/response DTOs for the HTTP API.
//!
//! Wire names are camelCase; the contract predates this implementation and
//! existing front ends depend on it.

use serde::{Deserialize, Serialize};

// ── Token check ──────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CheckTokenQuery {
    pub token: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckTokenResponse {
    pub valid: bool,
    pub already_verified: bool,
    /// Truncated wallet (`0xabcd...1234`) when already verified.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wallet: Option<String>,
}

// ── Verify submission ────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    pub token: Option<String>,
    pub address: Option<String>,
    pub signature: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyResponse {
    pub success: bool,
    pub message: String,
    pub balance: u64,
    pub wallet: String,
}

// ── Status ───────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub verified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wallet: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verified_at: Option<u64>,
}

// ── Health ───────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: u64,
}

// ── Errors ───────────────────────────────────────────────────────────────

/// Uniform error body: a user-facing message plus a stable machine-readable
/// reason. `balance`/`verified` ride along for the two outcomes that need
/// extra context (not-a-holder, grant-failed-after-proof).
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub reason: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balance: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verified: Option<bool>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, reason: &'static str) -> Self {
        Self {
            error: error.into(),
            reason,
            balance: None,
            verified: None,
        }
    }
}
