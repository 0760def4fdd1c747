//! Tunable verification parameters.

use serde::{Deserialize, Serialize};

/// Default proof-token lifetime: 15 minutes.
pub const DEFAULT_TOKEN_TTL_SECS: u64 = 900;

/// Default delay between oracle calls during reconciliation (ms).
pub const DEFAULT_RECONCILE_DELAY_MS: u64 = 500;

/// Parameters governing the verification lifecycle.
///
/// One instance is built from the service config at startup and shared by the
/// engine, the gateway, and the scheduler.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VerificationParams {
    /// Seconds a freshly issued proof token stays valid.
    pub token_ttl_secs: u64,

    /// Domain-identifying phrase embedded in the challenge message.
    ///
    /// Part of the signed payload: a signature produced for one domain can
    /// never be replayed against another.
    pub challenge_domain: String,

    /// Hour of day (UTC, 0–23) at which the daily reconciliation runs.
    pub reconcile_hour_utc: u8,

    /// Delay between consecutive oracle calls in a reconciliation batch (ms).
    pub reconcile_delay_ms: u64,
}

impl Default for VerificationParams {
    fn default() -> Self {
        Self {
            token_ttl_secs: DEFAULT_TOKEN_TTL_SECS,
            challenge_domain: "holdgate".to_string(),
            reconcile_hour_utc: 0,
            reconcile_delay_ms: DEFAULT_RECONCILE_DELAY_MS,
        }
    }
}
