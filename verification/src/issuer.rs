//! Proof-token issuance.

use crate::error::VerificationError;
use holdgate_crypto::generate_token;
use holdgate_store::VerificationStore;
use holdgate_types::{IdentityId, ProofToken, Timestamp};
use tracing::debug;

/// A freshly minted proof token and its expiry.
#[derive(Clone, Debug)]
pub struct IssuedToken {
    pub token: ProofToken,
    pub expires_at: Timestamp,
}

/// Mints single-use, time-boxed proof tokens.
pub struct TokenIssuer {
    /// Seconds a token stays valid after issuance.
    ttl_secs: u64,
}

impl TokenIssuer {
    pub fn new(ttl_secs: u64) -> Self {
        Self { ttl_secs }
    }

    /// Issue a token for `identity`, overwriting any prior one.
    ///
    /// The store upsert is atomic and keyed by identity, which satisfies the
    /// single-active-token invariant without a read-then-write race check.
    /// No side effects beyond the store write.
    pub fn issue<S: VerificationStore>(
        &self,
        store: &S,
        identity: &IdentityId,
        now: Timestamp,
    ) -> Result<IssuedToken, VerificationError> {
        let token = generate_token();
        let expires_at = now.plus_secs(self.ttl_secs);

        store.upsert_token(identity, &token, expires_at, now)?;
        debug!(%identity, %expires_at, "issued proof token");

        Ok(IssuedToken { token, expires_at })
    }

    pub fn ttl_secs(&self) -> u64 {
        self.ttl_secs
    }
}
