//! The per-identity verification record.

use holdgate_types::{IdentityId, ProofToken, Timestamp, WalletAddress};
use serde::{Deserialize, Serialize};

/// Durable verification state for one identity: the single source of truth
/// for token and wallet binding state.
///
/// Field invariants:
/// - `token` and `token_expires_at` are present or absent together.
/// - `wallet` and `verified_at` are present or absent together.
/// - `created_at` is immutable; records are never hard-deleted, so it
///   survives wallet removal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationRecord {
    /// The identity this record belongs to (unique key).
    pub identity: IdentityId,
    /// Bound wallet; present iff the identity is currently verified.
    pub wallet: Option<WalletAddress>,
    /// Outstanding proof token, if a verification attempt is in flight.
    pub token: Option<ProofToken>,
    /// Expiry of the outstanding token.
    pub token_expires_at: Option<Timestamp>,
    /// When the current wallet binding was proven.
    pub verified_at: Option<Timestamp>,
    /// When this record was first created.
    pub created_at: Timestamp,
}

impl VerificationRecord {
    /// A fresh record with no token and no wallet.
    pub fn new(identity: IdentityId, created_at: Timestamp) -> Self {
        Self {
            identity,
            wallet: None,
            token: None,
            token_expires_at: None,
            verified_at: None,
            created_at,
        }
    }

    /// Whether a wallet is currently bound.
    pub fn is_verified(&self) -> bool {
        self.wallet.is_some()
    }

    /// Whether an unexpired token is outstanding.
    ///
    /// A stored token past its expiry is logically dead; validity is always
    /// a function of `now`, never of mere presence.
    pub fn has_valid_token(&self, now: Timestamp) -> bool {
        match (&self.token, self.token_expires_at) {
            (Some(_), Some(expires_at)) => !expires_at.is_past(now),
            _ => false,
        }
    }

    /// Whether a token is stored but expired.
    pub fn token_expired(&self, now: Timestamp) -> bool {
        match (&self.token, self.token_expires_at) {
            (Some(_), Some(expires_at)) => expires_at.is_past(now),
            _ => false,
        }
    }
}
