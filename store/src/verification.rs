//! Verification record storage trait.

use crate::error::StoreError;
use crate::record::VerificationRecord;
use holdgate_types::{IdentityId, ProofToken, Timestamp, WalletAddress};

/// Trait for storing verification records.
///
/// Each mutation is a single atomic operation against the backend. Callers
/// never read-modify-write, so two near-simultaneous mutations for the same
/// identity cannot interleave into a mixed state. Atomicity is delegated to
/// the backend's native transactional guarantees; there is no in-process
/// locking above this trait.
pub trait VerificationStore: Send + Sync {
    /// Atomically create or update the record for `identity` with a fresh
    /// token, overwriting (and thereby invalidating) any prior token.
    ///
    /// An existing wallet binding is preserved: requesting re-verification
    /// does not deauthorize the identity until the new proof succeeds. For a
    /// new record, `created_at` is set to `now`.
    fn upsert_token(
        &self,
        identity: &IdentityId,
        token: &ProofToken,
        expires_at: Timestamp,
        now: Timestamp,
    ) -> Result<(), StoreError>;

    /// Look up a record by identity.
    fn get_by_identity(&self, identity: &IdentityId)
        -> Result<Option<VerificationRecord>, StoreError>;

    /// Look up a record by token value (secondary index, O(1)).
    ///
    /// Returns whatever is stored; expiry checking is the caller's job.
    fn get_by_token(&self, token: &ProofToken) -> Result<Option<VerificationRecord>, StoreError>;

    /// Atomically bind `wallet` to `identity`, set `verified_at`, and clear
    /// the outstanding token. Errors with [`StoreError::NotFound`] if the
    /// identity has no record.
    fn bind_wallet(
        &self,
        identity: &IdentityId,
        wallet: &WalletAddress,
        verified_at: Timestamp,
    ) -> Result<(), StoreError>;

    /// Clear the wallet binding and `verified_at` for `identity`. The record
    /// itself (and its `created_at`) is kept.
    fn clear_wallet(&self, identity: &IdentityId) -> Result<(), StoreError>;

    /// All records with a wallet currently bound, for reconciliation.
    fn iter_verified(&self) -> Result<Vec<VerificationRecord>, StoreError>;

    /// Total number of records.
    fn record_count(&self) -> Result<u64, StoreError>;
}
