//! The verification state machine.

use std::sync::Arc;

use holdgate_crypto::{challenge_message, recover_signer};
use holdgate_oracle::OwnershipOracle;
use holdgate_roles::RoleBinding;
use holdgate_store::{VerificationRecord, VerificationStore};
use holdgate_types::{IdentityId, ProofToken, Timestamp, VerificationParams, WalletAddress};
use tracing::{info, warn};

use crate::error::VerificationError;
use crate::issuer::{IssuedToken, TokenIssuer};
use crate::lifecycle::{link_state, LinkState};

/// Result of a token-check query.
#[derive(Clone, Debug)]
pub struct TokenCheck {
    /// Whether the identity behind the token already has a wallet bound.
    pub already_verified: bool,
    /// The bound wallet, if any.
    pub wallet: Option<WalletAddress>,
}

/// Result of a successful proof submission.
#[derive(Clone, Debug)]
pub struct ProofOutcome {
    /// The wallet that was bound.
    pub wallet: WalletAddress,
    /// Asset balance reported by the oracle at proof time.
    pub balance: u64,
}

/// Read-only verification status of an identity.
#[derive(Clone, Debug)]
pub struct LinkStatus {
    pub verified: bool,
    pub wallet: Option<WalletAddress>,
    pub verified_at: Option<Timestamp>,
}

/// Orchestrates token issuance, proof checking, and role transitions.
///
/// Generic over its three external seams so the whole lifecycle runs under
/// test against in-memory nullables. Concurrent requests for different
/// identities are fully independent; per-record atomicity is the store's
/// responsibility.
pub struct VerificationEngine<S, O, R> {
    store: Arc<S>,
    oracle: O,
    roles: R,
    issuer: TokenIssuer,
    params: VerificationParams,
}

impl<S, O, R> VerificationEngine<S, O, R>
where
    S: VerificationStore,
    O: OwnershipOracle,
    R: RoleBinding,
{
    pub fn new(store: Arc<S>, oracle: O, roles: R, params: VerificationParams) -> Self {
        let issuer = TokenIssuer::new(params.token_ttl_secs);
        Self {
            store,
            oracle,
            roles,
            issuer,
            params,
        }
    }

    pub fn params(&self) -> &VerificationParams {
        &self.params
    }

    /// Issue a fresh proof token for `identity`, invalidating any prior one.
    pub fn issue_token(
        &self,
        identity: &IdentityId,
        now: Timestamp,
    ) -> Result<IssuedToken, VerificationError> {
        self.issuer.issue(self.store.as_ref(), identity, now)
    }

    /// Check whether `token` is usable, and whether its identity already has
    /// a wallet bound. Read-only.
    pub fn check_token(
        &self,
        token: &ProofToken,
        now: Timestamp,
    ) -> Result<TokenCheck, VerificationError> {
        let record = self.lookup_valid_token(token, now)?;
        Ok(TokenCheck {
            already_verified: record.is_verified(),
            wallet: record.wallet,
        })
    }

    /// Attempt the `TokenIssued → Verified` transition.
    ///
    /// Steps, in order: token must exist and be unexpired; the signature
    /// must recover to `claimed`; the oracle must report a positive balance.
    /// Any failing step returns without mutating state, and the token
    /// remains valid and retryable until it expires.
    ///
    /// On success the store is updated *before* the role grant, so a grant
    /// failure leaves the identity durably verified in the store and is
    /// reported as [`VerificationError::RoleGrantFailed`] for retry or
    /// manual handling (the daily reconciliation also re-affirms grants).
    pub async fn submit_proof(
        &self,
        token: &ProofToken,
        claimed: &WalletAddress,
        signature: &str,
        now: Timestamp,
    ) -> Result<ProofOutcome, VerificationError> {
        let record = self.lookup_valid_token(token, now)?;
        let identity = record.identity.clone();

        let message = challenge_message(&self.params.challenge_domain, token);
        let recovered = recover_signer(&message, signature)?;
        // Both sides are lowercase-normalized, so equality is the
        // case-insensitive comparison the contract requires.
        if &recovered != claimed {
            warn!(%identity, %recovered, %claimed, "signature recovered to a different address");
            return Err(VerificationError::AddressMismatch);
        }

        let balance = self.oracle.balance_of(claimed).await?;
        if balance == 0 {
            info!(%identity, wallet = %claimed, "proof rejected: no holdings");
            return Err(VerificationError::NoHoldings);
        }

        self.store.bind_wallet(&identity, claimed, now)?;
        info!(%identity, wallet = %claimed, balance, "wallet verified");

        if let Err(e) = self.roles.grant(&identity).await {
            warn!(%identity, error = %e, "verified in store but role grant failed");
            return Err(VerificationError::RoleGrantFailed(e));
        }

        Ok(ProofOutcome {
            wallet: claimed.clone(),
            balance,
        })
    }

    /// The `Verified → Unlinked` transition: clear the binding, then revoke
    /// the role.
    ///
    /// Order is reversed versus the grant path: the store is cleared first
    /// and never rolled back, so a stale implicit grant cannot survive a
    /// clear request. A revoke failure is reported as
    /// [`VerificationError::RoleRevokeFailed`].
    pub async fn remove_wallet(&self, identity: &IdentityId) -> Result<(), VerificationError> {
        let record = self
            .store
            .get_by_identity(identity)?
            .ok_or_else(|| VerificationError::NotVerified(identity.to_string()))?;
        if !record.is_verified() {
            return Err(VerificationError::NotVerified(identity.to_string()));
        }

        self.store.clear_wallet(identity)?;
        info!(%identity, "wallet binding cleared");

        if let Err(e) = self.roles.revoke(identity).await {
            warn!(%identity, error = %e, "wallet cleared but role revoke failed");
            return Err(VerificationError::RoleRevokeFailed(e));
        }
        Ok(())
    }

    /// Read-only verification status of an identity. No side effects.
    pub fn status(
        &self,
        identity: &IdentityId,
        now: Timestamp,
    ) -> Result<LinkStatus, VerificationError> {
        match self.store.get_by_identity(identity)? {
            Some(record) => Ok(LinkStatus {
                verified: link_state(&record, now) == LinkState::Verified,
                wallet: record.wallet,
                verified_at: record.verified_at,
            }),
            None => Ok(LinkStatus {
                verified: false,
                wallet: None,
                verified_at: None,
            }),
        }
    }

    /// Resolve a token to its record, enforcing expiry.
    fn lookup_valid_token(
        &self,
        token: &ProofToken,
        now: Timestamp,
    ) -> Result<VerificationRecord, VerificationError> {
        let record = self
            .store
            .get_by_token(token)?
            .ok_or(VerificationError::UnknownToken)?;
        if record.token_expired(now) {
            return Err(VerificationError::TokenExpired);
        }
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use holdgate_crypto::keccak256;
    use holdgate_nullables::{NullOracle, NullRoles, NullStore};
    use holdgate_types::WalletAddress;
    use k256::ecdsa::SigningKey;
    use rand::rngs::OsRng;

    struct Harness {
        engine: VerificationEngine<NullStore, Arc<NullOracle>, Arc<NullRoles>>,
        store: Arc<NullStore>,
        oracle: Arc<NullOracle>,
        roles: Arc<NullRoles>,
    }

    /// Build an engine whose oracle and roles handles are shared with the
    /// test, so both sides of every seam can be scripted and inspected.
    fn harness() -> Harness {
        let store = Arc::new(NullStore::new());
        let oracle = Arc::new(NullOracle::new());
        let roles = Arc::new(NullRoles::new());
        let engine = VerificationEngine::new(
            store.clone(),
            oracle.clone(),
            roles.clone(),
            VerificationParams::default(),
        );
        Harness {
            engine,
            store,
            oracle,
            roles,
        }
    }

    struct Signer {
        key: SigningKey,
        address: WalletAddress,
    }

    impl Signer {
        fn random() -> Self {
            let key = SigningKey::random(&mut OsRng);
            let point = key.verifying_key().to_encoded_point(false);
            let hash = keccak256(&point.as_bytes()[1..]);
            let mut addr = [0u8; 20];
            addr.copy_from_slice(&hash[12..]);
            Self {
                key,
                address: WalletAddress::from_bytes(&addr),
            }
        }

        /// Produce the 65-byte hex signature a wallet would emit for `message`.
        fn sign(&self, message: &str) -> String {
            let mut data = Vec::new();
            data.extend_from_slice(b"\x19Ethereum Signed Message:\n");
            data.extend_from_slice(message.len().to_string().as_bytes());
            data.extend_from_slice(message.as_bytes());
            let digest = keccak256(&data);

            let (sig, recid) = self.key.sign_prehash_recoverable(&digest).unwrap();
            let mut bytes = [0u8; 65];
            bytes[..64].copy_from_slice(&sig.to_bytes());
            bytes[64] = recid.to_byte() + 27;
            format!("0x{}", hex::encode(bytes))
        }
    }

    fn identity() -> IdentityId {
        IdentityId::new("user-1")
    }

    const T0: Timestamp = Timestamp::EPOCH;

    fn now(secs: u64) -> Timestamp {
        Timestamp::new(secs)
    }

    #[tokio::test]
    async fn full_flow_issue_prove_grant() {
        let h = harness();
        let signer = Signer::random();
        h.oracle.set_balance(&signer.address, 2);

        let issued = h.engine.issue_token(&identity(), now(1000)).unwrap();
        assert_eq!(issued.expires_at, now(1900));

        let message = challenge_message("holdgate", &issued.token);
        let outcome = h
            .engine
            .submit_proof(&issued.token, &signer.address, &signer.sign(&message), now(1500))
            .await
            .unwrap();

        assert_eq!(outcome.balance, 2);
        assert_eq!(outcome.wallet, signer.address);

        // Record: wallet bound, token cleared, verified_at set.
        let record = h.store.get_by_identity(&identity()).unwrap().unwrap();
        assert_eq!(record.wallet, Some(signer.address.clone()));
        assert!(record.token.is_none());
        assert_eq!(record.verified_at, Some(now(1500)));

        assert!(h.roles.has_role(&identity()));
    }

    #[tokio::test]
    async fn expired_token_rejected_record_unchanged() {
        let h = harness();
        let signer = Signer::random();
        h.oracle.set_balance(&signer.address, 1);

        let issued = h.engine.issue_token(&identity(), now(1000)).unwrap();
        let message = challenge_message("holdgate", &issued.token);
        let sig = signer.sign(&message);

        // 901 seconds later: past the 900s TTL.
        let result = h
            .engine
            .submit_proof(&issued.token, &signer.address, &sig, now(1901))
            .await;
        assert!(matches!(result, Err(VerificationError::TokenExpired)));

        let record = h.store.get_by_identity(&identity()).unwrap().unwrap();
        assert!(record.wallet.is_none());
        assert_eq!(record.token, Some(issued.token));
    }

    #[tokio::test]
    async fn unknown_token_rejected() {
        let h = harness();
        let result = h.engine.check_token(&ProofToken::new("nope"), T0);
        assert!(matches!(result, Err(VerificationError::UnknownToken)));
    }

    #[tokio::test]
    async fn address_mismatch_keeps_token_retryable() {
        let h = harness();
        let signer = Signer::random();
        let other = Signer::random();
        h.oracle.set_balance(&other.address, 5);

        let issued = h.engine.issue_token(&identity(), now(1000)).unwrap();
        let message = challenge_message("holdgate", &issued.token);

        // Signature from one wallet, claim of another.
        let result = h
            .engine
            .submit_proof(&issued.token, &other.address, &signer.sign(&message), now(1100))
            .await;
        assert!(matches!(result, Err(VerificationError::AddressMismatch)));
        assert_eq!(h.oracle.call_count(), 0);

        // Token is not consumed: the right wallet can still prove.
        h.oracle.set_balance(&signer.address, 1);
        let outcome = h
            .engine
            .submit_proof(&issued.token, &signer.address, &signer.sign(&message), now(1200))
            .await
            .unwrap();
        assert_eq!(outcome.wallet, signer.address);
    }

    #[tokio::test]
    async fn zero_balance_is_not_an_oracle_error_and_preserves_token() {
        let h = harness();
        let signer = Signer::random();
        // Balance stays at the default zero.

        let issued = h.engine.issue_token(&identity(), now(1000)).unwrap();
        let message = challenge_message("holdgate", &issued.token);

        let result = h
            .engine
            .submit_proof(&issued.token, &signer.address, &signer.sign(&message), now(1100))
            .await;
        assert!(matches!(result, Err(VerificationError::NoHoldings)));

        // Record remains TokenIssued; the token is retriable before expiry.
        let record = h.store.get_by_identity(&identity()).unwrap().unwrap();
        assert!(record.has_valid_token(now(1100)));
        assert!(record.wallet.is_none());
        assert_eq!(h.roles.grant_calls(), 0);
    }

    #[tokio::test]
    async fn oracle_failure_does_not_burn_token() {
        let h = harness();
        let signer = Signer::random();
        h.oracle.fail_for(&signer.address);

        let issued = h.engine.issue_token(&identity(), now(1000)).unwrap();
        let message = challenge_message("holdgate", &issued.token);
        let sig = signer.sign(&message);

        let result = h
            .engine
            .submit_proof(&issued.token, &signer.address, &sig, now(1100))
            .await;
        assert!(matches!(result, Err(VerificationError::Oracle(_))));

        let record = h.store.get_by_identity(&identity()).unwrap().unwrap();
        assert!(record.has_valid_token(now(1100)));
        assert!(record.wallet.is_none());
    }

    #[tokio::test]
    async fn role_grant_failure_leaves_store_verified() {
        let h = harness();
        let signer = Signer::random();
        h.oracle.set_balance(&signer.address, 1);
        h.roles.fail_all(true);

        let issued = h.engine.issue_token(&identity(), now(1000)).unwrap();
        let message = challenge_message("holdgate", &issued.token);

        let result = h
            .engine
            .submit_proof(&issued.token, &signer.address, &signer.sign(&message), now(1100))
            .await;
        assert!(matches!(result, Err(VerificationError::RoleGrantFailed(_))));

        // The tolerated inconsistency: verified in the store, role absent.
        let record = h.store.get_by_identity(&identity()).unwrap().unwrap();
        assert!(record.is_verified());
        assert!(!h.roles.has_role(&identity()));
    }

    #[tokio::test]
    async fn remove_wallet_clears_store_and_revokes() {
        let h = harness();
        let signer = Signer::random();
        h.oracle.set_balance(&signer.address, 1);

        let issued = h.engine.issue_token(&identity(), now(1000)).unwrap();
        let message = challenge_message("holdgate", &issued.token);
        h.engine
            .submit_proof(&issued.token, &signer.address, &signer.sign(&message), now(1100))
            .await
            .unwrap();

        h.engine.remove_wallet(&identity()).await.unwrap();

        let status = h.engine.status(&identity(), now(1200)).unwrap();
        assert!(!status.verified);
        assert!(!h.roles.has_role(&identity()));
    }

    #[tokio::test]
    async fn remove_wallet_revoke_failure_does_not_restore_binding() {
        let h = harness();
        let signer = Signer::random();
        h.oracle.set_balance(&signer.address, 1);

        let issued = h.engine.issue_token(&identity(), now(1000)).unwrap();
        let message = challenge_message("holdgate", &issued.token);
        h.engine
            .submit_proof(&issued.token, &signer.address, &signer.sign(&message), now(1100))
            .await
            .unwrap();

        h.roles.fail_all(true);
        let result = h.engine.remove_wallet(&identity()).await;
        assert!(matches!(result, Err(VerificationError::RoleRevokeFailed(_))));

        // Losing access beats a stale grant: the clear is not rolled back.
        let record = h.store.get_by_identity(&identity()).unwrap().unwrap();
        assert!(!record.is_verified());
    }

    #[tokio::test]
    async fn remove_then_reverify_same_wallet_succeeds() {
        let h = harness();
        let signer = Signer::random();
        h.oracle.set_balance(&signer.address, 1);

        let issued = h.engine.issue_token(&identity(), now(1000)).unwrap();
        let message = challenge_message("holdgate", &issued.token);
        h.engine
            .submit_proof(&issued.token, &signer.address, &signer.sign(&message), now(1100))
            .await
            .unwrap();

        h.engine.remove_wallet(&identity()).await.unwrap();

        // No permanent lockout: a fresh token reaches Verified again.
        let issued = h.engine.issue_token(&identity(), now(2000)).unwrap();
        let message = challenge_message("holdgate", &issued.token);
        let outcome = h
            .engine
            .submit_proof(&issued.token, &signer.address, &signer.sign(&message), now(2100))
            .await
            .unwrap();
        assert_eq!(outcome.wallet, signer.address);
        assert!(h.roles.has_role(&identity()));
    }

    #[tokio::test]
    async fn remove_wallet_without_binding_errors() {
        let h = harness();
        let result = h.engine.remove_wallet(&identity()).await;
        assert!(matches!(result, Err(VerificationError::NotVerified(_))));
    }

    #[tokio::test]
    async fn check_token_reports_existing_binding() {
        let h = harness();
        let signer = Signer::random();
        h.oracle.set_balance(&signer.address, 1);

        let issued = h.engine.issue_token(&identity(), now(1000)).unwrap();
        let check = h.engine.check_token(&issued.token, now(1100)).unwrap();
        assert!(!check.already_verified);

        let message = challenge_message("holdgate", &issued.token);
        h.engine
            .submit_proof(&issued.token, &signer.address, &signer.sign(&message), now(1100))
            .await
            .unwrap();

        // Re-verification: new token sees the existing binding.
        let issued = h.engine.issue_token(&identity(), now(2000)).unwrap();
        let check = h.engine.check_token(&issued.token, now(2100)).unwrap();
        assert!(check.already_verified);
        assert_eq!(check.wallet, Some(signer.address));
    }

    #[tokio::test]
    async fn checksummed_claimed_address_matches_recovered() {
        let h = harness();
        let signer = Signer::random();
        h.oracle.set_balance(&signer.address, 3);

        let issued = h.engine.issue_token(&identity(), now(1000)).unwrap();
        let message = challenge_message("holdgate", &issued.token);

        // Claim the address with scrambled casing, as checksummed clients do.
        let claimed =
            WalletAddress::parse(&signer.address.as_str().to_ascii_uppercase().replace("0X", "0x"))
                .unwrap();
        let outcome = h
            .engine
            .submit_proof(&issued.token, &claimed, &signer.sign(&message), now(1100))
            .await
            .unwrap();
        assert_eq!(outcome.wallet, signer.address);
    }

    #[tokio::test]
    async fn status_for_unknown_identity_is_unverified() {
        let h = harness();
        let status = h.engine.status(&IdentityId::new("stranger"), T0).unwrap();
        assert!(!status.verified);
        assert!(status.wallet.is_none());
        assert!(status.verified_at.is_none());
    }
}
