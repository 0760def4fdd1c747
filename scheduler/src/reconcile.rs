//! The reconciliation batch algorithm.

use std::sync::Arc;
use std::time::Duration;

use holdgate_oracle::{OracleError, OwnershipOracle};
use holdgate_roles::{RoleBinding, RoleError};
use holdgate_store::{StoreError, VerificationRecord, VerificationStore};
use holdgate_types::{IdentityId, WalletAddress};
use tracing::{info, warn};

/// Aggregate outcome of one reconciliation run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Identities still holding: role re-affirmed (idempotent grant).
    pub reaffirmed: u32,
    /// Identities that no longer hold: role revoked, wallet cleared.
    pub revoked: u32,
    /// Identities whose check failed (oracle or role error); untouched.
    pub errored: u32,
}

/// What happened to a single identity during the batch.
enum Outcome {
    Reaffirmed,
    Revoked,
}

/// Per-identity failure inside the batch. Caught, counted, and logged;
/// never allowed to abort the remaining identities.
#[derive(Debug, thiserror::Error)]
enum CheckError {
    #[error(transparent)]
    Oracle(#[from] OracleError),
    #[error(transparent)]
    Role(#[from] RoleError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Walks every verified record and corrects role drift.
///
/// The batch runs strictly sequentially with a fixed inter-call delay to
/// bound load against the rate-limited oracle and role APIs.
pub struct Reconciler<S, O, R> {
    store: Arc<S>,
    oracle: O,
    roles: R,
    /// Pause between consecutive identities.
    delay: Duration,
}

impl<S, O, R> Reconciler<S, O, R>
where
    S: VerificationStore,
    O: OwnershipOracle,
    R: RoleBinding,
{
    pub fn new(store: Arc<S>, oracle: O, roles: R, delay: Duration) -> Self {
        Self {
            store,
            oracle,
            roles,
            delay,
        }
    }

    /// Run one full reconciliation pass over all verified identities.
    ///
    /// Fails only if the verified set cannot be fetched at all; every
    /// per-identity failure is absorbed into the report's `errored` count.
    pub async fn run_once(&self) -> Result<ReconcileReport, StoreError> {
        let records = self.store.iter_verified()?;
        info!(count = records.len(), "reconciliation started");

        let mut report = ReconcileReport::default();
        let total = records.len();

        for (i, record) in records.into_iter().enumerate() {
            match self.check_one(&record).await {
                Ok(Outcome::Reaffirmed) => report.reaffirmed += 1,
                Ok(Outcome::Revoked) => {
                    info!(identity = %record.identity, "revoked: no longer holds the asset");
                    report.revoked += 1;
                }
                Err(e) => {
                    warn!(identity = %record.identity, error = %e, "reconciliation check failed");
                    report.errored += 1;
                }
            }

            if !self.delay.is_zero() && i + 1 < total {
                tokio::time::sleep(self.delay).await;
            }
        }

        info!(
            reaffirmed = report.reaffirmed,
            revoked = report.revoked,
            errored = report.errored,
            "reconciliation finished"
        );
        Ok(report)
    }

    /// Re-check a single identity against the oracle and fix its role.
    async fn check_one(&self, record: &VerificationRecord) -> Result<Outcome, CheckError> {
        let Some(wallet) = &record.wallet else {
            // iter_verified only yields bound records; treat anything else
            // as already reconciled.
            return Ok(Outcome::Reaffirmed);
        };

        let balance = self.oracle.balance_of(wallet).await?;
        if balance > 0 {
            self.reaffirm(&record.identity).await?;
            Ok(Outcome::Reaffirmed)
        } else {
            self.revoke(&record.identity).await?;
            Ok(Outcome::Revoked)
        }
    }

    async fn reaffirm(&self, identity: &IdentityId) -> Result<(), CheckError> {
        self.roles.grant(identity).await?;
        Ok(())
    }

    async fn revoke(&self, identity: &IdentityId) -> Result<(), CheckError> {
        self.roles.revoke(identity).await?;
        self.store.clear_wallet(identity)?;
        Ok(())
    }

    /// The wallet addresses a run would check, in batch order. Exposed for
    /// observability endpoints and tests.
    pub fn pending_wallets(&self) -> Result<Vec<WalletAddress>, StoreError> {
        Ok(self
            .store
            .iter_verified()?
            .into_iter()
            .filter_map(|r| r.wallet)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use holdgate_nullables::{NullOracle, NullRoles, NullStore};
    use holdgate_types::{ProofToken, Timestamp};

    struct Harness {
        reconciler: Reconciler<NullStore, Arc<NullOracle>, Arc<NullRoles>>,
        store: Arc<NullStore>,
        oracle: Arc<NullOracle>,
        roles: Arc<NullRoles>,
    }

    fn harness() -> Harness {
        let store = Arc::new(NullStore::new());
        let oracle = Arc::new(NullOracle::new());
        let roles = Arc::new(NullRoles::new());
        let reconciler = Reconciler::new(
            store.clone(),
            oracle.clone(),
            roles.clone(),
            Duration::ZERO,
        );
        Harness {
            reconciler,
            store,
            oracle,
            roles,
        }
    }

    fn identity(n: u32) -> IdentityId {
        IdentityId::new(format!("user-{n}"))
    }

    fn wallet(last: char) -> WalletAddress {
        WalletAddress::parse(&format!("0x{}", last.to_string().repeat(40))).unwrap()
    }

    /// Seed a verified identity bound to `wallet`.
    fn seed_verified(store: &NullStore, id: &IdentityId, wallet: &WalletAddress) {
        store
            .upsert_token(id, &ProofToken::new(format!("t-{id}")), Timestamp::new(900), Timestamp::new(0))
            .unwrap();
        store.bind_wallet(id, wallet, Timestamp::new(500)).unwrap();
    }

    #[tokio::test]
    async fn holder_reaffirmed_exholder_revoked() {
        let h = harness();
        seed_verified(&h.store, &identity(1), &wallet('a'));
        seed_verified(&h.store, &identity(2), &wallet('b'));
        h.oracle.set_balance(&wallet('a'), 3);
        // wallet 'b' defaults to zero balance.

        let report = h.reconciler.run_once().await.unwrap();
        assert_eq!(
            report,
            ReconcileReport {
                reaffirmed: 1,
                revoked: 1,
                errored: 0
            }
        );

        // Exactly one grant re-affirmation and one revoke + wallet clear.
        assert_eq!(h.roles.grant_calls(), 1);
        assert_eq!(h.roles.revoke_calls(), 1);
        assert!(h.roles.has_role(&identity(1)));
        assert!(!h.roles.has_role(&identity(2)));

        let record = h.store.get_by_identity(&identity(2)).unwrap().unwrap();
        assert!(record.wallet.is_none());
    }

    #[tokio::test]
    async fn second_run_with_unchanged_state_is_idempotent() {
        let h = harness();
        seed_verified(&h.store, &identity(1), &wallet('a'));
        seed_verified(&h.store, &identity(2), &wallet('b'));
        h.oracle.set_balance(&wallet('a'), 3);

        h.reconciler.run_once().await.unwrap();
        let second = h.reconciler.run_once().await.unwrap();

        // The revoked identity dropped out of the verified set, so the
        // second run performs zero additional revokes.
        assert_eq!(
            second,
            ReconcileReport {
                reaffirmed: 1,
                revoked: 0,
                errored: 0
            }
        );
        assert_eq!(h.roles.revoke_calls(), 1);
    }

    #[tokio::test]
    async fn per_identity_failure_does_not_abort_batch() {
        let h = harness();
        seed_verified(&h.store, &identity(1), &wallet('a'));
        seed_verified(&h.store, &identity(2), &wallet('b'));
        seed_verified(&h.store, &identity(3), &wallet('c'));
        h.oracle.fail_for(&wallet('a'));
        h.oracle.set_balance(&wallet('b'), 1);
        h.oracle.set_balance(&wallet('c'), 1);

        let report = h.reconciler.run_once().await.unwrap();
        assert_eq!(
            report,
            ReconcileReport {
                reaffirmed: 2,
                revoked: 0,
                errored: 1
            }
        );

        // The failed identity keeps its binding for the next pass.
        let record = h.store.get_by_identity(&identity(1)).unwrap().unwrap();
        assert!(record.is_verified());
    }

    #[tokio::test]
    async fn role_error_counts_as_errored_and_preserves_binding() {
        let h = harness();
        seed_verified(&h.store, &identity(1), &wallet('a'));
        h.roles.fail_all(true);
        // Zero balance: the revoke path runs and its role call fails.

        let report = h.reconciler.run_once().await.unwrap();
        assert_eq!(report.errored, 1);
        assert_eq!(report.revoked, 0);

        // clear_wallet was never reached; the next pass retries.
        let record = h.store.get_by_identity(&identity(1)).unwrap().unwrap();
        assert!(record.is_verified());
    }

    #[tokio::test]
    async fn empty_batch_reports_zeroes() {
        let h = harness();
        let report = h.reconciler.run_once().await.unwrap();
        assert_eq!(report, ReconcileReport::default());
        assert_eq!(h.oracle.call_count(), 0);
    }

    #[tokio::test]
    async fn reaffirmation_uses_idempotent_grant() {
        let h = harness();
        seed_verified(&h.store, &identity(1), &wallet('a'));
        h.oracle.set_balance(&wallet('a'), 1);
        h.roles.grant(&identity(1)).await.unwrap();

        let report = h.reconciler.run_once().await.unwrap();
        assert_eq!(report.reaffirmed, 1);
        // Still granted, no flapping.
        assert!(h.roles.has_role(&identity(1)));
    }

    #[tokio::test]
    async fn pending_wallets_lists_batch_order() {
        let h = harness();
        seed_verified(&h.store, &identity(2), &wallet('b'));
        seed_verified(&h.store, &identity(1), &wallet('a'));

        let wallets = h.reconciler.pending_wallets().unwrap();
        assert_eq!(wallets, vec![wallet('a'), wallet('b')]);
    }
}
