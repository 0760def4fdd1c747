//! LMDB implementation of `VerificationStore`.
//!
//! Two databases inside one environment:
//! - `records`: identity id → bincode-encoded [`VerificationRecord`]
//! - `token_index`: token value → identity id
//!
//! The index entry for a superseded token is deleted in the same write
//! transaction that stores its replacement, so a stale token can never
//! resolve to a record.

use std::path::Path;

use heed::types::{Bytes, Str};
use heed::{Database, Env, EnvOpenOptions};

use holdgate_store::{StoreError, VerificationRecord, VerificationStore};
use holdgate_types::{IdentityId, ProofToken, Timestamp, WalletAddress};

use crate::LmdbError;

/// Default LMDB map size: 256 MiB, far beyond any realistic record count.
const DEFAULT_MAP_SIZE: usize = 256 * 1024 * 1024;

pub struct LmdbVerificationStore {
    env: Env,
    records_db: Database<Str, Bytes>,
    token_db: Database<Str, Str>,
}

impl LmdbVerificationStore {
    /// Open (or create) the store at `path` with the default map size.
    pub fn open(path: &Path) -> Result<Self, LmdbError> {
        Self::open_with_map_size(path, DEFAULT_MAP_SIZE)
    }

    /// Open (or create) the store at `path` with an explicit map size.
    pub fn open_with_map_size(path: &Path, map_size: usize) -> Result<Self, LmdbError> {
        std::fs::create_dir_all(path).map_err(|e| LmdbError::Io(e.to_string()))?;

        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(map_size)
                .max_dbs(2)
                .open(path)?
        };

        let mut wtxn = env.write_txn()?;
        let records_db: Database<Str, Bytes> = env.create_database(&mut wtxn, Some("records"))?;
        let token_db: Database<Str, Str> = env.create_database(&mut wtxn, Some("token_index"))?;
        wtxn.commit()?;

        Ok(Self {
            env,
            records_db,
            token_db,
        })
    }

    fn encode(record: &VerificationRecord) -> Result<Vec<u8>, LmdbError> {
        bincode::serialize(record).map_err(|e| LmdbError::Serialization(e.to_string()))
    }

    fn decode(bytes: &[u8]) -> Result<VerificationRecord, LmdbError> {
        bincode::deserialize(bytes).map_err(|e| LmdbError::Serialization(e.to_string()))
    }
}

impl VerificationStore for LmdbVerificationStore {
    fn upsert_token(
        &self,
        identity: &IdentityId,
        token: &ProofToken,
        expires_at: Timestamp,
        now: Timestamp,
    ) -> Result<(), StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;

        let mut record = match self
            .records_db
            .get(&wtxn, identity.as_str())
            .map_err(LmdbError::from)?
        {
            Some(bytes) => Self::decode(bytes)?,
            None => VerificationRecord::new(identity.clone(), now),
        };

        // Drop the index entry of the token being overwritten.
        if let Some(old_token) = &record.token {
            self.token_db
                .delete(&mut wtxn, old_token.as_str())
                .map_err(LmdbError::from)?;
        }

        record.token = Some(token.clone());
        record.token_expires_at = Some(expires_at);

        self.records_db
            .put(&mut wtxn, identity.as_str(), &Self::encode(&record)?)
            .map_err(LmdbError::from)?;
        self.token_db
            .put(&mut wtxn, token.as_str(), identity.as_str())
            .map_err(LmdbError::from)?;

        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn get_by_identity(
        &self,
        identity: &IdentityId,
    ) -> Result<Option<VerificationRecord>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        match self
            .records_db
            .get(&rtxn, identity.as_str())
            .map_err(LmdbError::from)?
        {
            Some(bytes) => Ok(Some(Self::decode(bytes)?)),
            None => Ok(None),
        }
    }

    fn get_by_token(&self, token: &ProofToken) -> Result<Option<VerificationRecord>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let Some(identity) = self
            .token_db
            .get(&rtxn, token.as_str())
            .map_err(LmdbError::from)?
        else {
            return Ok(None);
        };
        match self
            .records_db
            .get(&rtxn, identity)
            .map_err(LmdbError::from)?
        {
            Some(bytes) => Ok(Some(Self::decode(bytes)?)),
            None => Err(StoreError::Corruption(format!(
                "token index points at missing record: {identity}"
            ))),
        }
    }

    fn bind_wallet(
        &self,
        identity: &IdentityId,
        wallet: &WalletAddress,
        verified_at: Timestamp,
    ) -> Result<(), StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;

        let bytes = self
            .records_db
            .get(&wtxn, identity.as_str())
            .map_err(LmdbError::from)?
            .ok_or_else(|| StoreError::NotFound(identity.to_string()))?;
        let mut record = Self::decode(bytes)?;

        if let Some(token) = &record.token {
            self.token_db
                .delete(&mut wtxn, token.as_str())
                .map_err(LmdbError::from)?;
        }

        record.wallet = Some(wallet.clone());
        record.verified_at = Some(verified_at);
        record.token = None;
        record.token_expires_at = None;

        self.records_db
            .put(&mut wtxn, identity.as_str(), &Self::encode(&record)?)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn clear_wallet(&self, identity: &IdentityId) -> Result<(), StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;

        let bytes = self
            .records_db
            .get(&wtxn, identity.as_str())
            .map_err(LmdbError::from)?
            .ok_or_else(|| StoreError::NotFound(identity.to_string()))?;
        let mut record = Self::decode(bytes)?;

        record.wallet = None;
        record.verified_at = None;

        self.records_db
            .put(&mut wtxn, identity.as_str(), &Self::encode(&record)?)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn iter_verified(&self) -> Result<Vec<VerificationRecord>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let mut verified = Vec::new();
        for entry in self.records_db.iter(&rtxn).map_err(LmdbError::from)? {
            let (_, bytes) = entry.map_err(LmdbError::from)?;
            let record = Self::decode(bytes)?;
            if record.is_verified() {
                verified.push(record);
            }
        }
        Ok(verified)
    }

    fn record_count(&self) -> Result<u64, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        Ok(self.records_db.len(&rtxn).map_err(LmdbError::from)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn open_store(dir: &TempDir) -> LmdbVerificationStore {
        // Small map size keeps test environments light.
        LmdbVerificationStore::open_with_map_size(dir.path(), 10 * 1024 * 1024).unwrap()
    }

    fn identity(n: u32) -> IdentityId {
        IdentityId::new(format!("user-{n}"))
    }

    fn wallet() -> WalletAddress {
        WalletAddress::parse("0xab5801a7d398351b8be11c439e05c5b3259aec9b").unwrap()
    }

    #[test]
    fn upsert_creates_record_with_created_at() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);

        store
            .upsert_token(
                &identity(1),
                &ProofToken::new("t1"),
                Timestamp::new(1900),
                Timestamp::new(1000),
            )
            .unwrap();

        let record = store.get_by_identity(&identity(1)).unwrap().unwrap();
        assert_eq!(record.created_at, Timestamp::new(1000));
        assert_eq!(record.token, Some(ProofToken::new("t1")));
        assert_eq!(record.token_expires_at, Some(Timestamp::new(1900)));
        assert!(record.wallet.is_none());
    }

    #[test]
    fn reissue_invalidates_previous_token() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);
        let id = identity(1);

        store
            .upsert_token(&id, &ProofToken::new("t1"), Timestamp::new(1900), Timestamp::new(1000))
            .unwrap();
        store
            .upsert_token(&id, &ProofToken::new("t2"), Timestamp::new(2900), Timestamp::new(2000))
            .unwrap();

        // Old token no longer resolves; new one does.
        assert!(store.get_by_token(&ProofToken::new("t1")).unwrap().is_none());
        let record = store.get_by_token(&ProofToken::new("t2")).unwrap().unwrap();
        assert_eq!(record.identity, id);

        // created_at is immutable across re-issues.
        assert_eq!(record.created_at, Timestamp::new(1000));
    }

    #[test]
    fn bind_wallet_clears_token_and_index() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);
        let id = identity(1);

        store
            .upsert_token(&id, &ProofToken::new("t1"), Timestamp::new(1900), Timestamp::new(1000))
            .unwrap();
        store
            .bind_wallet(&id, &wallet(), Timestamp::new(1500))
            .unwrap();

        let record = store.get_by_identity(&id).unwrap().unwrap();
        assert_eq!(record.wallet, Some(wallet()));
        assert_eq!(record.verified_at, Some(Timestamp::new(1500)));
        assert!(record.token.is_none());
        assert!(record.token_expires_at.is_none());

        assert!(store.get_by_token(&ProofToken::new("t1")).unwrap().is_none());
    }

    #[test]
    fn bind_wallet_unknown_identity_errors() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);
        let result = store.bind_wallet(&identity(9), &wallet(), Timestamp::new(1));
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[test]
    fn upsert_preserves_existing_wallet() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);
        let id = identity(1);

        store
            .upsert_token(&id, &ProofToken::new("t1"), Timestamp::new(1900), Timestamp::new(1000))
            .unwrap();
        store
            .bind_wallet(&id, &wallet(), Timestamp::new(1500))
            .unwrap();

        // Re-verification request: new token must not deauthorize.
        store
            .upsert_token(&id, &ProofToken::new("t2"), Timestamp::new(3000), Timestamp::new(2100))
            .unwrap();

        let record = store.get_by_identity(&id).unwrap().unwrap();
        assert_eq!(record.wallet, Some(wallet()));
        assert_eq!(record.token, Some(ProofToken::new("t2")));
    }

    #[test]
    fn clear_wallet_keeps_record() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);
        let id = identity(1);

        store
            .upsert_token(&id, &ProofToken::new("t1"), Timestamp::new(1900), Timestamp::new(1000))
            .unwrap();
        store
            .bind_wallet(&id, &wallet(), Timestamp::new(1500))
            .unwrap();
        store.clear_wallet(&id).unwrap();

        let record = store.get_by_identity(&id).unwrap().unwrap();
        assert!(record.wallet.is_none());
        assert!(record.verified_at.is_none());
        assert_eq!(record.created_at, Timestamp::new(1000));
        assert_eq!(store.record_count().unwrap(), 1);
    }

    #[test]
    fn iter_verified_filters_unverified() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);

        for n in 1..=3 {
            store
                .upsert_token(
                    &identity(n),
                    &ProofToken::new(format!("t{n}")),
                    Timestamp::new(1900),
                    Timestamp::new(1000),
                )
                .unwrap();
        }
        store
            .bind_wallet(&identity(2), &wallet(), Timestamp::new(1500))
            .unwrap();

        let verified = store.iter_verified().unwrap();
        assert_eq!(verified.len(), 1);
        assert_eq!(verified[0].identity, identity(2));
    }

    #[test]
    fn records_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let id = identity(1);

        {
            let store = open_store(&dir);
            store
                .upsert_token(&id, &ProofToken::new("t1"), Timestamp::new(1900), Timestamp::new(1000))
                .unwrap();
            store
                .bind_wallet(&id, &wallet(), Timestamp::new(1500))
                .unwrap();
        }

        let store = open_store(&dir);
        let record = store.get_by_identity(&id).unwrap().unwrap();
        assert_eq!(record.wallet, Some(wallet()));
        assert_eq!(record.verified_at, Some(Timestamp::new(1500)));
    }
}
