//! Nullable store — thread-safe in-memory verification records for testing.

use holdgate_store::{StoreError, VerificationRecord, VerificationStore};
use holdgate_types::{IdentityId, ProofToken, Timestamp, WalletAddress};
use std::collections::HashMap;
use std::sync::Mutex;

/// An in-memory record store for testing.
///
/// The whole map sits behind one mutex, so each trait operation is atomic,
/// the same guarantee the LMDB backend gets from write transactions.
pub struct NullStore {
    records: Mutex<HashMap<String, VerificationRecord>>,
    token_index: Mutex<HashMap<String, String>>,
}

impl NullStore {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
            token_index: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for NullStore {
    fn default() -> Self {
        Self::new()
    }
}

impl VerificationStore for NullStore {
    fn upsert_token(
        &self,
        identity: &IdentityId,
        token: &ProofToken,
        expires_at: Timestamp,
        now: Timestamp,
    ) -> Result<(), StoreError> {
        let mut records = self.records.lock().unwrap();
        let mut index = self.token_index.lock().unwrap();

        let record = records
            .entry(identity.as_str().to_string())
            .or_insert_with(|| VerificationRecord::new(identity.clone(), now));

        if let Some(old_token) = &record.token {
            index.remove(old_token.as_str());
        }

        record.token = Some(token.clone());
        record.token_expires_at = Some(expires_at);
        index.insert(token.as_str().to_string(), identity.as_str().to_string());
        Ok(())
    }

    fn get_by_identity(
        &self,
        identity: &IdentityId,
    ) -> Result<Option<VerificationRecord>, StoreError> {
        Ok(self.records.lock().unwrap().get(identity.as_str()).cloned())
    }

    fn get_by_token(&self, token: &ProofToken) -> Result<Option<VerificationRecord>, StoreError> {
        let index = self.token_index.lock().unwrap();
        let Some(identity) = index.get(token.as_str()) else {
            return Ok(None);
        };
        Ok(self.records.lock().unwrap().get(identity).cloned())
    }

    fn bind_wallet(
        &self,
        identity: &IdentityId,
        wallet: &WalletAddress,
        verified_at: Timestamp,
    ) -> Result<(), StoreError> {
        let mut records = self.records.lock().unwrap();
        let record = records
            .get_mut(identity.as_str())
            .ok_or_else(|| StoreError::NotFound(identity.to_string()))?;

        if let Some(token) = &record.token {
            self.token_index.lock().unwrap().remove(token.as_str());
        }

        record.wallet = Some(wallet.clone());
        record.verified_at = Some(verified_at);
        record.token = None;
        record.token_expires_at = None;
        Ok(())
    }

    fn clear_wallet(&self, identity: &IdentityId) -> Result<(), StoreError> {
        let mut records = self.records.lock().unwrap();
        let record = records
            .get_mut(identity.as_str())
            .ok_or_else(|| StoreError::NotFound(identity.to_string()))?;
        record.wallet = None;
        record.verified_at = None;
        Ok(())
    }

    fn iter_verified(&self) -> Result<Vec<VerificationRecord>, StoreError> {
        let mut verified: Vec<VerificationRecord> = self
            .records
            .lock()
            .unwrap()
            .values()
            .filter(|r| r.is_verified())
            .cloned()
            .collect();
        // Deterministic order for tests.
        verified.sort_by(|a, b| a.identity.cmp(&b.identity));
        Ok(verified)
    }

    fn record_count(&self) -> Result<u64, StoreError> {
        Ok(self.records.lock().unwrap().len() as u64)
    }
}
