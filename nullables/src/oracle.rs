//! Nullable ownership oracle — scripted balances and failures.

use async_trait::async_trait;
use holdgate_oracle::{OracleError, OwnershipOracle};
use holdgate_types::WalletAddress;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

/// An in-memory oracle for testing.
///
/// Unknown addresses report a balance of zero; addresses marked with
/// [`NullOracle::fail_for`] report an [`OracleError`] instead, which lets
/// tests distinguish "not a holder" from "oracle down" exactly as the engine
/// must.
pub struct NullOracle {
    balances: Mutex<HashMap<String, u64>>,
    failing: Mutex<HashSet<String>>,
    calls: AtomicU32,
}

impl NullOracle {
    pub fn new() -> Self {
        Self {
            balances: Mutex::new(HashMap::new()),
            failing: Mutex::new(HashSet::new()),
            calls: AtomicU32::new(0),
        }
    }

    /// Script the balance reported for an address.
    pub fn set_balance(&self, address: &WalletAddress, balance: u64) {
        self.balances
            .lock()
            .unwrap()
            .insert(address.as_str().to_string(), balance);
    }

    /// Make every query for `address` fail with an oracle error.
    pub fn fail_for(&self, address: &WalletAddress) {
        self.failing
            .lock()
            .unwrap()
            .insert(address.as_str().to_string());
    }

    /// Number of `balance_of` calls made so far.
    pub fn call_count(&self) -> u32 {
        self.calls.load(Ordering::Relaxed)
    }
}

impl Default for NullOracle {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OwnershipOracle for NullOracle {
    async fn balance_of(&self, address: &WalletAddress) -> Result<u64, OracleError> {
        self.calls.fetch_add(1, Ordering::Relaxed);

        if self.failing.lock().unwrap().contains(address.as_str()) {
            return Err(OracleError::Unreachable("scripted failure".into()));
        }
        Ok(self
            .balances
            .lock()
            .unwrap()
            .get(address.as_str())
            .copied()
            .unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(last: char) -> WalletAddress {
        WalletAddress::parse(&format!("0x{}", last.to_string().repeat(40))).unwrap()
    }

    #[tokio::test]
    async fn unknown_address_reports_zero() {
        let oracle = NullOracle::new();
        assert_eq!(oracle.balance_of(&addr('a')).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn scripted_balance_and_failure() {
        let oracle = NullOracle::new();
        oracle.set_balance(&addr('a'), 2);
        oracle.fail_for(&addr('b'));

        assert_eq!(oracle.balance_of(&addr('a')).await.unwrap(), 2);
        assert!(oracle.balance_of(&addr('b')).await.is_err());
        assert_eq!(oracle.call_count(), 2);
    }
}
