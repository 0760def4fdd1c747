//! Asset ownership oracle.
//!
//! Wraps a read-only `balanceOf` call against the asset contract on an
//! external ledger. The ledger is treated as unreliable: transport failures,
//! RPC errors, and malformed responses all surface as [`OracleError`], never
//! as a zero balance. A zero balance is a legitimate business outcome
//! ("not a holder"); an oracle error is not.
//!
//! There is no caching: every call reflects on-chain state at call time.

pub mod client;
pub mod error;

pub use client::JsonRpcOracle;
pub use error::OracleError;

use async_trait::async_trait;
use holdgate_types::WalletAddress;
use std::sync::Arc;

/// Read-only view of current asset holdings for an address.
#[async_trait]
pub trait OwnershipOracle: Send + Sync {
    /// Number of asset units held by `address` right now.
    async fn balance_of(&self, address: &WalletAddress) -> Result<u64, OracleError>;
}

#[async_trait]
impl<T: OwnershipOracle + ?Sized> OwnershipOracle for Arc<T> {
    async fn balance_of(&self, address: &WalletAddress) -> Result<u64, OracleError> {
        (**self).balance_of(address).await
    }
}
