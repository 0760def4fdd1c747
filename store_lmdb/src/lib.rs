//! LMDB storage backend for verification records.
//!
//! Implements [`holdgate_store::VerificationStore`] using the `heed` LMDB
//! bindings: a records database keyed by identity id, plus a token index
//! database for O(1) token lookup. Every mutation that touches both runs in
//! a single write transaction, which is what makes the trait's upserts
//! atomic without in-process locking.

pub mod error;
pub mod verification;

pub use error::LmdbError;
pub use verification::LmdbVerificationStore;
