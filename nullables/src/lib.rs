//! Nullable infrastructure for deterministic testing.
//!
//! In-memory stand-ins for every external dependency of the verification
//! engine: the clock, the record store, the ownership oracle, and the role
//! API. Each is thread-safe and scriptable (balances, failures, call
//! counts), so engine and scheduler behavior can be pinned down without a
//! database, a ledger, or a chat platform.

pub mod clock;
pub mod oracle;
pub mod roles;
pub mod store;

pub use clock::NullClock;
pub use oracle::NullOracle;
pub use roles::NullRoles;
pub use store::NullStore;
