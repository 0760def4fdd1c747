//! Fundamental types for the holdgate verification service.
//!
//! This crate defines the core types shared across every other crate in the
//! workspace: identity ids, wallet addresses, proof tokens, timestamps, and
//! the tunable verification parameters.

pub mod address;
pub mod identity;
pub mod params;
pub mod time;
pub mod token;

pub use address::{AddressParseError, WalletAddress};
pub use identity::IdentityId;
pub use params::VerificationParams;
pub use time::Timestamp;
pub use token::ProofToken;
