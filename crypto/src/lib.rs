//! Cryptographic building blocks for wallet ownership proofs.
//!
//! Three concerns live here:
//! - the challenge message template a wallet must sign,
//! - recovery of the signer address from an EIP-191 personal-message
//!   signature (secp256k1 + Keccak-256),
//! - generation of the random proof tokens embedded in challenges.
//!
//! Whether the recovered address matches the *claimed* one is the engine's
//! decision, not this crate's: a malformed signature and a mismatched
//! claim are different failures.

pub mod challenge;
pub mod error;
pub mod recover;
pub mod token;

pub use challenge::challenge_message;
pub use error::SignatureError;
pub use recover::{keccak256, recover_signer};
pub use token::generate_token;
