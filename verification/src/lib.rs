//! Verification lifecycle engine.
//!
//! Orchestrates the issue → prove → grant transition and its inverse:
//! 1. **Issue**: mint a single-use, time-boxed proof token for an identity.
//! 2. **Prove**: check the token, recover the signer from the signed
//!    challenge, compare against the claimed address, query the ownership
//!    oracle.
//! 3. **Grant**: bind the wallet in the store, then grant the external role.
//!
//! Every failing step aborts without mutating state, so a transient oracle
//! failure never burns the user's token. The one tolerated cross-system
//! inconsistency (store-verified but role not yet granted) is surfaced as
//! a distinct error rather than hidden.

pub mod engine;
pub mod error;
pub mod issuer;
pub mod lifecycle;

pub use engine::{LinkStatus, ProofOutcome, TokenCheck, VerificationEngine};
pub use error::VerificationError;
pub use issuer::{IssuedToken, TokenIssuer};
pub use lifecycle::{link_state, LinkState};
