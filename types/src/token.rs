//! Opaque single-use proof token.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A proof token binding one verification attempt to one challenge message.
///
/// Tokens are opaque random strings generated by `holdgate-crypto`; this type
/// only carries the value. A token is single-use and time-boxed: validity is
/// always checked against the stored expiry, never mere presence.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProofToken(String);

impl ProofToken {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProofToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ProofToken {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}
