//! Ledger wallet address, stored lowercase-normalized.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AddressParseError {
    #[error("address must start with 0x")]
    MissingPrefix,

    #[error("address must be 20 bytes (40 hex characters), got {0}")]
    WrongLength(usize),

    #[error("address contains non-hex characters")]
    InvalidHex,
}

/// A 20-byte ledger address, `0x`-prefixed.
///
/// Addresses are normalized to lowercase at construction, so checksummed
/// input and all-lowercase input produce the same value and equality checks
/// are case-insensitive.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WalletAddress(String);

impl WalletAddress {
    /// Parse an address string, accepting any letter casing.
    pub fn parse(raw: &str) -> Result<Self, AddressParseError> {
        let hex_part = raw
            .strip_prefix("0x")
            .or_else(|| raw.strip_prefix("0X"))
            .ok_or(AddressParseError::MissingPrefix)?;

        if hex_part.len() != 40 {
            return Err(AddressParseError::WrongLength(hex_part.len() / 2));
        }
        if !hex_part.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(AddressParseError::InvalidHex);
        }

        Ok(Self(format!("0x{}", hex_part.to_ascii_lowercase())))
    }

    /// Build an address from raw bytes.
    pub fn from_bytes(bytes: &[u8; 20]) -> Self {
        Self(format!("0x{}", hex::encode(bytes)))
    }

    /// Return the normalized address string (`0x` + 40 lowercase hex chars).
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The raw 20 address bytes.
    pub fn to_bytes(&self) -> [u8; 20] {
        let mut out = [0u8; 20];
        // Infallible: the constructor validated exactly 40 hex chars.
        let decoded = hex::decode(&self.0[2..]).expect("address is valid hex");
        out.copy_from_slice(&decoded);
        out
    }

    /// Truncated display form for user-facing messages: `0xabcd...1234`.
    pub fn short(&self) -> String {
        format!("{}...{}", &self.0[..6], &self.0[self.0.len() - 4..])
    }
}

impl fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
