//! Signer-address recovery from EIP-191 personal-message signatures.

use crate::error::SignatureError;
use holdgate_types::WalletAddress;
use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};
use sha3::{Digest, Keccak256};

/// Keccak-256 of arbitrary bytes.
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// The digest a wallet actually signs for a personal message: the message is
/// wrapped in the `"\x19Ethereum Signed Message:\n" + len` envelope before
/// hashing (EIP-191), so a challenge signature can never double as a
/// transaction signature.
fn personal_message_digest(message: &str) -> [u8; 32] {
    let mut data = Vec::with_capacity(message.len() + 32);
    data.extend_from_slice(b"\x19Ethereum Signed Message:\n");
    data.extend_from_slice(message.len().to_string().as_bytes());
    data.extend_from_slice(message.as_bytes());
    keccak256(&data)
}

/// Recover the signer address from a personal-message signature.
///
/// `signature_hex` is the standard 65-byte `r ‖ s ‖ v` encoding, hex with or
/// without a `0x` prefix; `v` may be 0/1 or the legacy 27/28.
///
/// Fails with [`SignatureError`] when the signature is malformed or does not
/// decode to a valid public key. A *wrong* (but well-formed) signature
/// succeeds here and simply recovers a different address; comparing against
/// the claimed address is the caller's job.
pub fn recover_signer(message: &str, signature_hex: &str) -> Result<WalletAddress, SignatureError> {
    let raw = signature_hex
        .strip_prefix("0x")
        .unwrap_or(signature_hex);
    let bytes = hex::decode(raw).map_err(|e| SignatureError::InvalidHex(e.to_string()))?;

    if bytes.len() != 65 {
        return Err(SignatureError::WrongLength(bytes.len()));
    }

    let signature = Signature::from_slice(&bytes[..64])
        .map_err(|e| SignatureError::RecoveryFailed(e.to_string()))?;

    let v = bytes[64];
    let recovery_byte = if v >= 27 { v - 27 } else { v };
    let recovery_id =
        RecoveryId::from_byte(recovery_byte).ok_or(SignatureError::InvalidRecoveryId(v))?;

    let digest = personal_message_digest(message);
    let key = VerifyingKey::recover_from_prehash(&digest, &signature, recovery_id)
        .map_err(|e| SignatureError::RecoveryFailed(e.to_string()))?;

    Ok(address_of(&key))
}

/// Derive the ledger address of a public key: the last 20 bytes of the
/// Keccak-256 hash of the uncompressed point (SEC1 tag byte stripped).
fn address_of(key: &VerifyingKey) -> WalletAddress {
    let point = key.to_encoded_point(false);
    let hash = keccak256(&point.as_bytes()[1..]);
    let mut addr = [0u8; 20];
    addr.copy_from_slice(&hash[12..]);
    WalletAddress::from_bytes(&addr)
}
