//! Proof-token generation.

use holdgate_types::ProofToken;
use rand::rngs::OsRng;
use rand::RngCore;

/// Number of random bytes in a proof token (hex-encoded on the wire).
const TOKEN_BYTES: usize = 32;

/// Generate a fresh proof token from the OS entropy source.
///
/// 256 bits of randomness makes collisions and guessing equally untenable,
/// so uniqueness needs no coordination with the store.
pub fn generate_token() -> ProofToken {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    ProofToken::new(hex::encode(bytes))
}
