//! The challenge message a wallet signs to prove control.

use holdgate_types::ProofToken;

/// Build the two-line challenge message for a proof token.
///
/// The template is part of the wire contract and must stay byte-exact:
/// front-end signers reproduce it independently, and any drift breaks
/// signature verification for every client. Binding both the domain phrase
/// and the token value into the signed payload prevents replaying a
/// signature against a different token or a different deployment.
pub fn challenge_message(domain: &str, token: &ProofToken) -> String {
    format!("Verify ownership for {domain}\nToken: {token}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_is_byte_exact() {
        let token = ProofToken::new("abc123");
        assert_eq!(
            challenge_message("holdgate", &token),
            "Verify ownership for holdgate\nToken: abc123"
        );
    }

    #[test]
    fn different_tokens_produce_different_messages() {
        let a = challenge_message("holdgate", &ProofToken::new("t1"));
        let b = challenge_message("holdgate", &ProofToken::new("t2"));
        assert_ne!(a, b);
    }

    #[test]
    fn different_domains_produce_different_messages() {
        let token = ProofToken::new("t1");
        let a = challenge_message("alpha", &token);
        let b = challenge_message("beta", &token);
        assert_ne!(a, b);
    }
}
