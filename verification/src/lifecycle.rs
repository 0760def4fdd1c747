//! Observed lifecycle states of a verification record.

use holdgate_store::VerificationRecord;
use holdgate_types::Timestamp;

/// The state of an identity's verification as observed at a point in time.
///
/// `Expired` is an observed condition, not a stored one: the record still
/// carries the token, but every read checks the expiry. From `Expired` the
/// only way forward is re-issuance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LinkState {
    /// No wallet bound and no usable token.
    Unlinked,
    /// An unexpired proof token is outstanding.
    TokenIssued,
    /// A token is stored but past its expiry.
    Expired,
    /// A wallet is bound. Takes precedence over any outstanding token from
    /// a re-verification request; the existing binding stands until the
    /// new proof succeeds.
    Verified,
}

/// Compute the observed state of a record at `now`.
pub fn link_state(record: &VerificationRecord, now: Timestamp) -> LinkState {
    if record.is_verified() {
        LinkState::Verified
    } else if record.has_valid_token(now) {
        LinkState::TokenIssued
    } else if record.token_expired(now) {
        LinkState::Expired
    } else {
        LinkState::Unlinked
    }
}
