//! Chat-platform event handling.
//!
//! The platform adapter (whatever speaks the platform's gateway protocol)
//! delivers typed events (a slash command or an action button press) and
//! sends back the [`GatewayReply`] this crate produces. Ordering across
//! distinct identities is neither guaranteed nor required; per-identity
//! atomicity comes from the store's upsert semantics.

pub mod error;
pub mod events;
pub mod router;

pub use error::GatewayError;
pub use events::{GatewayEvent, GatewayReply, ReplyAction};
pub use router::CommandRouter;
