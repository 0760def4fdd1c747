//! Typed inbound events and outbound replies.

use holdgate_types::IdentityId;
use serde::{Deserialize, Serialize};

/// An inbound event from the chat platform.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum GatewayEvent {
    /// A slash command was invoked by a user.
    CommandInvoked {
        identity: IdentityId,
        command: String,
    },
    /// An action button attached to an earlier reply was pressed.
    ActionInvoked {
        identity: IdentityId,
        action: String,
    },
}

/// A user-visible reply, delivered privately to the invoking user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GatewayReply {
    pub content: String,
    /// Action buttons to attach, if any.
    pub actions: Vec<ReplyAction>,
}

impl GatewayReply {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            actions: Vec::new(),
        }
    }
}

/// One action button on a reply.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReplyAction {
    /// Stable id echoed back in [`GatewayEvent::ActionInvoked`].
    pub id: String,
    /// Button label shown to the user.
    pub label: String,
}
