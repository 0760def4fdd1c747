//! Routes platform events into the verification engine.

use std::sync::Arc;

use holdgate_oracle::OwnershipOracle;
use holdgate_roles::RoleBinding;
use holdgate_store::VerificationStore;
use holdgate_types::{IdentityId, Timestamp};
use holdgate_verification::{VerificationEngine, VerificationError};
use tracing::info;

use crate::error::GatewayError;
use crate::events::{GatewayEvent, GatewayReply, ReplyAction};

/// The verification slash command.
const VERIFY_COMMAND: &str = "verify";

/// Action id for removing a bound wallet.
const REMOVE_WALLET_ACTION: &str = "remove_wallet";

/// Handles commands and actions against the engine.
///
/// Holds an explicit engine handle constructed at startup; event handlers
/// reach no global state.
pub struct CommandRouter<S, O, R> {
    engine: Arc<VerificationEngine<S, O, R>>,
    /// Public base URL the verification link points at.
    base_url: String,
}

impl<S, O, R> CommandRouter<S, O, R>
where
    S: VerificationStore,
    O: OwnershipOracle,
    R: RoleBinding,
{
    pub fn new(engine: Arc<VerificationEngine<S, O, R>>, base_url: impl Into<String>) -> Self {
        Self {
            engine,
            base_url: base_url.into(),
        }
    }

    /// Handle one inbound event and produce the reply to send back.
    pub async fn handle_event(
        &self,
        event: GatewayEvent,
        now: Timestamp,
    ) -> Result<GatewayReply, GatewayError> {
        match event {
            GatewayEvent::CommandInvoked { identity, command } => {
                if command != VERIFY_COMMAND {
                    return Err(GatewayError::UnknownCommand(command));
                }
                self.handle_verify_command(&identity, now)
            }
            GatewayEvent::ActionInvoked { identity, action } => {
                if action != REMOVE_WALLET_ACTION {
                    return Err(GatewayError::UnknownAction(action));
                }
                self.handle_remove_wallet(&identity).await
            }
        }
    }

    /// The `/verify` command: always issues a fresh token so the user can
    /// verify, or re-verify with a different wallet. An existing binding is
    /// mentioned (and made removable) but not touched; it stands until the
    /// new proof succeeds.
    fn handle_verify_command(
        &self,
        identity: &IdentityId,
        now: Timestamp,
    ) -> Result<GatewayReply, GatewayError> {
        let status = self.engine.status(identity, now)?;
        let issued = self.engine.issue_token(identity, now)?;
        let minutes = self.engine.params().token_ttl_secs / 60;
        let url = format!("{}/verify?token={}", self.base_url, issued.token);

        info!(%identity, "verification link issued");

        if let Some(wallet) = status.wallet {
            Ok(GatewayReply {
                content: format!(
                    "You're already verified with wallet `{}`.\n\n\
                     To re-verify with a different wallet, open this link:\n{url}\n\n\
                     The link expires in {minutes} minutes.",
                    wallet.short()
                ),
                actions: vec![ReplyAction {
                    id: REMOVE_WALLET_ACTION.to_string(),
                    label: "Remove wallet".to_string(),
                }],
            })
        } else {
            Ok(GatewayReply::text(format!(
                "**Holder verification**\n\n\
                 Open this link to prove wallet ownership:\n{url}\n\n\
                 The link expires in {minutes} minutes. After signing the \
                 challenge you'll receive the holder role if the wallet holds \
                 the asset."
            )))
        }
    }

    /// The remove-wallet action: `Verified → Unlinked`, reporting the new
    /// state back to the user.
    async fn handle_remove_wallet(
        &self,
        identity: &IdentityId,
    ) -> Result<GatewayReply, GatewayError> {
        match self.engine.remove_wallet(identity).await {
            Ok(()) => Ok(GatewayReply::text(
                "Your wallet has been unlinked and the holder role removed.",
            )),
            Err(VerificationError::NotVerified(_)) => Ok(GatewayReply::text(
                "You don't have a verified wallet to remove.",
            )),
            Err(VerificationError::RoleRevokeFailed(_)) => Ok(GatewayReply::text(
                "Your wallet has been unlinked, but removing the role failed. \
                 Please contact an admin.",
            )),
            Err(e) => Err(e.into()),
        }
    }
}
