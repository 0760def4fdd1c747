//! Role binding against the external chat platform.
//!
//! Grants and revokes the single holder role for an identity in the
//! community space. Both operations are idempotent: granting a role the
//! member already holds, or revoking one they lack, is a no-op success.
//! Membership itself can be missing (the identity left the space); that is
//! a distinct [`RoleError::NotMember`], never silently swallowed.

pub mod client;
pub mod error;

pub use client::RestRoleClient;
pub use error::RoleError;

use async_trait::async_trait;
use holdgate_types::IdentityId;
use std::sync::Arc;

/// Grant/revoke of the holder role for an identity.
#[async_trait]
pub trait RoleBinding: Send + Sync {
    /// Ensure `identity` holds the role. No-op if already granted.
    async fn grant(&self, identity: &IdentityId) -> Result<(), RoleError>;

    /// Ensure `identity` does not hold the role. No-op if not granted.
    async fn revoke(&self, identity: &IdentityId) -> Result<(), RoleError>;
}

#[async_trait]
impl<T: RoleBinding + ?Sized> RoleBinding for Arc<T> {
    async fn grant(&self, identity: &IdentityId) -> Result<(), RoleError> {
        (**self).grant(identity).await
    }

    async fn revoke(&self, identity: &IdentityId) -> Result<(), RoleError> {
        (**self).revoke(identity).await
    }
}
