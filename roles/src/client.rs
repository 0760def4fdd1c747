//! REST client for the chat platform's membership and role endpoints.

use crate::error::RoleError;
use crate::RoleBinding;

use async_trait::async_trait;
use holdgate_types::IdentityId;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Default timeout for a single platform request.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default connection timeout.
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Role client speaking the platform's REST API.
///
/// The handle is constructed once at startup (credentials included) and
/// passed explicitly to everything that mutates roles. There is no shared
/// global client.
pub struct RestRoleClient {
    /// HTTP client (reusable connection pool).
    http_client: reqwest::Client,
    /// Platform API base URL.
    base_url: String,
    /// Bot credential sent on every request.
    auth_token: String,
    /// The community space the role lives in.
    space_id: String,
    /// The role granted to verified holders.
    role_id: String,
}

/// Member payload from `GET /spaces/{space}/members/{identity}`.
#[derive(Debug, Deserialize)]
struct MemberResponse {
    #[serde(default)]
    roles: Vec<String>,
}

impl RestRoleClient {
    pub fn new(
        base_url: impl Into<String>,
        auth_token: impl Into<String>,
        space_id: impl Into<String>,
        role_id: impl Into<String>,
    ) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            http_client,
            base_url: base_url.into(),
            auth_token: auth_token.into(),
            space_id: space_id.into(),
            role_id: role_id.into(),
        }
    }

    fn member_url(&self, identity: &IdentityId) -> String {
        format!(
            "{}/spaces/{}/members/{}",
            self.base_url.trim_end_matches('/'),
            self.space_id,
            identity
        )
    }

    fn role_url(&self, identity: &IdentityId) -> String {
        format!("{}/roles/{}", self.member_url(identity), self.role_id)
    }

    /// Fetch the member and report whether they currently hold the role.
    async fn has_role(&self, identity: &IdentityId) -> Result<bool, RoleError> {
        let response = self
            .http_client
            .get(self.member_url(identity))
            .header("Authorization", format!("Bot {}", self.auth_token))
            .send()
            .await
            .map_err(map_transport_error)?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(RoleError::NotMember(identity.to_string()));
        }
        if !response.status().is_success() {
            return Err(RoleError::RequestFailed(format!(
                "HTTP status {}",
                response.status()
            )));
        }

        let member: MemberResponse = response.json().await.map_err(|e| {
            RoleError::InvalidResponse(format!("failed to parse member response: {e}"))
        })?;

        Ok(member.roles.iter().any(|r| r == &self.role_id))
    }

    /// Send the role mutation itself (PUT to add, DELETE to remove).
    async fn mutate_role(
        &self,
        identity: &IdentityId,
        method: reqwest::Method,
    ) -> Result<(), RoleError> {
        let response = self
            .http_client
            .request(method, self.role_url(identity))
            .header("Authorization", format!("Bot {}", self.auth_token))
            .send()
            .await
            .map_err(map_transport_error)?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(RoleError::NotMember(identity.to_string()));
        }
        if !response.status().is_success() {
            return Err(RoleError::RequestFailed(format!(
                "HTTP status {}",
                response.status()
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl RoleBinding for RestRoleClient {
    async fn grant(&self, identity: &IdentityId) -> Result<(), RoleError> {
        if self.has_role(identity).await? {
            debug!(%identity, "role already granted");
            return Ok(());
        }
        self.mutate_role(identity, reqwest::Method::PUT).await?;
        debug!(%identity, "role granted");
        Ok(())
    }

    async fn revoke(&self, identity: &IdentityId) -> Result<(), RoleError> {
        if !self.has_role(identity).await? {
            debug!(%identity, "role already absent");
            return Ok(());
        }
        self.mutate_role(identity, reqwest::Method::DELETE).await?;
        debug!(%identity, "role revoked");
        Ok(())
    }
}

fn map_transport_error(e: reqwest::Error) -> RoleError {
    if e.is_timeout() {
        RoleError::Unreachable(format!("request timed out: {e}"))
    } else if e.is_connect() {
        RoleError::Unreachable(format!("connection failed: {e}"))
    } else {
        RoleError::RequestFailed(e.to_string())
    }
}
