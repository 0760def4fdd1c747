use thiserror::Error;

#[derive(Debug, Error)]
pub enum RoleError {
    #[error("identity {0} is not a member of the space")]
    NotMember(String),

    #[error("platform API unreachable: {0}")]
    Unreachable(String),

    #[error("platform API request failed: {0}")]
    RequestFailed(String),

    #[error("invalid response from platform API: {0}")]
    InvalidResponse(String),
}
