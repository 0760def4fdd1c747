//! Axum-based HTTP server for the verification API.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use tokio::sync::broadcast;
use tower_http::cors::CorsLayer;
use tracing::info;

use holdgate_oracle::OwnershipOracle;
use holdgate_roles::RoleBinding;
use holdgate_store::VerificationStore;
use holdgate_types::{IdentityId, ProofToken, Timestamp, WalletAddress};
use holdgate_verification::{VerificationEngine, VerificationError};

use crate::error::{error_response, ServerError};
use crate::handlers::{
    CheckTokenQuery, CheckTokenResponse, HealthResponse, StatusResponse, VerifyRequest,
    VerifyResponse,
};

/// The HTTP server, parameterized over the engine's seams like the engine
/// itself.
pub struct RpcServer<S, O, R> {
    port: u16,
    engine: Arc<VerificationEngine<S, O, R>>,
}

impl<S, O, R> RpcServer<S, O, R>
where
    S: VerificationStore + 'static,
    O: OwnershipOracle + 'static,
    R: RoleBinding + 'static,
{
    pub fn new(port: u16, engine: Arc<VerificationEngine<S, O, R>>) -> Self {
        Self { port, engine }
    }

    /// Build the router. Exposed separately from [`start`] so tests can
    /// drive it without binding a socket.
    ///
    /// [`start`]: RpcServer::start
    pub fn router(&self) -> Router {
        Router::new()
            .route("/api/check-token", get(check_token::<S, O, R>))
            .route("/api/verify", post(verify::<S, O, R>))
            .route("/api/status/:identity", get(status::<S, O, R>))
            .route("/health", get(health))
            .layer(CorsLayer::permissive())
            .with_state(self.engine.clone())
    }

    /// Serve until the shutdown signal fires.
    pub async fn start(&self, mut shutdown: broadcast::Receiver<()>) -> Result<(), ServerError> {
        let addr = format!("0.0.0.0:{}", self.port);
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| ServerError::Bind {
                addr: addr.clone(),
                source: e,
            })?;
        info!("HTTP API listening on {addr}");

        axum::serve(listener, self.router())
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await
            .map_err(|e| ServerError::Serve(e.to_string()))
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────

async fn check_token<S, O, R>(
    State(engine): State<Arc<VerificationEngine<S, O, R>>>,
    Query(query): Query<CheckTokenQuery>,
) -> Response
where
    S: VerificationStore,
    O: OwnershipOracle,
    R: RoleBinding,
{
    let Some(token) = query.token else {
        return reject(&VerificationError::MissingInput("token"));
    };

    match engine.check_token(&ProofToken::new(token), Timestamp::now()) {
        Ok(check) => Json(CheckTokenResponse {
            valid: true,
            already_verified: check.already_verified,
            wallet: check.wallet.map(|w| w.short()),
        })
        .into_response(),
        Err(e) => reject(&e),
    }
}

async fn verify<S, O, R>(
    State(engine): State<Arc<VerificationEngine<S, O, R>>>,
    Json(request): Json<VerifyRequest>,
) -> Response
where
    S: VerificationStore,
    O: OwnershipOracle,
    R: RoleBinding,
{
    let Some(token) = request.token else {
        return reject(&VerificationError::MissingInput("token"));
    };
    let Some(address) = request.address else {
        return reject(&VerificationError::MissingInput("address"));
    };
    let Some(signature) = request.signature else {
        return reject(&VerificationError::MissingInput("signature"));
    };

    // A malformed claimed address can never match a recovered one.
    let Ok(claimed) = WalletAddress::parse(&address) else {
        return reject(&VerificationError::AddressMismatch);
    };

    match engine
        .submit_proof(&ProofToken::new(token), &claimed, &signature, Timestamp::now())
        .await
    {
        Ok(outcome) => Json(VerifyResponse {
            success: true,
            message: "Verification successful! The holder role has been granted.".into(),
            balance: outcome.balance,
            wallet: outcome.wallet.to_string(),
        })
        .into_response(),
        Err(e) => reject(&e),
    }
}

async fn status<S, O, R>(
    State(engine): State<Arc<VerificationEngine<S, O, R>>>,
    Path(identity): Path<String>,
) -> Response
where
    S: VerificationStore,
    O: OwnershipOracle,
    R: RoleBinding,
{
    match engine.status(&IdentityId::new(identity), Timestamp::now()) {
        Ok(status) => Json(StatusResponse {
            verified: status.verified,
            wallet: status.wallet.map(|w| w.short()),
            verified_at: status.verified_at.map(|t| t.as_secs()),
        })
        .into_response(),
        Err(e) => reject(&e),
    }
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        timestamp: Timestamp::now().as_secs(),
    })
}

fn reject(err: &VerificationError) -> Response {
    let (status, body) = error_response(err);
    (status, Json(body)).into_response()
}
