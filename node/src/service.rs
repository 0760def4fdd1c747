//! The assembled service.

use std::sync::Arc;
use std::time::Duration;

use holdgate_gateway::CommandRouter;
use holdgate_oracle::JsonRpcOracle;
use holdgate_roles::RestRoleClient;
use holdgate_scheduler::{DailySchedule, Reconciler};
use holdgate_store_lmdb::LmdbVerificationStore;
use holdgate_types::WalletAddress;
use holdgate_verification::VerificationEngine;
use tracing::info;

use crate::config::ServiceConfig;
use crate::error::NodeError;
use crate::shutdown::Shutdown;

/// The production engine type: LMDB store, JSON-RPC oracle, REST role
/// client, all behind shared handles.
pub type AppEngine =
    VerificationEngine<LmdbVerificationStore, Arc<JsonRpcOracle>, Arc<RestRoleClient>>;

/// The fully wired service.
pub struct Service {
    config: ServiceConfig,
    engine: Arc<AppEngine>,
    reconciler: Reconciler<LmdbVerificationStore, Arc<JsonRpcOracle>, Arc<RestRoleClient>>,
    router: CommandRouter<LmdbVerificationStore, Arc<JsonRpcOracle>, Arc<RestRoleClient>>,
    shutdown: Shutdown,
}

impl Service {
    /// Build the object graph from config plus the platform credential.
    ///
    /// The oracle and role clients are constructed exactly once here and
    /// shared by the request path and the scheduler; nothing holds a
    /// process-global client.
    pub fn new(config: ServiceConfig, platform_token: &str) -> Result<Self, NodeError> {
        let contract = WalletAddress::parse(&config.contract_address)
            .map_err(|e| NodeError::Config(format!("contract_address: {e}")))?;
        if config.reconcile_hour_utc > 23 {
            return Err(NodeError::Config(format!(
                "reconcile_hour_utc must be 0-23, got {}",
                config.reconcile_hour_utc
            )));
        }

        let store = Arc::new(LmdbVerificationStore::open(&config.data_dir)?);
        info!(data_dir = %config.data_dir.display(), "record store opened");

        let oracle = Arc::new(JsonRpcOracle::new(config.rpc_url.clone(), contract));
        let roles = Arc::new(RestRoleClient::new(
            config.platform_api_url.clone(),
            platform_token,
            config.space_id.clone(),
            config.role_id.clone(),
        ));

        let engine = Arc::new(VerificationEngine::new(
            store.clone(),
            oracle.clone(),
            roles.clone(),
            config.verification_params(),
        ));

        let reconciler = Reconciler::new(
            store,
            oracle,
            roles,
            Duration::from_millis(config.reconcile_delay_ms),
        );

        let router = CommandRouter::new(engine.clone(), config.base_url.clone());

        Ok(Self {
            config,
            engine,
            reconciler,
            router,
            shutdown: Shutdown::new(),
        })
    }

    /// The command router for the platform adapter to feed events into.
    pub fn command_router(
        &self,
    ) -> &CommandRouter<LmdbVerificationStore, Arc<JsonRpcOracle>, Arc<RestRoleClient>> {
        &self.router
    }

    /// Run until SIGINT/SIGTERM: HTTP API plus the daily reconciliation
    /// loop, both torn down through the shared shutdown signal.
    pub async fn run(self) -> Result<(), NodeError> {
        let schedule = DailySchedule::at_hour(self.config.reconcile_hour_utc);
        let scheduler_rx = self.shutdown.subscribe();
        let reconciler = self.reconciler;
        let scheduler_task = tokio::spawn(async move {
            schedule.run(reconciler, scheduler_rx).await;
        });

        let rpc = holdgate_rpc::RpcServer::new(self.config.http_port, self.engine.clone());
        let server_rx = self.shutdown.subscribe();
        let server_task = tokio::spawn(async move { rpc.start(server_rx).await });

        self.shutdown.listen_for_signals().await;

        let _ = scheduler_task.await;
        match server_task.await {
            Ok(result) => result?,
            Err(e) => return Err(NodeError::Server(format!("server task panicked: {e}"))),
        }

        info!("service stopped cleanly");
        Ok(())
    }

    /// Trigger a reconciliation pass outside the daily schedule.
    pub async fn reconcile_now(&self) -> Result<holdgate_scheduler::ReconcileReport, NodeError> {
        self.reconciler
            .run_once()
            .await
            .map_err(|e| NodeError::Store(e.to_string()))
    }
}
