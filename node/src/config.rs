//! Service configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use holdgate_types::VerificationParams;

use crate::NodeError;

/// Configuration for the holdgate service.
///
/// Can be loaded from a TOML file via [`ServiceConfig::from_toml_file`] or
/// built programmatically (e.g. for tests). The platform credential is not
/// part of the config file; it comes from the environment.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Port the HTTP API listens on.
    #[serde(default = "default_http_port")]
    pub http_port: u16,

    /// Data directory for the verification record store.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// JSON-RPC endpoint of the external ledger.
    #[serde(default = "default_rpc_url")]
    pub rpc_url: String,

    /// Address of the asset contract checked for holdings.
    #[serde(default)]
    pub contract_address: String,

    /// Base URL of the chat platform's REST API.
    #[serde(default = "default_platform_api_url")]
    pub platform_api_url: String,

    /// The community space the holder role lives in.
    #[serde(default)]
    pub space_id: String,

    /// The role granted to verified holders.
    #[serde(default)]
    pub role_id: String,

    /// Public base URL embedded in verification links.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Domain phrase bound into the challenge message.
    #[serde(default = "default_challenge_domain")]
    pub challenge_domain: String,

    /// Seconds a proof token stays valid.
    #[serde(default = "default_token_ttl_secs")]
    pub token_ttl_secs: u64,

    /// Hour of day (UTC) for the daily reconciliation run.
    #[serde(default)]
    pub reconcile_hour_utc: u8,

    /// Delay between oracle calls in a reconciliation batch (ms).
    #[serde(default = "default_reconcile_delay_ms")]
    pub reconcile_delay_ms: u64,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_http_port() -> u16 {
    3000
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./holdgate_data")
}

fn default_rpc_url() -> String {
    "https://rpc.monad-mainnet.example".to_string()
}

fn default_platform_api_url() -> String {
    "https://platform.example/api".to_string()
}

fn default_base_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_challenge_domain() -> String {
    "holdgate".to_string()
}

fn default_token_ttl_secs() -> u64 {
    900
}

fn default_reconcile_delay_ms() -> u64 {
    500
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl ServiceConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &str) -> Result<Self, NodeError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| NodeError::Config(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, NodeError> {
        toml::from_str(s).map_err(|e| NodeError::Config(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> String {
        toml::to_string_pretty(self).expect("ServiceConfig is always serializable to TOML")
    }

    /// The verification parameters carried by this config.
    pub fn verification_params(&self) -> VerificationParams {
        VerificationParams {
            token_ttl_secs: self.token_ttl_secs,
            challenge_domain: self.challenge_domain.clone(),
            reconcile_hour_utc: self.reconcile_hour_utc,
            reconcile_delay_ms: self.reconcile_delay_ms,
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            http_port: default_http_port(),
            data_dir: default_data_dir(),
            rpc_url: default_rpc_url(),
            contract_address: String::new(),
            platform_api_url: default_platform_api_url(),
            space_id: String::new(),
            role_id: String::new(),
            base_url: default_base_url(),
            challenge_domain: default_challenge_domain(),
            token_ttl_secs: default_token_ttl_secs(),
            reconcile_hour_utc: 0,
            reconcile_delay_ms: default_reconcile_delay_ms(),
            log_level: default_log_level(),
        }
    }
}
