//! holdgate daemon — entry point for the verification service.

use clap::Parser;
use holdgate_node::{Service, ServiceConfig};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "holdgate-daemon", about = "Wallet-holder verification service")]
struct Cli {
    /// Path to a TOML configuration file. If provided, file settings are
    /// used as the base; CLI flags and env vars override them.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Port for the HTTP API.
    #[arg(long, env = "HOLDGATE_HTTP_PORT")]
    http_port: Option<u16>,

    /// Data directory for the record store.
    #[arg(long, env = "HOLDGATE_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// JSON-RPC endpoint of the external ledger.
    #[arg(long, env = "HOLDGATE_RPC_URL")]
    rpc_url: Option<String>,

    /// Asset contract address checked for holdings.
    #[arg(long, env = "HOLDGATE_CONTRACT_ADDRESS")]
    contract_address: Option<String>,

    /// Chat platform REST API base URL.
    #[arg(long, env = "HOLDGATE_PLATFORM_API_URL")]
    platform_api_url: Option<String>,

    /// Platform bot credential. Environment only, never a file on disk.
    #[arg(long, env = "HOLDGATE_PLATFORM_TOKEN", hide_env_values = true)]
    platform_token: String,

    /// Community space id.
    #[arg(long, env = "HOLDGATE_SPACE_ID")]
    space_id: Option<String>,

    /// Holder role id.
    #[arg(long, env = "HOLDGATE_ROLE_ID")]
    role_id: Option<String>,

    /// Public base URL for verification links.
    #[arg(long, env = "HOLDGATE_BASE_URL")]
    base_url: Option<String>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, default_value = "info", env = "HOLDGATE_LOG_LEVEL")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    holdgate_utils::init_tracing(&cli.log_level);

    let mut config = if let Some(ref path) = cli.config {
        match ServiceConfig::from_toml_file(&path.display().to_string()) {
            Ok(cfg) => {
                tracing::info!("Loaded config from {}", path.display());
                cfg
            }
            Err(e) => {
                eprintln!("Failed to load config file {}: {e}", path.display());
                std::process::exit(1);
            }
        }
    } else {
        ServiceConfig::default()
    };

    if let Some(port) = cli.http_port {
        config.http_port = port;
    }
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }
    if let Some(rpc_url) = cli.rpc_url {
        config.rpc_url = rpc_url;
    }
    if let Some(contract) = cli.contract_address {
        config.contract_address = contract;
    }
    if let Some(api_url) = cli.platform_api_url {
        config.platform_api_url = api_url;
    }
    if let Some(space_id) = cli.space_id {
        config.space_id = space_id;
    }
    if let Some(role_id) = cli.role_id {
        config.role_id = role_id;
    }
    if let Some(base_url) = cli.base_url {
        config.base_url = base_url;
    }
    config.log_level = cli.log_level;

    tracing::info!(
        "Starting holdgate on port {} (ledger: {}, space: {})",
        config.http_port,
        config.rpc_url,
        config.space_id,
    );

    let service = Service::new(config, &cli.platform_token)?;
    service.run().await?;

    tracing::info!("holdgate daemon exited cleanly");
    Ok(())
}
