//! Service wiring for the holdgate daemon.
//!
//! Builds the production object graph (LMDB store, JSON-RPC oracle, REST
//! role client, verification engine, HTTP API, reconciliation scheduler)
//! from a [`ServiceConfig`], and coordinates graceful shutdown.

pub mod config;
pub mod error;
pub mod service;
pub mod shutdown;

pub use config::ServiceConfig;
pub use error::NodeError;
pub use service::Service;
pub use shutdown::Shutdown;
