//! HTTP API for the verification front end.
//!
//! One canonical request/response contract serves every client:
//! - `GET /api/check-token` — is this token usable, and is its identity
//!   already verified?
//! - `POST /api/verify` — submit the signed challenge and claimed address.
//! - `GET /api/status/{identity}` — read-only verification status.
//! - `GET /health` — liveness probe.
//!
//! Every engine error maps to a stable user-facing message plus a
//! machine-checkable `reason` string; token errors distinguish missing
//! (400), unknown (404), and expired (410).

pub mod error;
pub mod handlers;
pub mod server;

pub use error::ServerError;
pub use server::RpcServer;
