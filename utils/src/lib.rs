//! Shared utilities for the holdgate service.

pub mod logging;

pub use logging::init_tracing;
