//! Periodic reconciliation of role grants against current on-chain truth.
//!
//! Verification is a point-in-time attestation; assets move afterwards.
//! This crate is the system's only mechanism for noticing: a daily batch
//! re-queries the oracle for every verified identity and corrects drift,
//! re-affirming grants for holders and revoking for ex-holders.
//!
//! The batch algorithm ([`Reconciler`]) is decoupled from wall-clock
//! triggering ([`DailySchedule`]): `run_once` takes no time source and is
//! fully testable against nullables, while the run loop owns the timer and
//! the shutdown signal.

pub mod cadence;
pub mod reconcile;

pub use cadence::DailySchedule;
pub use reconcile::{ReconcileReport, Reconciler};
