//! Wall-clock cadence for the daily reconciliation run.

use crate::reconcile::Reconciler;
use holdgate_oracle::OwnershipOracle;
use holdgate_roles::RoleBinding;
use holdgate_store::VerificationStore;
use holdgate_types::Timestamp;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{error, info};

const SECS_PER_DAY: u64 = 86_400;
const SECS_PER_HOUR: u64 = 3_600;

/// Fires once a day at a fixed UTC hour.
#[derive(Clone, Copy, Debug)]
pub struct DailySchedule {
    hour_utc: u8,
}

impl DailySchedule {
    /// Create a schedule firing at `hour_utc` (0–23) every day.
    pub fn at_hour(hour_utc: u8) -> Self {
        assert!(hour_utc < 24, "hour_utc must be 0-23");
        Self { hour_utc }
    }

    /// Seconds from `now` until the next firing.
    ///
    /// A `now` exactly on the firing instant waits a full day: each firing
    /// belongs to the sleep that preceded it.
    pub fn secs_until_next_run(&self, now: Timestamp) -> u64 {
        let since_midnight = now.as_secs() % SECS_PER_DAY;
        let target = u64::from(self.hour_utc) * SECS_PER_HOUR;

        if since_midnight < target {
            target - since_midnight
        } else {
            SECS_PER_DAY - since_midnight + target
        }
    }

    /// Drive `reconciler` on this schedule until `shutdown` fires.
    ///
    /// The loop owns the wall clock; the reconciler itself never reads it.
    /// A failed run is logged and the loop continues; the next day's pass
    /// sees the same drift and corrects it then.
    pub async fn run<S, O, R>(
        &self,
        reconciler: Reconciler<S, O, R>,
        mut shutdown: broadcast::Receiver<()>,
    ) where
        S: VerificationStore,
        O: OwnershipOracle,
        R: RoleBinding,
    {
        info!(hour_utc = self.hour_utc, "reconciliation scheduler started");
        loop {
            let wait = self.secs_until_next_run(Timestamp::now());
            tokio::select! {
                _ = tokio::time::sleep(Duration::from_secs(wait)) => {
                    if let Err(e) = reconciler.run_once().await {
                        error!(error = %e, "reconciliation run failed");
                    }
                }
                _ = shutdown.recv() => {
                    info!("reconciliation scheduler stopped");
                    return;
                }
            }
        }
    }
}
