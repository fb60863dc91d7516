//! # Suspension Cleanup Scheduler
//!
//! A background tokio task that expires stale suspensions. It wakes on a
//! fixed interval (hourly in production), checks whether the calendar day
//! has advanced since its last successful run, and if so removes every
//! suspension older than the retention window.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   tick ──► clock.today() ──► advanced past last run day?                │
//! │                                   │yes                │no               │
//! │                                   ▼                   ▼                 │
//! │           cleanup_older_than(now - retention)      (sleep)              │
//! │                │ok                    │err                              │
//! │                ▼                      ▼                                 │
//! │           record new day        log, retry next tick                    │
//! │                                 (day NOT recorded)                      │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Shutdown is graceful: `stop` signals the task, waits a bounded time for
//! an in-flight pass to finish, then aborts. The register's suspension mutex
//! is only held inside `cleanup_older_than`, so an abort between passes can
//! never strand it locked.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::config::RegisterConfig;
use crate::contracts::{CatalogLookup, PersistenceStore};
use crate::register::Register;

/// How long `stop` waits for an in-flight cleanup before aborting.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

// =============================================================================
// Day Boundary Guard
// =============================================================================

/// Tracks the last calendar day a cleanup ran, so the hourly tick fires the
/// cleanup at most once per day advance.
///
/// The day is recorded only after a successful pass: a failed cleanup is
/// retried on the next tick instead of being skipped for the day.
#[derive(Debug)]
pub(crate) struct DayBoundary {
    last_run: NaiveDate,
}

impl DayBoundary {
    pub(crate) fn new(today: NaiveDate) -> Self {
        DayBoundary { last_run: today }
    }

    /// Whether `today` is past the last recorded run day.
    pub(crate) fn day_advanced(&self, today: NaiveDate) -> bool {
        today > self.last_run
    }

    /// Records a successful run.
    pub(crate) fn mark_ran(&mut self, today: NaiveDate) {
        self.last_run = today;
    }
}

// =============================================================================
// Cleanup Scheduler
// =============================================================================

/// Handle to the running cleanup task.
pub struct CleanupScheduler {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl CleanupScheduler {
    /// Spawns the cleanup task against a shared register.
    ///
    /// The task takes its time from the register's injected clock, so tests
    /// drive day changes without waiting for midnight.
    pub fn start<P, C>(register: Arc<Register<P, C>>, config: RegisterConfig) -> Self
    where
        P: PersistenceStore + 'static,
        C: CatalogLookup + 'static,
    {
        let (shutdown, mut shutdown_rx) = watch::channel(false);
        let retention_days = config.retention_days;

        info!(
            retention_days,
            interval_secs = config.cleanup_interval.as_secs(),
            "Suspension cleanup scheduler started"
        );

        let handle = tokio::spawn(async move {
            let clock = register.clock().clone();
            let mut boundary = DayBoundary::new(clock.today());
            let mut ticker = tokio::time::interval(config.cleanup_interval);
            // A late tick should fire once, not replay a backlog
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let today = clock.today();
                        if !boundary.day_advanced(today) {
                            debug!("Cleanup tick: day has not advanced");
                            continue;
                        }

                        let cutoff = clock.now() - chrono::Duration::days(i64::from(retention_days));
                        match register.cleanup_older_than(cutoff).await {
                            Ok(removed) => {
                                info!(removed, "Scheduled suspension cleanup complete");
                                boundary.mark_ran(today);
                            }
                            // Non-fatal: retried on the next tick
                            Err(e) => warn!(error = %e, "Scheduled suspension cleanup failed"),
                        }
                    }
                    _ = shutdown_rx.changed() => {
                        debug!("Cleanup scheduler shutting down");
                        break;
                    }
                }
            }
        });

        CleanupScheduler { shutdown, handle }
    }

    /// Stops the scheduler, waiting up to a grace period for an in-flight
    /// cleanup pass to finish before forcing the task down.
    pub async fn stop(mut self) {
        let _ = self.shutdown.send(true);

        if tokio::time::timeout(SHUTDOWN_GRACE, &mut self.handle)
            .await
            .is_err()
        {
            warn!("Cleanup scheduler did not stop in time; aborting");
            self.handle.abort();
        }

        info!("Suspension cleanup scheduler stopped");
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
