//! # Health Monitor
//!
//! Periodically self-tests every implementation and logs the system report.
//! Observation only: the monitor never switches or fails over.
//!
//! A cycle that panics or exceeds the operation timeout is logged and the
//! loop carries on with the next tick.

use failsafe_engine::{FailsafeManager, FailsafeStatus, SystemReport, SystemTestResults};
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tetra_telemetry::{time_histogram, MONITOR_CYCLES, MONITOR_CYCLE_DURATION};
use tokio::sync::watch;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, error, info, warn};

/// Outcome of one monitor cycle.
#[derive(Debug, Clone)]
pub enum CycleOutcome {
    Completed(SystemReport),
    TimedOut,
    Panicked(String),
}

pub struct HealthMonitor {
    manager: Arc<FailsafeManager>,
    interval: Duration,
    cycle_timeout: Duration,
}

impl HealthMonitor {
    pub fn new(manager: Arc<FailsafeManager>, interval: Duration, cycle_timeout: Duration) -> Self {
        Self {
            manager,
            interval,
            cycle_timeout,
        }
    }

    /// Run until `shutdown` flips to `true` or its sender is dropped.
    ///
    /// The first cycle runs immediately. Returns the number of cycles run.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) -> u64 {
        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut cycles = 0u64;

        info!(interval_secs = self.interval.as_secs(), "Health monitor started");

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.run_cycle().await;
                    cycles += 1;
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        info!(cycles, "Health monitor stopped");
        cycles
    }

    /// One test-and-report pass.
    pub async fn run_cycle(&self) -> CycleOutcome {
        let _timer = time_histogram!(MONITOR_CYCLE_DURATION);
        let manager = Arc::clone(&self.manager);
        let cycle = AssertUnwindSafe(async move {
            let results = manager.test_all().await;
            (results, manager.get_failsafe_report())
        })
        .catch_unwind();

        let outcome = match time::timeout(self.cycle_timeout, cycle).await {
            Ok(Ok((results, report))) => {
                log_results(&results);
                log_report(&report);
                CycleOutcome::Completed(report)
            }
            Ok(Err(payload)) => {
                let message = panic_message(payload.as_ref());
                error!(error = %message, "Health monitor cycle panicked");
                CycleOutcome::Panicked(message)
            }
            Err(_) => {
                error!(
                    timeout_secs = self.cycle_timeout.as_secs(),
                    "Health monitor cycle timed out"
                );
                CycleOutcome::TimedOut
            }
        };

        MONITOR_CYCLES.inc();
        outcome
    }
}

fn log_results(results: &SystemTestResults) {
    for (component, by_id) in results {
        for (id, result) in by_id {
            if result.success {
                debug!(
                    component = %component,
                    implementation = %id,
                    latency_ms = result.latency_ms,
                    "Self-test passed"
                );
            } else {
                warn!(
                    component = %component,
                    implementation = %id,
                    errors = ?result.error_list(),
                    "Self-test failed"
                );
            }
        }
    }
}

fn log_report(report: &SystemReport) {
    for (component, snapshot) in &report.components {
        debug!(
            component = %component,
            status = %snapshot.status,
            active = snapshot.active_implementation.as_deref().unwrap_or("none"),
            "Component status"
        );
    }
    for recommendation in &report.recommendations {
        warn!(%recommendation, "Failsafe recommendation");
    }
    if report.overall_status == FailsafeStatus::Online {
        info!(status = %report.overall_status, "System healthy");
    } else {
        warn!(status = %report.overall_status, "System not fully online");
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
