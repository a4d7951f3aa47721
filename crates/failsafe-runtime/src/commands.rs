//! # Operator Commands
//!
//! Each command runs against a bootstrapped container and renders its result
//! as JSON plus a process exit code. Engine calls are bounded by the
//! configured operation timeout; the engine itself never times out.

use failsafe_engine::ComponentType;
use serde::Serialize;
use serde_json::json;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tetra_telemetry::{gather_metrics, TelemetryError};
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinError;
use tracing::{info, warn};

use crate::container::FailsafeContainer;
use crate::monitor::HealthMonitor;

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("{command} did not finish within {timeout:?}")]
    Timeout {
        command: &'static str,
        timeout: Duration,
    },

    #[error("failed to encode output: {0}")]
    Encode(#[from] serde_json::Error),

    #[error(transparent)]
    Telemetry(#[from] TelemetryError),

    #[error("health monitor task failed: {0}")]
    Monitor(#[from] JoinError),
}

/// Rendered command result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub body: String,
    pub exit_code: i32,
}

impl CommandOutput {
    fn json<T: Serialize>(value: &T, exit_code: i32) -> Result<Self, CommandError> {
        Ok(Self {
            body: serde_json::to_string_pretty(value)?,
            exit_code,
        })
    }
}

async fn bounded<F: Future>(
    command: &'static str,
    timeout: Duration,
    future: F,
) -> Result<F::Output, CommandError> {
    tokio::time::timeout(timeout, future)
        .await
        .map_err(|_| CommandError::Timeout { command, timeout })
}

/// System report; exit code is the overall severity.
pub fn report(container: &FailsafeContainer) -> Result<CommandOutput, CommandError> {
    let report = container.manager.get_failsafe_report();
    CommandOutput::json(&report, report.exit_code())
}

/// Self-test everything; exit code 1 if any test failed.
pub async fn test(container: &FailsafeContainer) -> Result<CommandOutput, CommandError> {
    let results = bounded(
        "test",
        container.config.operation_timeout,
        container.manager.test_all(),
    )
    .await?;

    let failed: usize = results
        .values()
        .flat_map(|by_id| by_id.values())
        .filter(|result| !result.success)
        .count();
    if failed > 0 {
        warn!(failed, "Self-tests failed");
    }
    CommandOutput::json(&results, i32::from(failed > 0))
}

/// Switch `component` to `id`; exit code 1 if the switch was refused.
pub async fn switch(
    container: &FailsafeContainer,
    component: ComponentType,
    id: &str,
) -> Result<CommandOutput, CommandError> {
    let coordinator = container.manager.get_coordinator(component);
    let switched = bounded(
        "switch",
        container.config.operation_timeout,
        coordinator.switch_to_implementation(id),
    )
    .await?;

    info!(component = %component, implementation = %id, switched, "Switch requested");
    let body = json!({
        "component": component,
        "implementation": id,
        "switched": switched,
        "active": coordinator.active_implementation_id(),
        "status": coordinator.get_status(),
    });
    CommandOutput::json(&body, i32::from(!switched))
}

/// Force a failover; exit code 1 when the chain is exhausted.
pub async fn simulate_failure(
    container: &FailsafeContainer,
    component: ComponentType,
) -> Result<CommandOutput, CommandError> {
    let previous = container
        .manager
        .get_coordinator(component)
        .active_implementation_id();
    let failed_over = bounded(
        "simulate-failure",
        container.config.operation_timeout,
        container.manager.simulate_failure(component),
    )
    .await?;

    let coordinator = container.manager.get_coordinator(component);
    let body = json!({
        "component": component,
        "failed_over": failed_over,
        "previous": previous,
        "active": coordinator.active_implementation_id(),
        "status": coordinator.get_status(),
    });
    CommandOutput::json(&body, i32::from(!failed_over))
}

/// Prometheus text exposition of what this process has recorded so far.
pub fn metrics() -> Result<CommandOutput, CommandError> {
    Ok(CommandOutput {
        body: gather_metrics()?,
        exit_code: 0,
    })
}

/// Run the health monitor until `stop` resolves.
pub async fn monitor<F>(container: &FailsafeContainer, stop: F) -> Result<CommandOutput, CommandError>
where
    F: Future<Output = ()>,
{
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let monitor = HealthMonitor::new(
        Arc::clone(&container.manager),
        container.config.monitor_interval,
        container.config.operation_timeout,
    );
    let handle = tokio::spawn(monitor.run(shutdown_rx));

    stop.await;
    info!("Stopping health monitor");
    let _ = shutdown_tx.send(true);
    let cycles = handle.await?;

    let report = container.manager.get_failsafe_report();
    CommandOutput::json(
        &json!({ "cycles": cycles, "overall_status": report.overall_status }),
        0,
    )
}
