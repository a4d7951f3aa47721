//! # Failsafe Container
//!
//! Owns the manager and wires configuration, metrics and the reference
//! backends together. Built once per process by `main`.

pub mod config;

pub use config::{ConfigError, RuntimeConfig};

use failsafe_backends::{activate_primaries, register_default_backends};
use failsafe_engine::{ComponentType, FailsafeManager, MetricsRecorder, NoOpMetrics, RegistrationError};
use std::sync::Arc;
use tracing::{info, warn};

use crate::adapters::PrometheusRecorder;

pub struct FailsafeContainer {
    pub config: RuntimeConfig,
    pub manager: Arc<FailsafeManager>,
    /// Components with registered backends but none that came up.
    pub unconfirmed: Vec<ComponentType>,
}

impl FailsafeContainer {
    /// Build the manager, register the enabled reference backends and
    /// activate each component's preferred implementation.
    pub async fn bootstrap(config: RuntimeConfig) -> Result<Self, RegistrationError> {
        let metrics: Arc<dyn MetricsRecorder> = if config.telemetry.metrics_enabled {
            Arc::new(PrometheusRecorder)
        } else {
            Arc::new(NoOpMetrics)
        };
        let manager = Arc::new(FailsafeManager::with_metrics(config.engine.clone(), metrics));

        let registered = register_default_backends(&manager, &config.backends).await?;
        let unconfirmed = activate_primaries(&manager).await;

        if unconfirmed.is_empty() {
            info!(registered, "Failsafe container ready");
        } else {
            let components: Vec<&str> = unconfirmed.iter().map(|c| c.as_str()).collect();
            warn!(
                registered,
                unconfirmed = ?components,
                "Failsafe container started with unconfirmed components"
            );
        }

        Ok(Self {
            config,
            manager,
            unconfirmed,
        })
    }

    /// Deactivate every active backend.
    pub async fn shutdown(&self) {
        self.manager.shutdown().await;
    }
}
