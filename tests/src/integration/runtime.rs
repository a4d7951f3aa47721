//! # Runtime
//!
//! The container as `tetra-failsafe` builds it: environment configuration,
//! bootstrap, operator commands and the health monitor together.

#[cfg(test)]
mod tests {
    use failsafe_engine::{ComponentType, FailsafeStatus};
    use failsafe_runtime::{commands, CycleOutcome, FailsafeContainer, HealthMonitor, RuntimeConfig};
    use serde_json::Value;
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::time::Duration;
    use tempfile::TempDir;

    fn config(dir: &TempDir, vars: &[(&str, &str)]) -> RuntimeConfig {
        let mut vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        vars.insert(
            "TETRA_DATA_DIR".to_string(),
            dir.path().join("store").display().to_string(),
        );
        let mut config = RuntimeConfig::from_lookup(|key| vars.get(key).cloned()).unwrap();
        config.telemetry.metrics_enabled = false;
        config
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_operator_session() {
        let dir = TempDir::new().unwrap();
        let container = FailsafeContainer::bootstrap(config(&dir, &[])).await.unwrap();

        let healthy = commands::report(&container).unwrap();
        assert_eq!(healthy.exit_code, 0);

        let switched = commands::switch(&container, ComponentType::Cryptography, "aes256gcm")
            .await
            .unwrap();
        assert_eq!(switched.exit_code, 0);

        let exhausted = commands::simulate_failure(&container, ComponentType::Cryptography)
            .await
            .unwrap();
        assert_eq!(exhausted.exit_code, 1);

        let report = commands::report(&container).unwrap();
        let body: Value = serde_json::from_str(&report.body).unwrap();
        assert_eq!(body["overall_status"], "fallback");
        assert_eq!(report.exit_code, 2);
        assert_eq!(body["recommendations"].as_array().unwrap().len(), 1);

        container.shutdown().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_restricted_backends_from_environment() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir, &[("TETRA_BACKENDS", "ed25519,memory,inline")]);

        let container = FailsafeContainer::bootstrap(config).await.unwrap();

        let report = container.manager.get_failsafe_report();
        assert_eq!(report.overall_status, FailsafeStatus::Emergency);
        assert_eq!(
            report.components[&ComponentType::Execution]
                .active_implementation
                .as_deref(),
            Some("inline")
        );
        // Components with nothing registered stay online and silent.
        assert_eq!(
            report.components[&ComponentType::Network].status,
            FailsafeStatus::Online
        );
        assert_eq!(report.recommendations.len(), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_monitor_cycle_observes_failover() {
        let dir = TempDir::new().unwrap();
        let container = FailsafeContainer::bootstrap(config(&dir, &[])).await.unwrap();
        assert!(container.manager.simulate_failure(ComponentType::Storage).await);

        let monitor = HealthMonitor::new(
            Arc::clone(&container.manager),
            Duration::from_secs(60),
            Duration::from_secs(10),
        );

        match monitor.run_cycle().await {
            CycleOutcome::Completed(report) => {
                assert_eq!(report.overall_status, FailsafeStatus::Emergency);
                assert_eq!(
                    report.components[&ComponentType::Storage]
                        .active_implementation
                        .as_deref(),
                    Some("memory")
                );
            }
            other => panic!("monitor cycle did not complete: {other:?}"),
        }
        // The monitor never moves anything back.
        assert_eq!(
            container.manager.storage().active_implementation_id().as_deref(),
            Some("memory")
        );
    }
}
