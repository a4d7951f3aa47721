//! Prometheus-backed [`MetricsRecorder`].

use failsafe_engine::{ComponentType, FailoverOutcome, FailsafeStatus, MetricsRecorder};
use tetra_telemetry::{ACTIVATION_FAILURES, COMPONENT_STATUS, FAILOVERS, SELF_TESTS, SWITCHES};

/// Forwards coordinator instrumentation to the process-wide Prometheus
/// registry of `tetra-telemetry`.
#[derive(Debug, Default, Clone, Copy)]
pub struct PrometheusRecorder;

impl MetricsRecorder for PrometheusRecorder {
    fn record_switch(&self, component: ComponentType, success: bool) {
        let outcome = if success { "success" } else { "failure" };
        SWITCHES
            .with_label_values(&[component.as_str(), outcome])
            .inc();
    }

    fn record_failover(&self, component: ComponentType, outcome: FailoverOutcome) {
        FAILOVERS
            .with_label_values(&[component.as_str(), outcome.as_str()])
            .inc();
    }

    fn record_activation_failure(&self, component: ComponentType) {
        ACTIVATION_FAILURES
            .with_label_values(&[component.as_str()])
            .inc();
    }

    fn record_self_test(&self, component: ComponentType, success: bool) {
        let outcome = if success { "passed" } else { "failed" };
        SELF_TESTS
            .with_label_values(&[component.as_str(), outcome])
            .inc();
    }

    fn record_status(&self, component: ComponentType, status: FailsafeStatus) {
        COMPONENT_STATUS
            .with_label_values(&[component.as_str()])
            .set(f64::from(status.severity()));
    }
}
