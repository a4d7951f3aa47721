//! Metrics hooks for coordinator operations
//!
//! Coordinators report through [`MetricsRecorder`] so the engine stays free
//! of any global registry. [`NoOpMetrics`] is the default; [`Metrics`] keeps
//! in-process counters; the runtime bridges to Prometheus.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::domain::{ComponentType, FailsafeStatus};

/// How a failover attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailoverOutcome {
    /// Switched to the next implementation.
    Switched,
    /// A next implementation existed but the switch to it failed.
    SwitchFailed,
    /// Nothing active, or the active implementation is last in the chain.
    Exhausted,
}

impl FailoverOutcome {
    /// Metric label value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Switched => "success",
            Self::SwitchFailed => "failed",
            Self::Exhausted => "exhausted",
        }
    }
}

/// Sink for coordinator instrumentation.
pub trait MetricsRecorder: Send + Sync {
    /// A switch finished (`success` false covers unknown, unavailable and
    /// activation failures).
    fn record_switch(&self, component: ComponentType, success: bool);

    /// A failover was attempted.
    fn record_failover(&self, component: ComponentType, outcome: FailoverOutcome);

    fn record_activation_failure(&self, component: ComponentType);

    fn record_self_test(&self, component: ComponentType, success: bool);

    /// Current coordinator status: once at construction, then on every change.
    fn record_status(&self, component: ComponentType, status: FailsafeStatus);
}

/// Recorder that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpMetrics;

impl MetricsRecorder for NoOpMetrics {
    fn record_switch(&self, _component: ComponentType, _success: bool) {}
    fn record_failover(&self, _component: ComponentType, _outcome: FailoverOutcome) {}
    fn record_activation_failure(&self, _component: ComponentType) {}
    fn record_self_test(&self, _component: ComponentType, _success: bool) {}
    fn record_status(&self, _component: ComponentType, _status: FailsafeStatus) {}
}

/// Thread-safe in-process counters.
#[derive(Default)]
pub struct Metrics {
    pub switches_succeeded: AtomicU64,
    pub switches_failed: AtomicU64,
    pub failovers_succeeded: AtomicU64,
    pub failovers_failed: AtomicU64,
    pub failovers_exhausted: AtomicU64,
    pub activation_failures: AtomicU64,
    pub self_tests_passed: AtomicU64,
    pub self_tests_failed: AtomicU64,
    pub status_reports: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            switches_succeeded: self.switches_succeeded.load(Ordering::Relaxed),
            switches_failed: self.switches_failed.load(Ordering::Relaxed),
            failovers_succeeded: self.failovers_succeeded.load(Ordering::Relaxed),
            failovers_failed: self.failovers_failed.load(Ordering::Relaxed),
            failovers_exhausted: self.failovers_exhausted.load(Ordering::Relaxed),
            activation_failures: self.activation_failures.load(Ordering::Relaxed),
            self_tests_passed: self.self_tests_passed.load(Ordering::Relaxed),
            self_tests_failed: self.self_tests_failed.load(Ordering::Relaxed),
            status_reports: self.status_reports.load(Ordering::Relaxed),
        }
    }
}

impl MetricsRecorder for Metrics {
    fn record_switch(&self, _component: ComponentType, success: bool) {
        let counter = if success {
            &self.switches_succeeded
        } else {
            &self.switches_failed
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn record_failover(&self, _component: ComponentType, outcome: FailoverOutcome) {
        let counter = match outcome {
            FailoverOutcome::Switched => &self.failovers_succeeded,
            FailoverOutcome::SwitchFailed => &self.failovers_failed,
            FailoverOutcome::Exhausted => &self.failovers_exhausted,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn record_activation_failure(&self, _component: ComponentType) {
        self.activation_failures.fetch_add(1, Ordering::Relaxed);
    }

    fn record_self_test(&self, _component: ComponentType, success: bool) {
        let counter = if success {
            &self.self_tests_passed
        } else {
            &self.self_tests_failed
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn record_status(&self, _component: ComponentType, _status: FailsafeStatus) {
        self.status_reports.fetch_add(1, Ordering::Relaxed);
    }
}

/// Point-in-time copy of [`Metrics`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MetricsSnapshot {
    pub switches_succeeded: u64,
    pub switches_failed: u64,
    pub failovers_succeeded: u64,
    pub failovers_failed: u64,
    pub failovers_exhausted: u64,
    pub activation_failures: u64,
    pub self_tests_passed: u64,
    pub self_tests_failed: u64,
    pub status_reports: u64,
}
