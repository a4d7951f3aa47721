//! Prometheus metrics for the failsafe runtime.
//!
//! All metrics follow the naming convention: `tetra_failsafe_<metric>_<unit>`
//! and carry a `component` label with the lowercase component name.

use lazy_static::lazy_static;
use prometheus::{
    exponential_buckets, Counter, CounterVec, Encoder, GaugeVec, Histogram, HistogramOpts, Opts,
    Registry, TextEncoder,
};

use crate::TelemetryError;

lazy_static! {
    /// Registry for everything below
    pub static ref REGISTRY: Registry = Registry::new();

    /// Switch attempts, `outcome` = success/failure
    pub static ref SWITCHES: CounterVec = CounterVec::new(
        Opts::new("tetra_failsafe_switches_total", "Implementation switch attempts"),
        &["component", "outcome"]
    ).expect("metric creation failed");

    /// Failover attempts, `outcome` = success/exhausted
    pub static ref FAILOVERS: CounterVec = CounterVec::new(
        Opts::new("tetra_failsafe_failovers_total", "Failover attempts"),
        &["component", "outcome"]
    ).expect("metric creation failed");

    pub static ref ACTIVATION_FAILURES: CounterVec = CounterVec::new(
        Opts::new(
            "tetra_failsafe_activation_failures_total",
            "Activations that returned false after the previous implementation was released"
        ),
        &["component"]
    ).expect("metric creation failed");

    /// Self-test runs, `outcome` = passed/failed
    pub static ref SELF_TESTS: CounterVec = CounterVec::new(
        Opts::new("tetra_failsafe_self_tests_total", "Implementation self-test runs"),
        &["component", "outcome"]
    ).expect("metric creation failed");

    /// Current status severity per component (0 online .. 4 offline)
    pub static ref COMPONENT_STATUS: GaugeVec = GaugeVec::new(
        Opts::new("tetra_failsafe_component_status", "Component status severity code"),
        &["component"]
    ).expect("metric creation failed");

    pub static ref MONITOR_CYCLES: Counter = Counter::new(
        "tetra_failsafe_monitor_cycles_total",
        "Completed health monitor cycles"
    ).expect("metric creation failed");

    pub static ref MONITOR_CYCLE_DURATION: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "tetra_failsafe_monitor_cycle_duration_seconds",
            "Time spent testing and reporting in one monitor cycle"
        ).buckets(exponential_buckets(0.001, 2.0, 14).expect("valid bucket layout"))
    ).expect("metric creation failed");
}

/// Register all metrics with [`REGISTRY`].
///
/// Safe to call more than once; metrics already registered are skipped.
pub fn register_metrics() -> Result<(), TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(SWITCHES.clone()),
        Box::new(FAILOVERS.clone()),
        Box::new(ACTIVATION_FAILURES.clone()),
        Box::new(SELF_TESTS.clone()),
        Box::new(COMPONENT_STATUS.clone()),
        Box::new(MONITOR_CYCLES.clone()),
        Box::new(MONITOR_CYCLE_DURATION.clone()),
    ];

    for metric in metrics {
        match REGISTRY.register(metric) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
    }
    Ok(())
}

/// Encode all metrics as Prometheus text format.
pub fn gather_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}

/// Timer guard for automatic histogram observation.
pub struct HistogramTimer {
    histogram: Histogram,
    start: std::time::Instant,
}

impl HistogramTimer {
    pub fn new(histogram: &Histogram) -> Self {
        Self {
            histogram: histogram.clone(),
            start: std::time::Instant::now(),
        }
    }
}

impl Drop for HistogramTimer {
    fn drop(&mut self) {
        self.histogram.observe(self.start.elapsed().as_secs_f64());
    }
}

/// Start timing for a histogram. Observation happens on drop.
#[macro_export]
macro_rules! time_histogram {
    ($histogram:expr) => {
        $crate::metrics::HistogramTimer::new(&$histogram)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_is_idempotent() {
        register_metrics().unwrap();
        register_metrics().unwrap();
    }

    #[test]
    fn test_labelled_counter() {
        SWITCHES.with_label_values(&["storage", "success"]).inc();
        assert!(SWITCHES.with_label_values(&["storage", "success"]).get() >= 1.0);
    }

    #[test]
    fn test_gather_contains_registered_metrics() {
        register_metrics().unwrap();
        COMPONENT_STATUS.with_label_values(&["identity"]).set(2.0);

        let text = gather_metrics().unwrap();
        assert!(text.contains("tetra_failsafe_component_status"));
    }

    #[test]
    fn test_histogram_timer() {
        let before = MONITOR_CYCLE_DURATION.get_sample_count();
        {
            let _timer = HistogramTimer::new(&MONITOR_CYCLE_DURATION);
        }
        assert_eq!(MONITOR_CYCLE_DURATION.get_sample_count(), before + 1);
    }
}
