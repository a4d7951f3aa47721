//! Adapters binding engine ports to runtime infrastructure.

pub mod metrics;

pub use metrics::PrometheusRecorder;
