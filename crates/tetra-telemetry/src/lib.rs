//! # Tetra Telemetry
//!
//! Logging and metrics for the failsafe runtime.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tetra_telemetry::{TelemetryConfig, init_telemetry};
//!
//! let config = TelemetryConfig::from_env();
//! init_telemetry(&config)?;
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `TETRA_LOG_LEVEL` | `info` | Log level filter (`RUST_LOG` also honoured) |
//! | `TETRA_JSON_LOGS` | `false` | JSON output, on by default in containers |
//! | `TETRA_METRICS` | `true` | Register Prometheus metrics |
//! | `TETRA_SERVICE_NAME` | `tetra-failsafe` | Service name in startup logs |

pub mod config;
pub mod logging;
pub mod metrics;

pub use config::{parse_flag, TelemetryConfig};
pub use logging::init_logging;
pub use metrics::{
    gather_metrics, register_metrics, HistogramTimer, ACTIVATION_FAILURES, COMPONENT_STATUS,
    FAILOVERS, MONITOR_CYCLES, MONITOR_CYCLE_DURATION, SELF_TESTS, SWITCHES,
};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Initialize metrics (when enabled) and the global log subscriber.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    if config.metrics_enabled {
        register_metrics()?;
    }
    init_logging(config)
}
