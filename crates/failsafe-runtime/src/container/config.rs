//! # Runtime Configuration
//!
//! Everything the runtime needs, loaded from `TETRA_*` environment
//! variables. Unlike the telemetry settings, a variable that is set but does
//! not parse is an error rather than a silent default.

use failsafe_backends::BackendSettings;
use failsafe_engine::FailsafeConfig;
use std::collections::BTreeSet;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tetra_telemetry::TelemetryConfig;
use thiserror::Error;

/// Interval between health monitor cycles.
pub const DEFAULT_MONITOR_INTERVAL: Duration = Duration::from_secs(60);

/// Upper bound on one CLI command or monitor cycle.
pub const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_secs(30);

/// Complete runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub engine: FailsafeConfig,
    pub backends: BackendSettings,
    pub monitor_interval: Duration,
    pub operation_timeout: Duration,
    pub telemetry: TelemetryConfig,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            engine: FailsafeConfig::default(),
            backends: BackendSettings::default(),
            monitor_interval: DEFAULT_MONITOR_INTERVAL,
            operation_timeout: DEFAULT_OPERATION_TIMEOUT,
            telemetry: TelemetryConfig::default(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{var}={value:?} is invalid: {reason}")]
    InvalidValue {
        var: &'static str,
        value: String,
        reason: String,
    },

    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),
}

impl RuntimeConfig {
    /// Load from the process environment.
    ///
    /// # Environment Variables
    ///
    /// - `TETRA_DATA_DIR`: filesystem storage root (default: ./data/failsafe)
    /// - `TETRA_MONITOR_INTERVAL_SECS`: health monitor period (default: 60)
    /// - `TETRA_OPERATION_TIMEOUT_SECS`: per-command timeout (default: 30)
    /// - `TETRA_PROBE_TARGET`: host:port for the network self-test
    /// - `TETRA_CONNECT_TIMEOUT_MS`: TCP connect timeout (default: 3000)
    /// - `TETRA_BACKENDS`: comma-separated backend ids to enable (default: all)
    /// - `TETRA_EVENT_CAPACITY`: event buffer per subscriber (default: 256)
    /// - plus the logging and metrics variables of [`TelemetryConfig`]
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::from_lookup(|key| env::var(key).ok())?;
        config.engine = FailsafeConfig::from_env();
        config.telemetry = TelemetryConfig::from_env();
        Ok(config)
    }

    /// Load runtime settings through `lookup`; engine and telemetry settings
    /// keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(dir) = lookup("TETRA_DATA_DIR") {
            config.backends.data_dir = PathBuf::from(dir);
        }
        if let Some(secs) = parse_var::<u64, _>(&lookup, "TETRA_MONITOR_INTERVAL_SECS")? {
            config.monitor_interval = Duration::from_secs(secs);
        }
        if let Some(secs) = parse_var::<u64, _>(&lookup, "TETRA_OPERATION_TIMEOUT_SECS")? {
            config.operation_timeout = Duration::from_secs(secs);
        }
        if let Some(target) = lookup("TETRA_PROBE_TARGET").filter(|t| !t.trim().is_empty()) {
            config.backends.probe_target = Some(target.trim().to_string());
        }
        if let Some(ms) = parse_var::<u64, _>(&lookup, "TETRA_CONNECT_TIMEOUT_MS")? {
            config.backends.connect_timeout = Duration::from_millis(ms);
        }
        if let Some(list) = lookup("TETRA_BACKENDS") {
            config.backends.enabled = parse_backend_list(&list);
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.monitor_interval.is_zero() {
            return Err(ConfigError::ZeroDuration("TETRA_MONITOR_INTERVAL_SECS"));
        }
        if self.operation_timeout.is_zero() {
            return Err(ConfigError::ZeroDuration("TETRA_OPERATION_TIMEOUT_SECS"));
        }
        if self.backends.connect_timeout.is_zero() {
            return Err(ConfigError::ZeroDuration("TETRA_CONNECT_TIMEOUT_MS"));
        }
        Ok(())
    }
}

fn parse_var<T, F>(lookup: &F, var: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    lookup(var)
        .map(|value| {
            value
                .trim()
                .parse::<T>()
                .map_err(|e| ConfigError::InvalidValue {
                    var,
                    value: value.clone(),
                    reason: e.to_string(),
                })
        })
        .transpose()
}

/// `"a, b,,c"` → `{a, b, c}`; an empty list means "all".
fn parse_backend_list(list: &str) -> Option<BTreeSet<String>> {
    let ids: BTreeSet<String> = list
        .split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect();
    (!ids.is_empty()).then_some(ids)
}
