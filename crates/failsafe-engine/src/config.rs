//! Engine configuration from environment variables.

use std::env;

use crate::events::DEFAULT_EVENT_CAPACITY;

/// Configuration for a [`FailsafeManager`](crate::FailsafeManager).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailsafeConfig {
    /// Events buffered per subscriber on the manager's bus.
    pub event_capacity: usize,
}

impl Default for FailsafeConfig {
    fn default() -> Self {
        Self {
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

impl FailsafeConfig {
    /// Load from the environment.
    ///
    /// - `TETRA_EVENT_CAPACITY`: per-subscriber event buffer (default: 256)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            event_capacity: env::var("TETRA_EVENT_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|capacity: &usize| *capacity > 0)
                .unwrap_or(defaults.event_capacity),
        }
    }
}
