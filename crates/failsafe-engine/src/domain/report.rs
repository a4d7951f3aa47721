//! System-wide failsafe report.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::component::ComponentType;
use super::status::FailsafeStatus;

/// Point-in-time view of one coordinator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentSnapshot {
    pub status: FailsafeStatus,
    pub active_implementation: Option<String>,
    /// Registered ids in fallback-chain order.
    pub available_implementations: Vec<String>,
}

/// Aggregated status of every coordinator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemReport {
    pub timestamp: DateTime<Utc>,
    /// Maximum severity across all components.
    pub overall_status: FailsafeStatus,
    pub components: BTreeMap<ComponentType, ComponentSnapshot>,
    pub recommendations: Vec<String>,
}

impl SystemReport {
    /// Build a report from per-component snapshots.
    ///
    /// The overall status and the recommendation list are derived here so
    /// every producer of a report agrees on them.
    pub fn from_snapshots(components: BTreeMap<ComponentType, ComponentSnapshot>) -> Self {
        let overall_status = FailsafeStatus::worst(components.values().map(|s| s.status));
        let recommendations = components
            .iter()
            .filter_map(|(component, snapshot)| recommendation(*component, snapshot.status))
            .collect();

        Self {
            timestamp: Utc::now(),
            overall_status,
            components,
            recommendations,
        }
    }

    /// Whether every component is online.
    pub fn is_healthy(&self) -> bool {
        self.overall_status == FailsafeStatus::Online
    }

    /// Process exit code for health-check callers: the overall severity.
    pub fn exit_code(&self) -> i32 {
        i32::from(self.overall_status.severity())
    }
}

/// Operator-facing advice for a non-online component.
///
/// Tone scales with severity: informational for degraded, advisory for
/// fallback, urgent for emergency and offline.
pub fn recommendation(component: ComponentType, status: FailsafeStatus) -> Option<String> {
    let name = component.display_name();
    match status {
        FailsafeStatus::Online => None,
        FailsafeStatus::Degraded => Some(format!(
            "{name} is running in a degraded state with no confirmed active implementation; \
             review it and switch to a healthy implementation when convenient."
        )),
        FailsafeStatus::Fallback => Some(format!(
            "{name} is operating on a fallback implementation; \
             restore the primary implementation once it is healthy."
        )),
        FailsafeStatus::Emergency => Some(format!(
            "URGENT: {name} is running on an emergency implementation; \
             investigate the failed implementations immediately."
        )),
        FailsafeStatus::Offline => Some(format!(
            "CRITICAL: {name} is offline with no usable implementation; \
             operator intervention is required."
        )),
    }
}
