//! Status severity scale and strategy tiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Operational status of a coordinator or implementation.
///
/// Variants are declared in severity order, so `Ord` gives the "worst-of"
/// aggregation directly: `online < degraded < fallback < emergency < offline`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum FailsafeStatus {
    /// Primary implementation healthy.
    #[default]
    Online = 0,
    /// Running, but without full capability or confirmation.
    Degraded = 1,
    /// Running on a lower-priority implementation.
    Fallback = 2,
    /// Running on an emergency implementation.
    Emergency = 3,
    /// No usable implementation.
    Offline = 4,
}

impl FailsafeStatus {
    /// Numeric severity code (0 = online .. 4 = offline).
    #[must_use]
    pub fn severity(&self) -> u8 {
        *self as u8
    }

    /// Status for a severity code, if in range.
    #[must_use]
    pub fn from_severity(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Online),
            1 => Some(Self::Degraded),
            2 => Some(Self::Fallback),
            3 => Some(Self::Emergency),
            4 => Some(Self::Offline),
            _ => None,
        }
    }

    /// Worst status of an iterator, `Online` when empty.
    pub fn worst<I: IntoIterator<Item = FailsafeStatus>>(statuses: I) -> Self {
        statuses.into_iter().max().unwrap_or(Self::Online)
    }

    /// Lowercase wire name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Online => "online",
            Self::Degraded => "degraded",
            Self::Fallback => "fallback",
            Self::Emergency => "emergency",
            Self::Offline => "offline",
        }
    }
}

impl fmt::Display for FailsafeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Descriptive tier of an implementation.
///
/// Metadata only: ordering and failover are driven by priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    #[default]
    Default,
    Alternate,
    Backup,
    Emergency,
    LastResort,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Default => "default",
            Self::Alternate => "alternate",
            Self::Backup => "backup",
            Self::Emergency => "emergency",
            Self::LastResort => "last_resort",
        };
        f.write_str(name)
    }
}
