//! Component types managed by the engine.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Security-critical component domain.
///
/// Partitions implementations and coordinators 1:1: every implementation
/// belongs to exactly one component type, and the manager owns exactly one
/// coordinator per variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentType {
    /// Network reachability and transport.
    Network,
    /// Symmetric encryption.
    Cryptography,
    /// Key/value persistence.
    Storage,
    /// Signing identities.
    Identity,
    /// Message passing between components.
    Communication,
    /// Task execution environments.
    Execution,
}

impl ComponentType {
    /// Every component type, in report order.
    pub const ALL: [ComponentType; 6] = [
        Self::Network,
        Self::Cryptography,
        Self::Storage,
        Self::Identity,
        Self::Communication,
        Self::Execution,
    ];

    /// Lowercase wire name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::Cryptography => "cryptography",
            Self::Storage => "storage",
            Self::Identity => "identity",
            Self::Communication => "communication",
            Self::Execution => "execution",
        }
    }

    /// Human-readable name used in recommendations.
    #[must_use]
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Network => "Network",
            Self::Cryptography => "Cryptography",
            Self::Storage => "Storage",
            Self::Identity => "Identity",
            Self::Communication => "Communication",
            Self::Execution => "Execution",
        }
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown component name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown component type: {0}")]
pub struct UnknownComponent(pub String);

impl FromStr for ComponentType {
    type Err = UnknownComponent;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "network" => Ok(Self::Network),
            "cryptography" | "crypto" => Ok(Self::Cryptography),
            "storage" => Ok(Self::Storage),
            "identity" => Ok(Self::Identity),
            "communication" | "comm" => Ok(Self::Communication),
            "execution" => Ok(Self::Execution),
            _ => Err(UnknownComponent(s.to_string())),
        }
    }
}
