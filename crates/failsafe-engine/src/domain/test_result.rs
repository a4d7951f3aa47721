//! Self-test outcome reported by an implementation.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;

/// Result of one implementation's `test()`.
///
/// Produced by the implementation itself; the coordinator only fills in
/// latency when the backend did not, and converts errors and panics into a
/// failed result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<BTreeMap<String, Value>>,
}

impl TestResult {
    /// Passing result with no extra data.
    #[must_use]
    pub fn passed() -> Self {
        Self {
            success: true,
            latency_ms: None,
            errors: None,
            details: None,
        }
    }

    /// Failing result carrying the given errors.
    #[must_use]
    pub fn failed<I, S>(errors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            success: false,
            latency_ms: None,
            errors: Some(errors.into_iter().map(Into::into).collect()),
            details: None,
        }
    }

    /// Set the measured latency.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency_ms = Some(latency.as_secs_f64() * 1000.0);
        self
    }

    /// Attach one structured detail.
    #[must_use]
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Errors as a slice (empty when none).
    #[must_use]
    pub fn error_list(&self) -> &[String] {
        self.errors.as_deref().unwrap_or(&[])
    }
}
