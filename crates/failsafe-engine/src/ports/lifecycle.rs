//! Lifecycle contract every backend satisfies.

use async_trait::async_trait;

use crate::domain::TestResult;
use crate::error::BackendError;

/// Uniform lifecycle of a pluggable backend (Driven Port).
///
/// The coordinator awaits every call to completion before updating its
/// bookkeeping. No timeout is applied here; a backend that never resolves
/// blocks the coordinator's mutation lock until it does.
#[async_trait]
pub trait Lifecycle: Send + Sync {
    /// Side-effect-free readiness probe. Must return promptly.
    async fn is_available(&self) -> bool;

    /// Idempotent setup. Returns `false` on recoverable failure.
    async fn activate(&self) -> bool;

    /// Release what `activate` acquired. Best-effort: the coordinator logs
    /// an error and carries on.
    async fn deactivate(&self) -> Result<(), BackendError>;

    /// Self-contained functional check. Feeds health reporting only.
    async fn test(&self) -> Result<TestResult, BackendError>;
}
