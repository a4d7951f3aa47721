//! # Failsafe Engine
//!
//! Plugin registry with failover for security-critical components. Each
//! component type (network, cryptography, storage, identity, communication,
//! execution) holds several interchangeable backends ranked by priority, with
//! explicit activation and deactivation, health testing and failover.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): pure data, no I/O
//!   - `FailsafeStatus`: severity scale, worst-of aggregation
//!   - `FallbackChain`: priority-descending order with stable ties
//!   - `Implementation`: descriptor plus typed backend handle
//!   - `SystemReport`: JSON-serialisable health report
//!
//! - **Ports Layer** (`ports/`): trait definitions
//!   - `Lifecycle`: availability, activate, deactivate, self-test
//!   - `CryptoBackend`, `StorageBackend`, ...: per-component capabilities
//!
//! - **Service Layer** (`service/`): orchestration
//!   - `FailsafeCoordinator`: register, switch, failover, test
//!   - `FailsafeManager`: one coordinator per component, reports
//!
//! ## Invariants
//!
//! - The fallback chain is sorted by priority descending after every
//!   register and unregister; equal priorities keep insertion order.
//! - Registration never activates a backend.
//! - Status only changes through switch, failover and unregister. Self-test
//!   results never move it.
//! - Failover only ever moves to a strictly lower-priority implementation.
//!
//! ## Usage Example
//!
//! ```ignore
//! use failsafe_engine::{FailsafeManager, ComponentType};
//!
//! let manager = FailsafeManager::new();
//! manager.cryptography().register_implementation(xchacha).await?;
//! manager.cryptography().register_implementation(aes_gcm).await?;
//! manager.switch_to_crypto("xchacha20poly1305").await;
//!
//! if !manager.simulate_failure(ComponentType::Cryptography).await {
//!     // exhausted: operator intervention required
//! }
//! let report = manager.get_failsafe_report();
//! println!("{}", serde_json::to_string_pretty(&report)?);
//! ```

pub mod config;
pub mod domain;
pub mod error;
pub mod events;
pub mod metrics;
pub mod ports;
pub mod service;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use config::FailsafeConfig;
pub use domain::{
    recommendation, ComponentSnapshot, ComponentType, FailsafeStatus, FallbackChain,
    Implementation, ImplementationDescriptor, Strategy, SystemReport, TestResult,
    UnknownComponent,
};
pub use error::{BackendError, RegistrationError};
pub use events::{EventBus, EventEnvelope, FailsafeEvent, SwitchFailure};
pub use metrics::{FailoverOutcome, Metrics, MetricsRecorder, MetricsSnapshot, NoOpMetrics};
pub use ports::*;
pub use service::*;
