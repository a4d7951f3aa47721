//! Service Layer
//!
//! - `FailsafeCoordinator`: one component's implementations and failover
//! - `FailsafeManager`: one coordinator per component type, reporting

pub mod coordinator;
pub mod manager;

pub use coordinator::{ComponentCoordinator, FailsafeCoordinator};
pub use manager::{
    CommunicationCoordinator, CryptoCoordinator, ExecutionCoordinator, FailsafeManager,
    IdentityCoordinator, NetworkCoordinator, StorageCoordinator, SystemTestResults,
};
