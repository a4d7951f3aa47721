//! Error types for the failsafe engine

use thiserror::Error;

use crate::domain::ComponentType;

/// Reasons a registration is rejected.
///
/// Rejection is a logged no-op: the coordinator state is unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    #[error("implementation {id} is for {found} but coordinator manages {expected}")]
    ComponentMismatch {
        id: String,
        expected: ComponentType,
        found: ComponentType,
    },

    #[error("implementation {id} is already registered for {component}")]
    DuplicateId { id: String, component: ComponentType },
}

/// Errors raised by backends through the lifecycle and capability traits.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    #[error("backend not active: {0}")]
    NotActive(String),

    #[error("backend unavailable: {0}")]
    Unavailable(String),

    #[error("operation failed: {0}")]
    OperationFailed(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("timeout after {0} ms")]
    Timeout(u64),
}

impl From<std::io::Error> for BackendError {
    fn from(error: std::io::Error) -> Self {
        Self::Io(error.to_string())
    }
}
