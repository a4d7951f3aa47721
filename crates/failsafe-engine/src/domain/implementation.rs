//! Implementation records.
//!
//! An [`Implementation`] pairs the metadata the coordinator orders and
//! reports on ([`ImplementationDescriptor`]) with a statically-typed backend
//! handle. The coordinator never looks inside the backend beyond the
//! [`Lifecycle`](crate::ports::Lifecycle) contract.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use super::component::ComponentType;
use super::status::{FailsafeStatus, Strategy};

/// Metadata for one pluggable backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImplementationDescriptor {
    /// Unique within its coordinator.
    pub id: String,
    pub name: String,
    pub component: ComponentType,
    pub description: String,
    /// Higher is preferred.
    pub priority: i32,
    pub strategy: Strategy,
    /// Status the coordinator adopts when this implementation is activated.
    pub status: FailsafeStatus,
}

impl ImplementationDescriptor {
    /// Descriptor with default metadata (priority 0, `Default` tier, `Online`).
    pub fn new(id: impl Into<String>, component: ComponentType) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            component,
            description: String::new(),
            priority: 0,
            strategy: Strategy::Default,
            status: FailsafeStatus::Online,
        }
    }

    /// Builder-style display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Builder-style description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Builder-style priority.
    #[must_use]
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Builder-style strategy tier.
    #[must_use]
    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Builder-style activation status.
    #[must_use]
    pub fn with_status(mut self, status: FailsafeStatus) -> Self {
        self.status = status;
        self
    }
}

/// A registered backend: descriptor plus typed handle.
///
/// `B` is the component's capability trait object (for example
/// `dyn CryptoBackend`), so each coordinator only ever holds backends of the
/// right capability set.
pub struct Implementation<B: ?Sized> {
    descriptor: ImplementationDescriptor,
    backend: Arc<B>,
}

impl<B: ?Sized> Implementation<B> {
    pub fn new(descriptor: ImplementationDescriptor, backend: Arc<B>) -> Self {
        Self {
            descriptor,
            backend,
        }
    }

    pub fn id(&self) -> &str {
        &self.descriptor.id
    }

    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    pub fn component(&self) -> ComponentType {
        self.descriptor.component
    }

    pub fn priority(&self) -> i32 {
        self.descriptor.priority
    }

    pub fn strategy(&self) -> Strategy {
        self.descriptor.strategy
    }

    pub fn status(&self) -> FailsafeStatus {
        self.descriptor.status
    }

    pub fn descriptor(&self) -> &ImplementationDescriptor {
        &self.descriptor
    }

    /// Shared handle to the backend.
    pub fn backend(&self) -> &Arc<B> {
        &self.backend
    }
}

impl<B: ?Sized> Clone for Implementation<B> {
    fn clone(&self) -> Self {
        Self {
            descriptor: self.descriptor.clone(),
            backend: Arc::clone(&self.backend),
        }
    }
}

impl<B: ?Sized> fmt::Debug for Implementation<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Implementation")
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}
