//! # Failsafe Manager
//!
//! One coordinator per component type, built eagerly at construction so a
//! lookup never creates anything. Owned by whoever constructs it and shared
//! via `Arc`; there is no process-wide instance.

use futures::future::join_all;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{info, warn};

use super::coordinator::{ComponentCoordinator, FailsafeCoordinator};
use crate::config::FailsafeConfig;
use crate::domain::{ComponentType, Implementation, SystemReport, TestResult};
use crate::events::{EventBus, EventEnvelope};
use crate::metrics::{MetricsRecorder, NoOpMetrics};
use crate::ports::{
    CommunicationBackend, CryptoAlgorithm, CryptoBackend, ExecutionBackend, IdentityBackend,
    Lifecycle, NetworkBackend, StorageBackend, StorageMedium,
};

pub type CryptoCoordinator = FailsafeCoordinator<dyn CryptoBackend>;
pub type IdentityCoordinator = FailsafeCoordinator<dyn IdentityBackend>;
pub type StorageCoordinator = FailsafeCoordinator<dyn StorageBackend>;
pub type CommunicationCoordinator = FailsafeCoordinator<dyn CommunicationBackend>;
pub type NetworkCoordinator = FailsafeCoordinator<dyn NetworkBackend>;
pub type ExecutionCoordinator = FailsafeCoordinator<dyn ExecutionBackend>;

/// Self-test results for every implementation, grouped by component.
pub type SystemTestResults = BTreeMap<ComponentType, HashMap<String, TestResult>>;

pub struct FailsafeManager {
    network: Arc<NetworkCoordinator>,
    cryptography: Arc<CryptoCoordinator>,
    storage: Arc<StorageCoordinator>,
    identity: Arc<IdentityCoordinator>,
    communication: Arc<CommunicationCoordinator>,
    execution: Arc<ExecutionCoordinator>,
    events: Arc<EventBus>,
}

impl FailsafeManager {
    pub fn new() -> Self {
        Self::with_config(FailsafeConfig::default())
    }

    pub fn with_config(config: FailsafeConfig) -> Self {
        Self::with_metrics(config, Arc::new(NoOpMetrics))
    }

    /// Manager whose coordinators all report to `metrics`.
    pub fn with_metrics(config: FailsafeConfig, metrics: Arc<dyn MetricsRecorder>) -> Self {
        let events = Arc::new(EventBus::with_capacity(config.event_capacity));

        let manager = Self {
            network: shared_coordinator(ComponentType::Network, &events, &metrics),
            cryptography: shared_coordinator(ComponentType::Cryptography, &events, &metrics),
            storage: shared_coordinator(ComponentType::Storage, &events, &metrics),
            identity: shared_coordinator(ComponentType::Identity, &events, &metrics),
            communication: shared_coordinator(ComponentType::Communication, &events, &metrics),
            execution: shared_coordinator(ComponentType::Execution, &events, &metrics),
            events,
        };
        info!(
            coordinators = ComponentType::ALL.len(),
            event_capacity = config.event_capacity,
            "Failsafe manager initialized"
        );
        manager
    }

    // =========================================================================
    // COORDINATOR LOOKUP
    // =========================================================================

    /// Type-erased coordinator for `component`. Pure lookup.
    pub fn get_coordinator(&self, component: ComponentType) -> Arc<dyn ComponentCoordinator> {
        match component {
            ComponentType::Network => self.network.clone(),
            ComponentType::Cryptography => self.cryptography.clone(),
            ComponentType::Storage => self.storage.clone(),
            ComponentType::Identity => self.identity.clone(),
            ComponentType::Communication => self.communication.clone(),
            ComponentType::Execution => self.execution.clone(),
        }
    }

    /// All coordinators in `ComponentType::ALL` order.
    pub fn coordinators(&self) -> Vec<Arc<dyn ComponentCoordinator>> {
        ComponentType::ALL
            .iter()
            .map(|component| self.get_coordinator(*component))
            .collect()
    }

    pub fn network(&self) -> &Arc<NetworkCoordinator> {
        &self.network
    }

    pub fn cryptography(&self) -> &Arc<CryptoCoordinator> {
        &self.cryptography
    }

    pub fn storage(&self) -> &Arc<StorageCoordinator> {
        &self.storage
    }

    pub fn identity(&self) -> &Arc<IdentityCoordinator> {
        &self.identity
    }

    pub fn communication(&self) -> &Arc<CommunicationCoordinator> {
        &self.communication
    }

    pub fn execution(&self) -> &Arc<ExecutionCoordinator> {
        &self.execution
    }

    // =========================================================================
    // SYSTEM OPERATIONS
    // =========================================================================

    /// Self-test every implementation of every component, all coordinators
    /// concurrently.
    pub async fn test_all(&self) -> SystemTestResults {
        let runs = self.coordinators().into_iter().map(|coordinator| async move {
            let results = coordinator.test_all_implementations().await;
            (coordinator.component_type(), results)
        });
        join_all(runs).await.into_iter().collect()
    }

    /// Snapshot every coordinator into a report.
    ///
    /// Reads bookkeeping only, so it never waits on an in-flight switch.
    pub fn get_failsafe_report(&self) -> SystemReport {
        let snapshots = self
            .coordinators()
            .iter()
            .map(|coordinator| (coordinator.component_type(), coordinator.snapshot()))
            .collect();
        SystemReport::from_snapshots(snapshots)
    }

    /// Force a failover on one component, as if its active backend broke.
    pub async fn simulate_failure(&self, component: ComponentType) -> bool {
        warn!(component = %component, "Simulating component failure");
        self.get_coordinator(component).attempt_failover().await
    }

    /// Deactivate every active implementation, best-effort.
    ///
    /// Returns how many deactivations succeeded.
    pub async fn shutdown(&self) -> usize {
        let runs = self
            .coordinators()
            .into_iter()
            .map(|coordinator| async move { coordinator.deactivate_active().await });
        let deactivated = join_all(runs).await.into_iter().filter(|ok| *ok).count();
        info!(deactivated, "Failsafe manager shut down");
        deactivated
    }

    pub fn events(&self) -> &Arc<EventBus> {
        &self.events
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EventEnvelope> {
        self.events.subscribe()
    }

    // =========================================================================
    // TYPED LOOKUPS
    // =========================================================================

    /// Highest-priority cryptography implementation using `algorithm`.
    pub fn crypto_by_algorithm(
        &self,
        algorithm: CryptoAlgorithm,
    ) -> Option<Implementation<dyn CryptoBackend>> {
        self.cryptography
            .find(|backend| backend.algorithm() == algorithm)
    }

    /// Highest-priority storage implementation on `medium`.
    pub fn storage_by_medium(
        &self,
        medium: StorageMedium,
    ) -> Option<Implementation<dyn StorageBackend>> {
        self.storage.find(|backend| backend.medium() == medium)
    }
}

fn shared_coordinator<B: ?Sized + Lifecycle + 'static>(
    component: ComponentType,
    events: &Arc<EventBus>,
    metrics: &Arc<dyn MetricsRecorder>,
) -> Arc<FailsafeCoordinator<B>> {
    Arc::new(FailsafeCoordinator::with_shared(
        component,
        Arc::clone(events),
        Arc::clone(metrics),
    ))
}

impl Default for FailsafeManager {
    fn default() -> Self {
        Self::new()
    }
}

/// `current_<x>`, `switch_to_<x>` and `available_<x>s` for one component.
macro_rules! component_helpers {
    ($field:ident, $backend:ty, $current:ident, $switch:ident, $available:ident) => {
        impl FailsafeManager {
            /// Backend of the active implementation, if any.
            pub fn $current(&self) -> Option<Arc<$backend>> {
                self.$field.active_backend()
            }

            pub async fn $switch(&self, id: &str) -> bool {
                self.$field.switch_to_implementation(id).await
            }

            /// Registered implementation ids, chain order.
            pub fn $available(&self) -> Vec<String> {
                self.$field.available_implementations()
            }
        }
    };
}

component_helpers!(
    cryptography,
    dyn CryptoBackend,
    current_crypto,
    switch_to_crypto,
    available_cryptos
);
component_helpers!(
    storage,
    dyn StorageBackend,
    current_storage,
    switch_to_storage,
    available_storages
);
component_helpers!(
    identity,
    dyn IdentityBackend,
    current_identity,
    switch_to_identity,
    available_identities
);
component_helpers!(
    communication,
    dyn CommunicationBackend,
    current_communication,
    switch_to_communication,
    available_communications
);
component_helpers!(
    network,
    dyn NetworkBackend,
    current_network,
    switch_to_network,
    available_networks
);
component_helpers!(
    execution,
    dyn ExecutionBackend,
    current_execution,
    switch_to_execution,
    available_executions
);
