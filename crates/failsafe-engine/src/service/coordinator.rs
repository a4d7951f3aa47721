//! # Failsafe Coordinator
//!
//! Owns every implementation of one component type and decides which one is
//! active.
//!
//! ## Locking
//!
//! Two locks, with different jobs:
//!
//! - `mutation` (async mutex): serialises register / unregister / switch /
//!   failover. It is held across backend calls, so two concurrent switches can
//!   never both deactivate the same previous implementation.
//! - `state` (sync RwLock): guards the bookkeeping. Never held across an
//!   `.await`, so status reads and reports do not wait on a slow backend.
//!
//! ## Status transitions
//!
//! ```text
//! ONLINE ──switch ok to X──→ X.status
//!    │
//!    ├──activate() false──→ DEGRADED, no active implementation
//!    │
//!    └──unregister active, no usable fallback──→ OFFLINE
//! ```
//!
//! Nothing promotes back toward a higher-priority implementation
//! automatically; recovery is an explicit `switch_to_implementation`.

use async_trait::async_trait;
use futures::future::join_all;
use futures::FutureExt;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::domain::{
    ComponentSnapshot, ComponentType, FailsafeStatus, FallbackChain, Implementation, TestResult,
};
use crate::error::RegistrationError;
use crate::events::{EventBus, FailsafeEvent, SwitchFailure};
use crate::metrics::{FailoverOutcome, MetricsRecorder, NoOpMetrics};
use crate::ports::Lifecycle;

struct CoordinatorState<B: ?Sized> {
    implementations: HashMap<String, Implementation<B>>,
    chain: FallbackChain,
    active: Option<String>,
    status: FailsafeStatus,
}

/// Coordinator for one component type, generic over its capability trait.
pub struct FailsafeCoordinator<B: ?Sized> {
    component: ComponentType,
    state: RwLock<CoordinatorState<B>>,
    mutation: Mutex<()>,
    events: Arc<EventBus>,
    metrics: Arc<dyn MetricsRecorder>,
}

impl<B: ?Sized + Lifecycle + 'static> FailsafeCoordinator<B> {
    /// Standalone coordinator with its own event bus and no metrics.
    pub fn new(component: ComponentType) -> Self {
        Self::with_shared(component, Arc::new(EventBus::new()), Arc::new(NoOpMetrics))
    }

    /// Coordinator publishing to a shared bus and recorder.
    ///
    /// The initial ONLINE status is reported to `metrics` immediately, so a
    /// component that never changes status still has a reading.
    pub fn with_shared(
        component: ComponentType,
        events: Arc<EventBus>,
        metrics: Arc<dyn MetricsRecorder>,
    ) -> Self {
        metrics.record_status(component, FailsafeStatus::Online);
        Self {
            component,
            state: RwLock::new(CoordinatorState {
                implementations: HashMap::new(),
                chain: FallbackChain::new(),
                active: None,
                status: FailsafeStatus::Online,
            }),
            mutation: Mutex::new(()),
            events,
            metrics,
        }
    }

    pub fn component_type(&self) -> ComponentType {
        self.component
    }

    // =========================================================================
    // REGISTRATION
    // =========================================================================

    /// Add an implementation to the fallback chain.
    ///
    /// A mismatched component type or duplicate id is logged and rejected
    /// without touching state. If nothing is active, the new implementation
    /// becomes the active pointer; `activate()` is NOT called.
    pub async fn register_implementation(
        &self,
        implementation: Implementation<B>,
    ) -> Result<(), RegistrationError> {
        let _guard = self.mutation.lock().await;

        let rejection = if implementation.component() != self.component {
            Some(RegistrationError::ComponentMismatch {
                id: implementation.id().to_string(),
                expected: self.component,
                found: implementation.component(),
            })
        } else if self
            .state
            .read()
            .implementations
            .contains_key(implementation.id())
        {
            Some(RegistrationError::DuplicateId {
                id: implementation.id().to_string(),
                component: self.component,
            })
        } else {
            None
        };

        if let Some(rejection) = rejection {
            warn!(
                component = %self.component,
                implementation = implementation.id(),
                reason = %rejection,
                "Rejected implementation registration"
            );
            self.events.publish(FailsafeEvent::RegistrationRejected {
                component: self.component,
                id: implementation.id().to_string(),
                reason: rejection.to_string(),
            });
            return Err(rejection);
        }

        let id = implementation.id().to_string();
        let priority = implementation.priority();
        let became_active = {
            let mut state = self.state.write();
            state.chain.insert(id.clone(), priority);
            state.implementations.insert(id.clone(), implementation);
            if state.active.is_none() {
                state.active = Some(id.clone());
                true
            } else {
                false
            }
        };

        info!(
            component = %self.component,
            implementation = %id,
            priority,
            active = became_active,
            "Registered implementation"
        );
        self.events.publish(FailsafeEvent::ImplementationRegistered {
            component: self.component,
            id,
            priority,
        });
        Ok(())
    }

    /// Remove an implementation. Returns `false` for an unknown id.
    ///
    /// Removing the active implementation deactivates it (best-effort) and
    /// tries the new chain head. If there is no head, or switching to it
    /// fails, the coordinator goes OFFLINE with nothing active.
    pub async fn unregister_implementation(&self, id: &str) -> bool {
        let _guard = self.mutation.lock().await;

        let (removed, was_active, next) = {
            let mut state = self.state.write();
            let Some(removed) = state.implementations.remove(id) else {
                debug!(component = %self.component, implementation = id, "Unregister of unknown implementation");
                return false;
            };
            state.chain.remove(id);
            let was_active = state.active.as_deref() == Some(id);
            if was_active {
                state.active = None;
            }
            let next = state.chain.head().map(str::to_string);
            (removed, was_active, next)
        };

        info!(
            component = %self.component,
            implementation = id,
            was_active,
            "Unregistered implementation"
        );
        self.events.publish(FailsafeEvent::ImplementationUnregistered {
            component: self.component,
            id: id.to_string(),
            was_active,
        });

        if !was_active {
            return true;
        }

        if let Err(e) = removed.backend().deactivate().await {
            warn!(
                component = %self.component,
                implementation = id,
                error = %e,
                "Deactivation of removed implementation failed"
            );
        }

        let promoted = match next {
            Some(next) => self.switch_locked(&next).await,
            None => false,
        };

        if !promoted {
            error!(
                component = %self.component,
                "No usable implementation remains after unregister; component is offline"
            );
            let mut state = self.state.write();
            state.active = None;
            self.set_status(&mut state, FailsafeStatus::Offline);
        }
        true
    }

    // =========================================================================
    // SWITCHING
    // =========================================================================

    /// Make `id` the active implementation.
    ///
    /// Returns `false` without touching state for an unknown or unavailable
    /// target. Once the previous implementation has been deactivated, a
    /// failed `activate()` leaves nothing active and the status DEGRADED;
    /// there is no rollback.
    pub async fn switch_to_implementation(&self, id: &str) -> bool {
        let _guard = self.mutation.lock().await;
        self.switch_locked(id).await
    }

    /// Move to the next lower-priority implementation in the chain.
    ///
    /// Returns `false` when nothing is active or the active implementation
    /// is last in the chain; that exhaustion needs an operator.
    pub async fn attempt_failover(&self) -> bool {
        let _guard = self.mutation.lock().await;

        let (active, next) = {
            let state = self.state.read();
            let next = state
                .active
                .as_deref()
                .and_then(|active| state.chain.next_after(active))
                .map(str::to_string);
            (state.active.clone(), next)
        };

        let Some(next) = next else {
            error!(
                component = %self.component,
                active = ?active,
                "Failover exhausted: no lower-priority implementation available"
            );
            self.metrics.record_failover(self.component, FailoverOutcome::Exhausted);
            self.events.publish(FailsafeEvent::FailoverExhausted {
                component: self.component,
                active,
            });
            return false;
        };

        warn!(
            component = %self.component,
            from = ?active,
            to = %next,
            "Attempting failover"
        );
        let switched = self.switch_locked(&next).await;
        let outcome = if switched {
            FailoverOutcome::Switched
        } else {
            FailoverOutcome::SwitchFailed
        };
        self.metrics.record_failover(self.component, outcome);
        switched
    }

    /// Switch body. Caller holds `mutation`.
    async fn switch_locked(&self, id: &str) -> bool {
        let lookup = {
            let state = self.state.read();
            state.implementations.get(id).cloned().map(|target| {
                let previous = state
                    .active
                    .as_deref()
                    .filter(|active| *active != id)
                    .and_then(|active| state.implementations.get(active).cloned());
                (target, previous)
            })
        };

        let Some((target, previous)) = lookup else {
            warn!(component = %self.component, implementation = id, "Switch to unknown implementation");
            self.switch_failed(id, SwitchFailure::UnknownImplementation);
            return false;
        };

        if !target.backend().is_available().await {
            warn!(
                component = %self.component,
                implementation = id,
                "Switch aborted: implementation unavailable"
            );
            self.switch_failed(id, SwitchFailure::Unavailable);
            return false;
        }

        if let Some(previous) = &previous {
            if let Err(e) = previous.backend().deactivate().await {
                warn!(
                    component = %self.component,
                    implementation = previous.id(),
                    error = %e,
                    "Deactivation failed; continuing switch"
                );
            }
        }

        if !target.backend().activate().await {
            error!(
                component = %self.component,
                implementation = id,
                "Activation failed; no confirmed active implementation"
            );
            {
                let mut state = self.state.write();
                state.active = None;
                self.set_status(&mut state, FailsafeStatus::Degraded);
            }
            self.metrics.record_activation_failure(self.component);
            self.switch_failed(id, SwitchFailure::ActivationFailed);
            return false;
        }

        let from = {
            let mut state = self.state.write();
            let from = state.active.replace(id.to_string());
            self.set_status(&mut state, target.status());
            from
        };

        info!(
            component = %self.component,
            from = ?from,
            to = id,
            status = %target.status(),
            "Switched active implementation"
        );
        self.metrics.record_switch(self.component, true);
        self.events.publish(FailsafeEvent::ImplementationSwitched {
            component: self.component,
            from,
            to: id.to_string(),
        });
        true
    }

    fn switch_failed(&self, id: &str, reason: SwitchFailure) {
        self.metrics.record_switch(self.component, false);
        self.events.publish(FailsafeEvent::SwitchFailed {
            component: self.component,
            id: id.to_string(),
            reason,
        });
    }

    fn set_status(&self, state: &mut CoordinatorState<B>, status: FailsafeStatus) {
        if state.status == status {
            return;
        }
        let from = std::mem::replace(&mut state.status, status);
        self.metrics.record_status(self.component, status);
        self.events.publish(FailsafeEvent::StatusChanged {
            component: self.component,
            from,
            to: status,
        });
    }

    /// Deactivate the active implementation for shutdown.
    ///
    /// Bookkeeping is left as is. Returns whether a deactivation succeeded.
    pub async fn deactivate_active(&self) -> bool {
        let _guard = self.mutation.lock().await;
        let active = self.active_implementation();
        let Some(active) = active else {
            return false;
        };
        match active.backend().deactivate().await {
            Ok(()) => {
                debug!(component = %self.component, implementation = active.id(), "Deactivated for shutdown");
                true
            }
            Err(e) => {
                warn!(
                    component = %self.component,
                    implementation = active.id(),
                    error = %e,
                    "Shutdown deactivation failed"
                );
                false
            }
        }
    }

    // =========================================================================
    // HEALTH
    // =========================================================================

    /// Run every implementation's self-test concurrently.
    ///
    /// Returns exactly one result per registered implementation. An `Err` or
    /// a panic from `test()` becomes `{success: false, errors: [...]}`. Tests
    /// never change which implementation is active.
    pub async fn test_all_implementations(&self) -> HashMap<String, TestResult> {
        let implementations: Vec<Implementation<B>> = {
            let state = self.state.read();
            state
                .chain
                .ids()
                .iter()
                .filter_map(|id| state.implementations.get(id).cloned())
                .collect()
        };

        let component = self.component;
        let runs = implementations.into_iter().map(|implementation| async move {
            let started = Instant::now();
            let outcome = AssertUnwindSafe(implementation.backend().test())
                .catch_unwind()
                .await;

            let result = match outcome {
                Ok(Ok(result)) if result.latency_ms.is_some() => result,
                Ok(Ok(result)) => result.with_latency(started.elapsed()),
                Ok(Err(e)) => TestResult::failed([e.to_string()]).with_latency(started.elapsed()),
                Err(panic) => TestResult::failed([format!(
                    "self-test panicked: {}",
                    panic_message(panic.as_ref())
                )]),
            };

            if !result.success {
                warn!(
                    component = %component,
                    implementation = implementation.id(),
                    errors = ?result.error_list(),
                    "Self-test failed"
                );
            }
            (implementation.id().to_string(), result)
        });

        let results: HashMap<String, TestResult> = join_all(runs).await.into_iter().collect();
        for result in results.values() {
            self.metrics.record_self_test(component, result.success);
        }
        results
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    /// Stored status. Only switch, failover and unregister change it.
    pub fn get_status(&self) -> FailsafeStatus {
        self.state.read().status
    }

    pub fn active_implementation_id(&self) -> Option<String> {
        self.state.read().active.clone()
    }

    /// The active implementation record.
    pub fn active_implementation(&self) -> Option<Implementation<B>> {
        let state = self.state.read();
        state
            .active
            .as_deref()
            .and_then(|id| state.implementations.get(id).cloned())
    }

    /// Backend of the active implementation.
    pub fn active_backend(&self) -> Option<Arc<B>> {
        self.active_implementation()
            .map(|implementation| Arc::clone(implementation.backend()))
    }

    pub fn implementation(&self, id: &str) -> Option<Implementation<B>> {
        self.state.read().implementations.get(id).cloned()
    }

    /// First implementation in chain order whose backend matches.
    pub fn find<F>(&self, predicate: F) -> Option<Implementation<B>>
    where
        F: Fn(&B) -> bool,
    {
        let state = self.state.read();
        state
            .chain
            .ids()
            .iter()
            .filter_map(|id| state.implementations.get(id))
            .find(|implementation| predicate(implementation.backend().as_ref()))
            .cloned()
    }

    /// Registered ids in chain order.
    pub fn available_implementations(&self) -> Vec<String> {
        self.state.read().chain.ids()
    }

    pub fn fallback_chain(&self) -> Vec<String> {
        self.available_implementations()
    }

    pub fn len(&self) -> usize {
        self.state.read().implementations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn snapshot(&self) -> ComponentSnapshot {
        let state = self.state.read();
        ComponentSnapshot {
            status: state.status,
            active_implementation: state.active.clone(),
            available_implementations: state.chain.ids(),
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// Type-erased view of a coordinator, for code that works across component
/// types (the manager, reports, the CLI).
#[async_trait]
pub trait ComponentCoordinator: Send + Sync {
    fn component_type(&self) -> ComponentType;

    fn get_status(&self) -> FailsafeStatus;

    fn active_implementation_id(&self) -> Option<String>;

    fn available_implementations(&self) -> Vec<String>;

    fn snapshot(&self) -> ComponentSnapshot;

    async fn switch_to_implementation(&self, id: &str) -> bool;

    async fn unregister_implementation(&self, id: &str) -> bool;

    async fn attempt_failover(&self) -> bool;

    async fn test_all_implementations(&self) -> HashMap<String, TestResult>;

    async fn deactivate_active(&self) -> bool;
}

#[async_trait]
impl<B: ?Sized + Lifecycle + 'static> ComponentCoordinator for FailsafeCoordinator<B> {
    fn component_type(&self) -> ComponentType {
        self.component
    }

    fn get_status(&self) -> FailsafeStatus {
        FailsafeCoordinator::get_status(self)
    }

    fn active_implementation_id(&self) -> Option<String> {
        FailsafeCoordinator::active_implementation_id(self)
    }

    fn available_implementations(&self) -> Vec<String> {
        FailsafeCoordinator::available_implementations(self)
    }

    fn snapshot(&self) -> ComponentSnapshot {
        FailsafeCoordinator::snapshot(self)
    }

    async fn switch_to_implementation(&self, id: &str) -> bool {
        FailsafeCoordinator::switch_to_implementation(self, id).await
    }

    async fn unregister_implementation(&self, id: &str) -> bool {
        FailsafeCoordinator::unregister_implementation(self, id).await
    }

    async fn attempt_failover(&self) -> bool {
        FailsafeCoordinator::attempt_failover(self).await
    }

    async fn test_all_implementations(&self) -> HashMap<String, TestResult> {
        FailsafeCoordinator::test_all_implementations(self).await
    }

    async fn deactivate_active(&self) -> bool {
        FailsafeCoordinator::deactivate_active(self).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ImplementationDescriptor, Strategy};
    use crate::metrics::Metrics;
    use crate::ports::CryptoBackend;
    use crate::test_utils::{scripted_crypto, ScriptedBackend, ScriptedTest};

    type CryptoCoordinator = FailsafeCoordinator<dyn CryptoBackend>;

    fn crypto_impl(
        id: &str,
        priority: i32,
        status: FailsafeStatus,
    ) -> (Implementation<dyn CryptoBackend>, Arc<ScriptedBackend>) {
        scripted_crypto(id, priority, status)
    }

    async fn coordinator_with_a_b() -> (CryptoCoordinator, Arc<ScriptedBackend>, Arc<ScriptedBackend>) {
        let coordinator = CryptoCoordinator::new(ComponentType::Cryptography);
        let (a, a_backend) = crypto_impl("a", 100, FailsafeStatus::Online);
        let (b, b_backend) = crypto_impl("b", 80, FailsafeStatus::Fallback);
        coordinator.register_implementation(a).await.unwrap();
        coordinator.register_implementation(b).await.unwrap();
        (coordinator, a_backend, b_backend)
    }

    #[tokio::test]
    async fn test_register_sets_pointer_without_activating() {
        let coordinator = CryptoCoordinator::new(ComponentType::Cryptography);
        let (a, a_backend) = crypto_impl("a", 100, FailsafeStatus::Online);

        coordinator.register_implementation(a).await.unwrap();

        assert_eq!(coordinator.active_implementation_id().as_deref(), Some("a"));
        assert_eq!(a_backend.activation_count(), 0);
        assert_eq!(coordinator.get_status(), FailsafeStatus::Online);
    }

    #[tokio::test]
    async fn test_register_rejects_component_mismatch() {
        let coordinator = CryptoCoordinator::new(ComponentType::Cryptography);
        let backend: Arc<dyn CryptoBackend> = Arc::new(ScriptedBackend::new());
        let wrong = Implementation::new(
            ImplementationDescriptor::new("disk", ComponentType::Storage),
            backend,
        );

        let result = coordinator.register_implementation(wrong).await;

        assert!(matches!(
            result,
            Err(RegistrationError::ComponentMismatch { .. })
        ));
        assert!(coordinator.is_empty());
        assert_eq!(coordinator.active_implementation_id(), None);
    }

    #[tokio::test]
    async fn test_register_rejects_duplicate_id() {
        let coordinator = CryptoCoordinator::new(ComponentType::Cryptography);
        let (first, _) = crypto_impl("a", 100, FailsafeStatus::Online);
        let (second, _) = crypto_impl("a", 10, FailsafeStatus::Online);

        coordinator.register_implementation(first).await.unwrap();
        let result = coordinator.register_implementation(second).await;

        assert!(matches!(result, Err(RegistrationError::DuplicateId { .. })));
        assert_eq!(coordinator.len(), 1);
        assert_eq!(coordinator.implementation("a").unwrap().priority(), 100);
    }

    #[tokio::test]
    async fn test_higher_priority_registration_changes_head_not_active() {
        let coordinator = CryptoCoordinator::new(ComponentType::Cryptography);
        let (low, _) = crypto_impl("low", 10, FailsafeStatus::Online);
        let (high, high_backend) = crypto_impl("high", 99, FailsafeStatus::Online);

        coordinator.register_implementation(low).await.unwrap();
        coordinator.register_implementation(high).await.unwrap();

        assert_eq!(coordinator.fallback_chain(), vec!["high", "low"]);
        assert_eq!(coordinator.active_implementation_id().as_deref(), Some("low"));
        assert_eq!(high_backend.activation_count(), 0);
    }

    #[tokio::test]
    async fn test_switch_deactivates_previous_and_activates_target() {
        let (coordinator, a, b) = coordinator_with_a_b().await;
        assert_eq!(coordinator.fallback_chain(), vec!["a", "b"]);

        assert!(coordinator.switch_to_implementation("b").await);

        assert_eq!(coordinator.active_implementation_id().as_deref(), Some("b"));
        assert_eq!(coordinator.get_status(), FailsafeStatus::Fallback);
        assert_eq!(a.deactivation_count(), 1);
        assert_eq!(b.activation_count(), 1);
    }

    #[tokio::test]
    async fn test_switch_to_unknown_returns_false() {
        let (coordinator, _, _) = coordinator_with_a_b().await;
        assert!(!coordinator.switch_to_implementation("missing").await);
        assert_eq!(coordinator.active_implementation_id().as_deref(), Some("a"));
    }

    #[tokio::test]
    async fn test_switch_to_unavailable_mutates_nothing() {
        let (coordinator, a, b) = coordinator_with_a_b().await;
        b.set_available(false);

        assert!(!coordinator.switch_to_implementation("b").await);

        assert_eq!(coordinator.active_implementation_id().as_deref(), Some("a"));
        assert_eq!(coordinator.get_status(), FailsafeStatus::Online);
        assert_eq!(a.deactivation_count(), 0);
        assert_eq!(b.activation_count(), 0);
    }

    #[tokio::test]
    async fn test_activation_failure_leaves_degraded_without_active() {
        let (coordinator, a, b) = coordinator_with_a_b().await;
        b.set_activate_succeeds(false);

        assert!(!coordinator.switch_to_implementation("b").await);

        assert_eq!(a.deactivation_count(), 1);
        assert_eq!(coordinator.active_implementation_id(), None);
        assert_eq!(coordinator.get_status(), FailsafeStatus::Degraded);
    }

    #[tokio::test]
    async fn test_deactivate_error_does_not_block_switch() {
        let (coordinator, a, _) = coordinator_with_a_b().await;
        a.set_deactivate_fails(true);

        assert!(coordinator.switch_to_implementation("b").await);
        assert_eq!(coordinator.active_implementation_id().as_deref(), Some("b"));
    }

    #[tokio::test]
    async fn test_failover_moves_down_chain_then_exhausts() {
        let (coordinator, _, _) = coordinator_with_a_b().await;

        assert!(coordinator.attempt_failover().await);
        assert_eq!(coordinator.active_implementation_id().as_deref(), Some("b"));

        assert!(!coordinator.attempt_failover().await);
        assert_eq!(coordinator.active_implementation_id().as_deref(), Some("b"));
    }

    #[tokio::test]
    async fn test_failover_single_implementation_false() {
        let coordinator = CryptoCoordinator::new(ComponentType::Cryptography);
        let (a, _) = crypto_impl("a", 100, FailsafeStatus::Online);
        coordinator.register_implementation(a).await.unwrap();

        assert!(!coordinator.attempt_failover().await);
    }

    #[tokio::test]
    async fn test_failover_without_active_false() {
        let coordinator = CryptoCoordinator::new(ComponentType::Cryptography);
        assert!(!coordinator.attempt_failover().await);
    }

    #[tokio::test]
    async fn test_unregister_active_promotes_available_alternative() {
        let (coordinator, _, b) = coordinator_with_a_b().await;

        assert!(coordinator.unregister_implementation("a").await);

        assert_eq!(coordinator.active_implementation_id().as_deref(), Some("b"));
        assert_eq!(coordinator.get_status(), FailsafeStatus::Fallback);
        assert_eq!(b.activation_count(), 1);
    }

    #[tokio::test]
    async fn test_unregister_active_with_unavailable_alternative_goes_offline() {
        let (coordinator, _, b) = coordinator_with_a_b().await;
        b.set_available(false);

        assert!(coordinator.unregister_implementation("a").await);

        assert_eq!(coordinator.active_implementation_id(), None);
        assert_eq!(coordinator.get_status(), FailsafeStatus::Offline);
    }

    #[tokio::test]
    async fn test_unregister_sole_implementation_goes_offline() {
        let coordinator = CryptoCoordinator::new(ComponentType::Cryptography);
        let (a, a_backend) = crypto_impl("a", 100, FailsafeStatus::Online);
        coordinator.register_implementation(a).await.unwrap();

        assert!(coordinator.unregister_implementation("a").await);

        assert_eq!(coordinator.active_implementation_id(), None);
        assert_eq!(coordinator.get_status(), FailsafeStatus::Offline);
        assert_eq!(a_backend.deactivation_count(), 1);
        assert!(coordinator.fallback_chain().is_empty());
    }

    #[tokio::test]
    async fn test_unregister_inactive_keeps_active() {
        let (coordinator, _, _) = coordinator_with_a_b().await;

        assert!(coordinator.unregister_implementation("b").await);
        assert!(!coordinator.unregister_implementation("b").await);

        assert_eq!(coordinator.active_implementation_id().as_deref(), Some("a"));
        assert_eq!(coordinator.fallback_chain(), vec!["a"]);
    }

    #[tokio::test]
    async fn test_register_after_offline_sets_pointer_keeps_status() {
        let coordinator = CryptoCoordinator::new(ComponentType::Cryptography);
        let (a, _) = crypto_impl("a", 100, FailsafeStatus::Online);
        coordinator.register_implementation(a).await.unwrap();
        coordinator.unregister_implementation("a").await;

        let (b, _) = crypto_impl("b", 50, FailsafeStatus::Online);
        coordinator.register_implementation(b).await.unwrap();

        assert_eq!(coordinator.active_implementation_id().as_deref(), Some("b"));
        assert_eq!(coordinator.get_status(), FailsafeStatus::Offline);

        assert!(coordinator.switch_to_implementation("b").await);
        assert_eq!(coordinator.get_status(), FailsafeStatus::Online);
    }

    #[tokio::test]
    async fn test_tests_isolated_and_complete() {
        let coordinator = CryptoCoordinator::new(ComponentType::Cryptography);
        let (pass, _) = crypto_impl("pass", 100, FailsafeStatus::Online);
        let (fail, fail_backend) = crypto_impl("fail", 90, FailsafeStatus::Online);
        let (error, error_backend) = crypto_impl("error", 80, FailsafeStatus::Online);
        let (panics, panic_backend) = crypto_impl("panics", 70, FailsafeStatus::Online);
        fail_backend.set_test(ScriptedTest::Fail("mismatch".to_string()));
        error_backend.set_test(ScriptedTest::Error("io".to_string()));
        panic_backend.set_test(ScriptedTest::Panic("boom".to_string()));

        for implementation in [pass, fail, error, panics] {
            coordinator.register_implementation(implementation).await.unwrap();
        }

        let results = coordinator.test_all_implementations().await;

        assert_eq!(results.len(), 4);
        assert!(results["pass"].success);
        assert!(!results["fail"].success);
        assert!(!results["error"].success);
        assert!(!results["panics"].success);
        assert!(results["panics"].error_list()[0].contains("boom"));
        assert!(results["pass"].latency_ms.is_some());
        assert_eq!(coordinator.active_implementation_id().as_deref(), Some("pass"));
    }

    #[tokio::test]
    async fn test_status_unaffected_by_test_results() {
        let (coordinator, a, _) = coordinator_with_a_b().await;
        a.set_test(ScriptedTest::Fail("broken".to_string()));

        coordinator.test_all_implementations().await;

        assert_eq!(coordinator.get_status(), FailsafeStatus::Online);
    }

    #[tokio::test]
    async fn test_find_by_capability() {
        let (coordinator, _, _) = coordinator_with_a_b().await;
        let found = coordinator
            .find(|backend| backend.algorithm() == crate::ports::CryptoAlgorithm::XChaCha20Poly1305);
        assert_eq!(found.unwrap().id(), "a");
    }

    #[tokio::test]
    async fn test_events_and_metrics_recorded() {
        let events = Arc::new(EventBus::new());
        let metrics = Arc::new(Metrics::new());
        let coordinator = CryptoCoordinator::with_shared(
            ComponentType::Cryptography,
            Arc::clone(&events),
            metrics.clone(),
        );
        let mut rx = events.subscribe();

        let (a, _) = crypto_impl("a", 100, FailsafeStatus::Online);
        let (b, _) = crypto_impl("b", 80, FailsafeStatus::Emergency);
        coordinator.register_implementation(a).await.unwrap();
        coordinator.register_implementation(b).await.unwrap();
        assert!(coordinator.attempt_failover().await);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.failovers_succeeded, 1);
        assert_eq!(snapshot.switches_succeeded, 1);
        assert_eq!(snapshot.failovers_exhausted, 0);
        // Construction plus the ONLINE -> EMERGENCY change.
        assert_eq!(snapshot.status_reports, 2);

        let mut kinds = Vec::new();
        while let Ok(envelope) = rx.try_recv() {
            kinds.push(envelope.event);
        }
        assert!(kinds.contains(&FailsafeEvent::StatusChanged {
            component: ComponentType::Cryptography,
            from: FailsafeStatus::Online,
            to: FailsafeStatus::Emergency,
        }));
    }

    #[tokio::test]
    async fn test_failover_outcomes_counted_apart() {
        let metrics = Arc::new(Metrics::new());
        let coordinator = CryptoCoordinator::with_shared(
            ComponentType::Cryptography,
            Arc::new(EventBus::new()),
            metrics.clone(),
        );
        let (a, _) = crypto_impl("a", 100, FailsafeStatus::Online);
        let (b, b_backend) = crypto_impl("b", 80, FailsafeStatus::Fallback);
        coordinator.register_implementation(a).await.unwrap();
        coordinator.register_implementation(b).await.unwrap();

        b_backend.set_available(false);
        assert!(!coordinator.attempt_failover().await);
        b_backend.set_available(true);
        assert!(coordinator.attempt_failover().await);
        assert!(!coordinator.attempt_failover().await);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.failovers_failed, 1);
        assert_eq!(snapshot.failovers_succeeded, 1);
        assert_eq!(snapshot.failovers_exhausted, 1);
    }

    #[tokio::test]
    async fn test_initial_status_reported_on_construction() {
        let metrics = Arc::new(Metrics::new());
        let _coordinator = CryptoCoordinator::with_shared(
            ComponentType::Cryptography,
            Arc::new(EventBus::new()),
            metrics.clone(),
        );
        assert_eq!(metrics.snapshot().status_reports, 1);
    }

    #[tokio::test]
    async fn test_concurrent_switches_serialized() {
        let coordinator = Arc::new(CryptoCoordinator::new(ComponentType::Cryptography));
        let mut backends = Vec::new();
        for (id, priority) in [("a", 100), ("b", 80), ("c", 60)] {
            let (implementation, backend) = crypto_impl(id, priority, FailsafeStatus::Online);
            coordinator.register_implementation(implementation).await.unwrap();
            backends.push(backend);
        }

        let first = tokio::spawn({
            let coordinator = Arc::clone(&coordinator);
            async move { coordinator.switch_to_implementation("b").await }
        });
        let second = tokio::spawn({
            let coordinator = Arc::clone(&coordinator);
            async move { coordinator.switch_to_implementation("c").await }
        });
        assert!(first.await.unwrap());
        assert!(second.await.unwrap());

        // "a" is deactivated exactly once, by whichever switch ran first.
        assert_eq!(backends[0].deactivation_count(), 1);
        let active = coordinator.active_implementation_id().unwrap();
        assert!(active == "b" || active == "c");
        let total_deactivations: usize = backends.iter().map(|b| b.deactivation_count()).sum();
        assert_eq!(total_deactivations, 2);
    }

    #[test]
    fn test_strategy_is_metadata_only() {
        let descriptor = ImplementationDescriptor::new("x", ComponentType::Cryptography)
            .with_strategy(Strategy::LastResort)
            .with_priority(500);
        assert_eq!(descriptor.strategy, Strategy::LastResort);
    }
}
