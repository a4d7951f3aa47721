//! Scripted backend for tests.
//!
//! [`ScriptedBackend`] implements every capability trait, so one type can be
//! registered with any coordinator. Availability, activation and self-test
//! outcomes are switched at runtime and every lifecycle call is counted.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::domain::{ComponentType, FailsafeStatus, Implementation, ImplementationDescriptor, TestResult};
use crate::error::BackendError;
use crate::ports::{
    ChannelMedium, ChannelMessage, CommunicationBackend, CryptoAlgorithm, CryptoBackend,
    ExecutionBackend, ExecutionEnvironment, ExecutionTask, IdentityBackend, Lifecycle,
    NetworkBackend, NetworkTransport, SealedPayload, SignatureScheme, StorageBackend,
    StorageMedium,
};

/// What `test()` does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptedTest {
    Pass,
    /// `Ok` with `success: false`.
    Fail(String),
    /// `Err(BackendError::OperationFailed)`.
    Error(String),
    Panic(String),
}

pub struct ScriptedBackend {
    available: AtomicBool,
    activate_succeeds: AtomicBool,
    deactivate_fails: AtomicBool,
    active: AtomicBool,
    test_behavior: Mutex<ScriptedTest>,
    activations: AtomicUsize,
    deactivations: AtomicUsize,
    tests_run: AtomicUsize,
    store: Mutex<HashMap<String, Vec<u8>>>,
    queue: Mutex<VecDeque<ChannelMessage>>,
}

impl ScriptedBackend {
    /// Available, activates cleanly, passes its self-test.
    pub fn new() -> Self {
        Self {
            available: AtomicBool::new(true),
            activate_succeeds: AtomicBool::new(true),
            deactivate_fails: AtomicBool::new(false),
            active: AtomicBool::new(false),
            test_behavior: Mutex::new(ScriptedTest::Pass),
            activations: AtomicUsize::new(0),
            deactivations: AtomicUsize::new(0),
            tests_run: AtomicUsize::new(0),
            store: Mutex::new(HashMap::new()),
            queue: Mutex::new(VecDeque::new()),
        }
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    pub fn set_activate_succeeds(&self, succeeds: bool) {
        self.activate_succeeds.store(succeeds, Ordering::SeqCst);
    }

    pub fn set_deactivate_fails(&self, fails: bool) {
        self.deactivate_fails.store(fails, Ordering::SeqCst);
    }

    pub fn set_test(&self, behavior: ScriptedTest) {
        *self.test_behavior.lock() = behavior;
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    pub fn activation_count(&self) -> usize {
        self.activations.load(Ordering::SeqCst)
    }

    pub fn deactivation_count(&self) -> usize {
        self.deactivations.load(Ordering::SeqCst)
    }

    pub fn test_count(&self) -> usize {
        self.tests_run.load(Ordering::SeqCst)
    }

    fn require_active(&self) -> Result<(), BackendError> {
        if self.is_active() {
            Ok(())
        } else {
            Err(BackendError::NotActive("scripted".to_string()))
        }
    }
}

impl Default for ScriptedBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Descriptor with the fields tests usually vary.
pub fn descriptor(
    id: &str,
    component: ComponentType,
    priority: i32,
    status: FailsafeStatus,
) -> ImplementationDescriptor {
    ImplementationDescriptor::new(id, component)
        .with_priority(priority)
        .with_status(status)
}

macro_rules! scripted_constructor {
    ($(#[$doc:meta])* $name:ident, $backend:ty, $component:expr) => {
        $(#[$doc])*
        pub fn $name(
            id: &str,
            priority: i32,
            status: FailsafeStatus,
        ) -> (Implementation<$backend>, Arc<ScriptedBackend>) {
            let backend = Arc::new(ScriptedBackend::new());
            let handle: Arc<$backend> = backend.clone();
            (
                Implementation::new(descriptor(id, $component, priority, status), handle),
                backend,
            )
        }
    };
}

scripted_constructor!(
    /// Cryptography implementation plus the handle to script it.
    scripted_crypto,
    dyn CryptoBackend,
    ComponentType::Cryptography
);
scripted_constructor!(scripted_identity, dyn IdentityBackend, ComponentType::Identity);
scripted_constructor!(scripted_storage, dyn StorageBackend, ComponentType::Storage);
scripted_constructor!(
    scripted_communication,
    dyn CommunicationBackend,
    ComponentType::Communication
);
scripted_constructor!(scripted_network, dyn NetworkBackend, ComponentType::Network);
scripted_constructor!(scripted_execution, dyn ExecutionBackend, ComponentType::Execution);

#[async_trait]
impl Lifecycle for ScriptedBackend {
    async fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    async fn activate(&self) -> bool {
        self.activations.fetch_add(1, Ordering::SeqCst);
        let ok = self.activate_succeeds.load(Ordering::SeqCst);
        self.active.store(ok, Ordering::SeqCst);
        ok
    }

    async fn deactivate(&self) -> Result<(), BackendError> {
        self.deactivations.fetch_add(1, Ordering::SeqCst);
        self.active.store(false, Ordering::SeqCst);
        if self.deactivate_fails.load(Ordering::SeqCst) {
            return Err(BackendError::OperationFailed(
                "scripted deactivate failure".to_string(),
            ));
        }
        Ok(())
    }

    async fn test(&self) -> Result<TestResult, BackendError> {
        self.tests_run.fetch_add(1, Ordering::SeqCst);
        let behavior = self.test_behavior.lock().clone();
        match behavior {
            ScriptedTest::Pass => Ok(TestResult::passed()),
            ScriptedTest::Fail(reason) => Ok(TestResult::failed([reason])),
            ScriptedTest::Error(reason) => Err(BackendError::OperationFailed(reason)),
            ScriptedTest::Panic(reason) => panic!("{reason}"),
        }
    }
}

#[async_trait]
impl CryptoBackend for ScriptedBackend {
    fn algorithm(&self) -> CryptoAlgorithm {
        CryptoAlgorithm::XChaCha20Poly1305
    }

    async fn encrypt(&self, plaintext: &[u8]) -> Result<SealedPayload, BackendError> {
        self.require_active()?;
        Ok(SealedPayload {
            algorithm: self.algorithm(),
            nonce: Vec::new(),
            ciphertext: plaintext.iter().rev().copied().collect(),
        })
    }

    async fn decrypt(&self, sealed: &SealedPayload) -> Result<Vec<u8>, BackendError> {
        self.require_active()?;
        Ok(sealed.ciphertext.iter().rev().copied().collect())
    }
}

#[async_trait]
impl IdentityBackend for ScriptedBackend {
    fn scheme(&self) -> SignatureScheme {
        SignatureScheme::Ed25519
    }

    async fn public_key(&self) -> Result<Vec<u8>, BackendError> {
        self.require_active()?;
        Ok(b"scripted".to_vec())
    }

    async fn sign(&self, message: &[u8]) -> Result<Vec<u8>, BackendError> {
        self.require_active()?;
        Ok(message.iter().rev().copied().collect())
    }

    async fn verify(
        &self,
        _public_key: &[u8],
        message: &[u8],
        signature: &[u8],
    ) -> Result<bool, BackendError> {
        Ok(message.iter().rev().eq(signature.iter()))
    }
}

#[async_trait]
impl StorageBackend for ScriptedBackend {
    fn medium(&self) -> StorageMedium {
        StorageMedium::Memory
    }

    async fn put(&self, key: &str, value: &[u8]) -> Result<(), BackendError> {
        self.require_active()?;
        self.store.lock().insert(key.to_string(), value.to_vec());
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, BackendError> {
        self.require_active()?;
        Ok(self.store.lock().get(key).cloned())
    }

    async fn delete(&self, key: &str) -> Result<bool, BackendError> {
        self.require_active()?;
        Ok(self.store.lock().remove(key).is_some())
    }
}

#[async_trait]
impl CommunicationBackend for ScriptedBackend {
    fn medium(&self) -> ChannelMedium {
        ChannelMedium::Queue
    }

    async fn send(&self, message: ChannelMessage) -> Result<(), BackendError> {
        self.require_active()?;
        self.queue.lock().push_back(message);
        Ok(())
    }

    async fn receive(&self) -> Result<Option<ChannelMessage>, BackendError> {
        self.require_active()?;
        Ok(self.queue.lock().pop_front())
    }
}

#[async_trait]
impl NetworkBackend for ScriptedBackend {
    fn transport(&self) -> NetworkTransport {
        NetworkTransport::Tcp
    }

    async fn probe(&self, _endpoint: &str) -> Result<Duration, BackendError> {
        self.require_active()?;
        Ok(Duration::ZERO)
    }
}

#[async_trait]
impl ExecutionBackend for ScriptedBackend {
    fn environment(&self) -> ExecutionEnvironment {
        ExecutionEnvironment::Inline
    }

    async fn execute(&self, task: ExecutionTask) -> Result<Vec<u8>, BackendError> {
        self.require_active()?;
        task()
    }
}
