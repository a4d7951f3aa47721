//! In-memory emergency storage. Contents are lost on deactivation.

use async_trait::async_trait;
use failsafe_engine::{
    BackendError, ComponentType, FailsafeStatus, Implementation, ImplementationDescriptor,
    Lifecycle, StorageBackend, StorageMedium, Strategy, TestResult,
};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

pub const ID: &str = "memory";

#[derive(Default)]
pub struct MemoryStorage {
    entries: RwLock<Option<HashMap<String, Vec<u8>>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().as_ref().map_or(0, HashMap::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn with_entries<T>(
        &self,
        f: impl FnOnce(&mut HashMap<String, Vec<u8>>) -> T,
    ) -> Result<T, BackendError> {
        let mut entries = self.entries.write();
        let entries = entries
            .as_mut()
            .ok_or_else(|| BackendError::NotActive(ID.to_string()))?;
        Ok(f(entries))
    }
}

#[async_trait]
impl Lifecycle for MemoryStorage {
    async fn is_available(&self) -> bool {
        true
    }

    async fn activate(&self) -> bool {
        self.entries.write().get_or_insert_with(HashMap::new);
        true
    }

    async fn deactivate(&self) -> Result<(), BackendError> {
        self.entries.write().take();
        Ok(())
    }

    async fn test(&self) -> Result<TestResult, BackendError> {
        let started = Instant::now();
        let mut scratch = HashMap::new();
        scratch.insert("probe".to_string(), b"memory self-test".to_vec());
        let ok = scratch.remove("probe").as_deref() == Some(&b"memory self-test"[..]);

        let result = if ok {
            TestResult::passed()
        } else {
            TestResult::failed(["scratch map lost the probe value"])
        };
        Ok(result
            .with_latency(started.elapsed())
            .with_detail("entries", self.len()))
    }
}

#[async_trait]
impl StorageBackend for MemoryStorage {
    fn medium(&self) -> StorageMedium {
        StorageMedium::Memory
    }

    async fn put(&self, key: &str, value: &[u8]) -> Result<(), BackendError> {
        self.with_entries(|entries| {
            entries.insert(key.to_string(), value.to_vec());
        })
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, BackendError> {
        self.with_entries(|entries| entries.get(key).cloned())
    }

    async fn delete(&self, key: &str) -> Result<bool, BackendError> {
        self.with_entries(|entries| entries.remove(key).is_some())
    }
}

pub fn descriptor() -> ImplementationDescriptor {
    ImplementationDescriptor::new(ID, ComponentType::Storage)
        .with_name("In-memory")
        .with_description("Volatile emergency storage")
        .with_priority(50)
        .with_strategy(Strategy::Emergency)
        .with_status(FailsafeStatus::Emergency)
}

pub fn implementation() -> Implementation<dyn StorageBackend> {
    let backend: Arc<dyn StorageBackend> = Arc::new(MemoryStorage::new());
    Implementation::new(descriptor(), backend)
}
