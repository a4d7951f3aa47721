//! # Filesystem Storage
//!
//! One file per key under a root directory. Keys are hex-encoded into file
//! names so any string is a valid key; writes go through a temp file and a
//! rename so a reader never sees a partial value.

use async_trait::async_trait;
use failsafe_engine::{
    BackendError, ComponentType, FailsafeStatus, Implementation, ImplementationDescriptor,
    Lifecycle, StorageBackend, StorageMedium, Strategy, TestResult,
};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::fs;
use tracing::{debug, warn};

pub const ID: &str = "filesystem";

const EXTENSION: &str = "bin";

pub struct FilesystemStorage {
    root: PathBuf,
    active: AtomicBool,
}

impl FilesystemStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            active: AtomicBool::new(false),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.{EXTENSION}", hex::encode(key)))
    }

    fn require_active(&self) -> Result<(), BackendError> {
        if self.active.load(Ordering::Acquire) {
            Ok(())
        } else {
            Err(BackendError::NotActive(ID.to_string()))
        }
    }

    async fn write_atomic(&self, key: &str, value: &[u8]) -> Result<(), BackendError> {
        let path = self.path_for(key);
        // Unique per write: concurrent puts to one key must not share a temp file.
        let tmp = path.with_extension(format!("{EXTENSION}.{:016x}.tmp", rand::random::<u64>()));
        let written = match fs::write(&tmp, value).await {
            Ok(()) => fs::rename(&tmp, &path).await,
            Err(e) => Err(e),
        };
        if written.is_err() {
            let _ = fs::remove_file(&tmp).await;
        }
        written.map_err(Into::into)
    }

    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>, BackendError> {
        match fs::read(self.path_for(key)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn remove(&self, key: &str) -> Result<bool, BackendError> {
        match fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl Lifecycle for FilesystemStorage {
    /// Available when the root exists as a directory or can be created under
    /// an existing parent.
    async fn is_available(&self) -> bool {
        if let Ok(metadata) = fs::metadata(&self.root).await {
            return metadata.is_dir() && !metadata.permissions().readonly();
        }
        match self.root.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => fs::metadata(parent)
                .await
                .map(|metadata| metadata.is_dir())
                .unwrap_or(false),
            _ => true,
        }
    }

    async fn activate(&self) -> bool {
        match fs::create_dir_all(&self.root).await {
            Ok(()) => {
                self.active.store(true, Ordering::Release);
                debug!(root = %self.root.display(), "Filesystem storage ready");
                true
            }
            Err(e) => {
                warn!(root = %self.root.display(), error = %e, "Cannot create storage root");
                false
            }
        }
    }

    async fn deactivate(&self) -> Result<(), BackendError> {
        self.active.store(false, Ordering::Release);
        Ok(())
    }

    /// Write, read back and delete a probe key under the root.
    async fn test(&self) -> Result<TestResult, BackendError> {
        let started = Instant::now();
        fs::create_dir_all(&self.root).await?;

        let key = format!("__self_test_{}", rand::random::<u64>());
        let probe = b"filesystem self-test";
        let mut errors = Vec::new();

        self.write_atomic(&key, probe).await?;
        match self.read(&key).await? {
            Some(read) if read == probe => {}
            Some(_) => errors.push("read back different bytes".to_string()),
            None => errors.push("written key not found".to_string()),
        }
        if !self.remove(&key).await? {
            errors.push("delete reported missing key".to_string());
        }

        let result = if errors.is_empty() {
            TestResult::passed()
        } else {
            TestResult::failed(errors)
        };
        Ok(result
            .with_latency(started.elapsed())
            .with_detail("root", self.root.display().to_string()))
    }
}

#[async_trait]
impl StorageBackend for FilesystemStorage {
    fn medium(&self) -> StorageMedium {
        StorageMedium::Filesystem
    }

    async fn put(&self, key: &str, value: &[u8]) -> Result<(), BackendError> {
        self.require_active()?;
        self.write_atomic(key, value).await
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, BackendError> {
        self.require_active()?;
        self.read(key).await
    }

    async fn delete(&self, key: &str) -> Result<bool, BackendError> {
        self.require_active()?;
        self.remove(key).await
    }
}

pub fn descriptor() -> ImplementationDescriptor {
    ImplementationDescriptor::new(ID, ComponentType::Storage)
        .with_name("Filesystem")
        .with_description("Durable file-per-key storage")
        .with_priority(100)
        .with_strategy(Strategy::Default)
        .with_status(FailsafeStatus::Online)
}

pub fn implementation(root: impl Into<PathBuf>) -> Implementation<dyn StorageBackend> {
    let backend: Arc<dyn StorageBackend> = Arc::new(FilesystemStorage::new(root));
    Implementation::new(descriptor(), backend)
}
