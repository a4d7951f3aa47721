//! Capability traits per component type.
//!
//! Each coordinator is generic over one of these trait objects, so a
//! cryptography coordinator can only ever hand out something that encrypts.
//! The typed selector on each trait (`algorithm`, `medium`, ...) replaces
//! encoding the algorithm in the implementation id.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use super::lifecycle::Lifecycle;
use crate::error::BackendError;

// =============================================================================
// CRYPTOGRAPHY
// =============================================================================

/// Symmetric AEAD algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CryptoAlgorithm {
    XChaCha20Poly1305,
    Aes256Gcm,
}

impl fmt::Display for CryptoAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::XChaCha20Poly1305 => f.write_str("xchacha20poly1305"),
            Self::Aes256Gcm => f.write_str("aes256gcm"),
        }
    }
}

/// Ciphertext plus the nonce needed to open it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SealedPayload {
    pub algorithm: CryptoAlgorithm,
    pub nonce: Vec<u8>,
    pub ciphertext: Vec<u8>,
}

#[async_trait]
pub trait CryptoBackend: Lifecycle {
    fn algorithm(&self) -> CryptoAlgorithm;

    async fn encrypt(&self, plaintext: &[u8]) -> Result<SealedPayload, BackendError>;

    async fn decrypt(&self, sealed: &SealedPayload) -> Result<Vec<u8>, BackendError>;
}

// =============================================================================
// IDENTITY
// =============================================================================

/// Signature scheme backing an identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignatureScheme {
    Ed25519,
    Secp256k1,
}

#[async_trait]
pub trait IdentityBackend: Lifecycle {
    fn scheme(&self) -> SignatureScheme;

    /// Encoded public key of the active identity.
    async fn public_key(&self) -> Result<Vec<u8>, BackendError>;

    async fn sign(&self, message: &[u8]) -> Result<Vec<u8>, BackendError>;

    async fn verify(
        &self,
        public_key: &[u8],
        message: &[u8],
        signature: &[u8],
    ) -> Result<bool, BackendError>;
}

// =============================================================================
// STORAGE
// =============================================================================

/// Where a storage backend keeps its data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageMedium {
    Filesystem,
    Memory,
}

#[async_trait]
pub trait StorageBackend: Lifecycle {
    fn medium(&self) -> StorageMedium;

    async fn put(&self, key: &str, value: &[u8]) -> Result<(), BackendError>;

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, BackendError>;

    /// Returns whether the key existed.
    async fn delete(&self, key: &str) -> Result<bool, BackendError>;
}

// =============================================================================
// COMMUNICATION
// =============================================================================

/// Transport used for in-process messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelMedium {
    /// Async channel.
    Channel,
    /// Locked in-memory queue.
    Queue,
}

/// Message carried by a communication backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelMessage {
    pub topic: String,
    pub payload: Vec<u8>,
}

impl ChannelMessage {
    pub fn new(topic: impl Into<String>, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            topic: topic.into(),
            payload: payload.into(),
        }
    }
}

#[async_trait]
pub trait CommunicationBackend: Lifecycle {
    fn medium(&self) -> ChannelMedium;

    async fn send(&self, message: ChannelMessage) -> Result<(), BackendError>;

    /// Next pending message, `None` when nothing is queued.
    async fn receive(&self) -> Result<Option<ChannelMessage>, BackendError>;
}

// =============================================================================
// NETWORK
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NetworkTransport {
    Tcp,
}

#[async_trait]
pub trait NetworkBackend: Lifecycle {
    fn transport(&self) -> NetworkTransport;

    /// Round-trip time to reach `endpoint`.
    async fn probe(&self, endpoint: &str) -> Result<Duration, BackendError>;
}

// =============================================================================
// EXECUTION
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionEnvironment {
    /// Tokio blocking pool.
    BlockingPool,
    /// The caller's task.
    Inline,
}

/// Unit of work handed to an execution backend.
pub type ExecutionTask = Box<dyn FnOnce() -> Result<Vec<u8>, BackendError> + Send + 'static>;

#[async_trait]
pub trait ExecutionBackend: Lifecycle {
    fn environment(&self) -> ExecutionEnvironment;

    async fn execute(&self, task: ExecutionTask) -> Result<Vec<u8>, BackendError>;
}
