//! Shared AEAD backend: key lifecycle, nonce handling and self-test.
//!
//! Each cipher only supplies `seal` and `open`; activation, validation of
//! sealed payloads and the round-trip self-test are common.

use async_trait::async_trait;
use failsafe_engine::{BackendError, CryptoAlgorithm, CryptoBackend, Lifecycle, SealedPayload, TestResult};
use parking_lot::RwLock;
use std::marker::PhantomData;
use std::time::Instant;
use tracing::debug;

use super::key::{random_nonce, SecretKey};

const PROBE: &[u8] = b"tetra failsafe aead self-test";

/// One AEAD construction.
pub trait AeadCipher: Send + Sync + 'static {
    const ALGORITHM: CryptoAlgorithm;
    const NONCE_LEN: usize;

    fn seal(key: &SecretKey, nonce: &[u8], plaintext: &[u8]) -> Result<Vec<u8>, BackendError>;

    fn open(key: &SecretKey, nonce: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>, BackendError>;
}

/// Crypto backend holding a session key while active.
pub struct AeadBackend<C: AeadCipher> {
    key: RwLock<Option<SecretKey>>,
    _cipher: PhantomData<fn() -> C>,
}

impl<C: AeadCipher> AeadBackend<C> {
    pub fn new() -> Self {
        Self {
            key: RwLock::new(None),
            _cipher: PhantomData,
        }
    }

    /// Backend with a caller-provided key, already active.
    pub fn with_key(key: SecretKey) -> Self {
        Self {
            key: RwLock::new(Some(key)),
            _cipher: PhantomData,
        }
    }

    fn session_key(&self) -> Result<SecretKey, BackendError> {
        self.key
            .read()
            .clone()
            .ok_or_else(|| BackendError::NotActive(C::ALGORITHM.to_string()))
    }

    fn seal_with(key: &SecretKey, plaintext: &[u8]) -> Result<SealedPayload, BackendError> {
        let nonce = random_nonce(C::NONCE_LEN);
        let ciphertext = C::seal(key, &nonce, plaintext)?;
        Ok(SealedPayload {
            algorithm: C::ALGORITHM,
            nonce,
            ciphertext,
        })
    }

    fn open_with(key: &SecretKey, sealed: &SealedPayload) -> Result<Vec<u8>, BackendError> {
        if sealed.algorithm != C::ALGORITHM {
            return Err(BackendError::InvalidInput(format!(
                "payload sealed with {} cannot be opened by {}",
                sealed.algorithm,
                C::ALGORITHM
            )));
        }
        if sealed.nonce.len() != C::NONCE_LEN {
            return Err(BackendError::InvalidInput(format!(
                "nonce must be {} bytes, got {}",
                C::NONCE_LEN,
                sealed.nonce.len()
            )));
        }
        C::open(key, &sealed.nonce, &sealed.ciphertext)
    }
}

impl<C: AeadCipher> Default for AeadBackend<C> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<C: AeadCipher> Lifecycle for AeadBackend<C> {
    async fn is_available(&self) -> bool {
        true
    }

    async fn activate(&self) -> bool {
        let mut key = self.key.write();
        if key.is_none() {
            *key = Some(SecretKey::generate());
            debug!(algorithm = %C::ALGORITHM, "Generated session key");
        }
        true
    }

    async fn deactivate(&self) -> Result<(), BackendError> {
        self.key.write().take();
        Ok(())
    }

    /// Fresh key, seal/open round trip, and tamper rejection.
    async fn test(&self) -> Result<TestResult, BackendError> {
        let started = Instant::now();
        let key = SecretKey::generate();
        let mut errors = Vec::new();

        let sealed = Self::seal_with(&key, PROBE)?;
        match Self::open_with(&key, &sealed) {
            Ok(opened) if opened == PROBE => {}
            Ok(_) => errors.push("round trip returned different plaintext".to_string()),
            Err(e) => errors.push(format!("round trip failed: {e}")),
        }

        let mut tampered = sealed.clone();
        if let Some(byte) = tampered.ciphertext.first_mut() {
            *byte ^= 0xFF;
        }
        if Self::open_with(&key, &tampered).is_ok() {
            errors.push("tampered ciphertext was accepted".to_string());
        }

        let result = if errors.is_empty() {
            TestResult::passed()
        } else {
            TestResult::failed(errors)
        };
        Ok(result
            .with_latency(started.elapsed())
            .with_detail("algorithm", C::ALGORITHM.to_string())
            .with_detail("key_bits", 256)
            .with_detail("nonce_bytes", C::NONCE_LEN))
    }
}

#[async_trait]
impl<C: AeadCipher> CryptoBackend for AeadBackend<C> {
    fn algorithm(&self) -> CryptoAlgorithm {
        C::ALGORITHM
    }

    async fn encrypt(&self, plaintext: &[u8]) -> Result<SealedPayload, BackendError> {
        let key = self.session_key()?;
        Self::seal_with(&key, plaintext)
    }

    async fn decrypt(&self, sealed: &SealedPayload) -> Result<Vec<u8>, BackendError> {
        let key = self.session_key()?;
        Self::open_with(&key, sealed)
    }
}
