//! # AES-256-GCM
//!
//! Alternate cipher with 96-bit random nonces. Fast where AES-NI is present.

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use failsafe_engine::{
    BackendError, ComponentType, CryptoAlgorithm, CryptoBackend, FailsafeStatus, Implementation,
    ImplementationDescriptor, Strategy,
};
use std::sync::Arc;

use super::aead::{AeadBackend, AeadCipher};
use super::key::SecretKey;

pub const ID: &str = "aes256gcm";

pub struct AesGcm;

impl AeadCipher for AesGcm {
    const ALGORITHM: CryptoAlgorithm = CryptoAlgorithm::Aes256Gcm;
    const NONCE_LEN: usize = 12;

    fn seal(key: &SecretKey, nonce: &[u8], plaintext: &[u8]) -> Result<Vec<u8>, BackendError> {
        Aes256Gcm::new(key.as_bytes().into())
            .encrypt(Nonce::from_slice(nonce), plaintext)
            .map_err(|e| BackendError::OperationFailed(format!("encryption failed: {e}")))
    }

    fn open(key: &SecretKey, nonce: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>, BackendError> {
        Aes256Gcm::new(key.as_bytes().into())
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|e| BackendError::OperationFailed(format!("decryption failed: {e}")))
    }
}

pub type AesGcmBackend = AeadBackend<AesGcm>;

pub fn descriptor() -> ImplementationDescriptor {
    ImplementationDescriptor::new(ID, ComponentType::Cryptography)
        .with_name("AES-256-GCM")
        .with_description("Alternate AEAD for hosts with hardware AES")
        .with_priority(80)
        .with_strategy(Strategy::Alternate)
        .with_status(FailsafeStatus::Fallback)
}

pub fn implementation() -> Implementation<dyn CryptoBackend> {
    let backend: Arc<dyn CryptoBackend> = Arc::new(AesGcmBackend::new());
    Implementation::new(descriptor(), backend)
}
