//! # XChaCha20-Poly1305
//!
//! Default cipher: 192-bit random nonces, constant-time ARX design.

use chacha20poly1305::{
    aead::{Aead, KeyInit},
    XChaCha20Poly1305, XNonce,
};
use failsafe_engine::{
    BackendError, ComponentType, CryptoAlgorithm, CryptoBackend, FailsafeStatus, Implementation,
    ImplementationDescriptor, Strategy,
};
use std::sync::Arc;

use super::aead::{AeadBackend, AeadCipher};
use super::key::SecretKey;

pub const ID: &str = "xchacha20poly1305";

pub struct XChaCha;

impl AeadCipher for XChaCha {
    const ALGORITHM: CryptoAlgorithm = CryptoAlgorithm::XChaCha20Poly1305;
    const NONCE_LEN: usize = 24;

    fn seal(key: &SecretKey, nonce: &[u8], plaintext: &[u8]) -> Result<Vec<u8>, BackendError> {
        XChaCha20Poly1305::new(key.as_bytes().into())
            .encrypt(XNonce::from_slice(nonce), plaintext)
            .map_err(|e| BackendError::OperationFailed(format!("encryption failed: {e}")))
    }

    fn open(key: &SecretKey, nonce: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>, BackendError> {
        XChaCha20Poly1305::new(key.as_bytes().into())
            .decrypt(XNonce::from_slice(nonce), ciphertext)
            .map_err(|e| BackendError::OperationFailed(format!("decryption failed: {e}")))
    }
}

pub type XChaChaBackend = AeadBackend<XChaCha>;

pub fn descriptor() -> ImplementationDescriptor {
    ImplementationDescriptor::new(ID, ComponentType::Cryptography)
        .with_name("XChaCha20-Poly1305")
        .with_description("Primary AEAD with extended random nonces")
        .with_priority(100)
        .with_strategy(Strategy::Default)
        .with_status(FailsafeStatus::Online)
}

pub fn implementation() -> Implementation<dyn CryptoBackend> {
    let backend: Arc<dyn CryptoBackend> = Arc::new(XChaChaBackend::new());
    Implementation::new(descriptor(), backend)
}
