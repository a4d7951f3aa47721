//! # secp256k1 Identity
//!
//! ECDSA with RFC 6979 deterministic nonces. Public keys are SEC1 compressed
//! (33 bytes), signatures are r||s (64 bytes).

use async_trait::async_trait;
use failsafe_engine::{
    BackendError, ComponentType, FailsafeStatus, IdentityBackend, Implementation,
    ImplementationDescriptor, Lifecycle, SignatureScheme, Strategy, TestResult,
};
use k256::ecdsa::{
    signature::{Signer, Verifier},
    Signature, SigningKey, VerifyingKey,
};
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Instant;

use super::SELF_TEST_MESSAGE;

pub const ID: &str = "secp256k1";

#[derive(Default)]
pub struct Secp256k1Identity {
    signing_key: RwLock<Option<SigningKey>>,
}

impl Secp256k1Identity {
    pub fn new() -> Self {
        Self::default()
    }

    /// Identity from 32 secret key bytes, already active.
    pub fn from_bytes(bytes: [u8; 32]) -> Result<Self, BackendError> {
        let signing_key = SigningKey::from_bytes((&bytes).into())
            .map_err(|_| BackendError::InvalidInput("invalid secp256k1 secret key".into()))?;
        Ok(Self {
            signing_key: RwLock::new(Some(signing_key)),
        })
    }

    fn key(&self) -> Result<SigningKey, BackendError> {
        self.signing_key
            .read()
            .clone()
            .ok_or_else(|| BackendError::NotActive(ID.to_string()))
    }
}

fn public_key_bytes(key: &SigningKey) -> Vec<u8> {
    key.verifying_key().to_sec1_bytes().to_vec()
}

fn sign_with(key: &SigningKey, message: &[u8]) -> Vec<u8> {
    let signature: Signature = key.sign(message);
    signature.to_bytes().to_vec()
}

fn verify_with(public_key: &[u8], message: &[u8], signature: &[u8]) -> Result<bool, BackendError> {
    let verifying_key = VerifyingKey::from_sec1_bytes(public_key)
        .map_err(|_| BackendError::InvalidInput("invalid secp256k1 public key".into()))?;
    let signature = Signature::from_slice(signature)
        .map_err(|_| BackendError::InvalidInput("invalid secp256k1 signature".into()))?;
    Ok(verifying_key.verify(message, &signature).is_ok())
}

#[async_trait]
impl Lifecycle for Secp256k1Identity {
    async fn is_available(&self) -> bool {
        true
    }

    async fn activate(&self) -> bool {
        let mut key = self.signing_key.write();
        if key.is_none() {
            *key = Some(SigningKey::random(&mut rand::thread_rng()));
        }
        true
    }

    async fn deactivate(&self) -> Result<(), BackendError> {
        self.signing_key.write().take();
        Ok(())
    }

    async fn test(&self) -> Result<TestResult, BackendError> {
        let started = Instant::now();
        let key = SigningKey::random(&mut rand::thread_rng());
        let public_key = public_key_bytes(&key);
        let signature = sign_with(&key, SELF_TEST_MESSAGE);

        let mut errors = Vec::new();
        if !verify_with(&public_key, SELF_TEST_MESSAGE, &signature)? {
            errors.push("valid signature rejected".to_string());
        }
        if verify_with(&public_key, b"forged", &signature)? {
            errors.push("signature verified for a different message".to_string());
        }

        let result = if errors.is_empty() {
            TestResult::passed()
        } else {
            TestResult::failed(errors)
        };
        Ok(result
            .with_latency(started.elapsed())
            .with_detail("scheme", "secp256k1")
            .with_detail("public_key_bytes", public_key.len())
            .with_detail("signature_bytes", signature.len()))
    }
}

#[async_trait]
impl IdentityBackend for Secp256k1Identity {
    fn scheme(&self) -> SignatureScheme {
        SignatureScheme::Secp256k1
    }

    async fn public_key(&self) -> Result<Vec<u8>, BackendError> {
        Ok(public_key_bytes(&self.key()?))
    }

    async fn sign(&self, message: &[u8]) -> Result<Vec<u8>, BackendError> {
        Ok(sign_with(&self.key()?, message))
    }

    async fn verify(
        &self,
        public_key: &[u8],
        message: &[u8],
        signature: &[u8],
    ) -> Result<bool, BackendError> {
        verify_with(public_key, message, signature)
    }
}

pub fn descriptor() -> ImplementationDescriptor {
    ImplementationDescriptor::new(ID, ComponentType::Identity)
        .with_name("secp256k1 ECDSA")
        .with_description("Alternate identity on the secp256k1 curve")
        .with_priority(80)
        .with_strategy(Strategy::Alternate)
        .with_status(FailsafeStatus::Fallback)
}

pub fn implementation() -> Implementation<dyn IdentityBackend> {
    let backend: Arc<dyn IdentityBackend> = Arc::new(Secp256k1Identity::new());
    Implementation::new(descriptor(), backend)
}
