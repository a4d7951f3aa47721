//! # Ed25519 Identity
//!
//! Twisted Edwards curve signatures with deterministic nonces. The signing
//! key is generated on activation and wiped on deactivation.

use async_trait::async_trait;
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use failsafe_engine::{
    BackendError, ComponentType, FailsafeStatus, IdentityBackend, Implementation,
    ImplementationDescriptor, Lifecycle, SignatureScheme, Strategy, TestResult,
};
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Instant;

use super::SELF_TEST_MESSAGE;

pub const ID: &str = "ed25519";

#[derive(Default)]
pub struct Ed25519Identity {
    signing_key: RwLock<Option<SigningKey>>,
}

impl Ed25519Identity {
    pub fn new() -> Self {
        Self::default()
    }

    /// Identity from a 32-byte secret seed, already active.
    pub fn from_seed(seed: [u8; 32]) -> Self {
        Self {
            signing_key: RwLock::new(Some(SigningKey::from_bytes(&seed))),
        }
    }

    fn key(&self) -> Result<SigningKey, BackendError> {
        self.signing_key
            .read()
            .clone()
            .ok_or_else(|| BackendError::NotActive(ID.to_string()))
    }
}

fn verify_with(public_key: &[u8], message: &[u8], signature: &[u8]) -> Result<bool, BackendError> {
    let public_key: [u8; 32] = public_key
        .try_into()
        .map_err(|_| BackendError::InvalidInput("Ed25519 public key must be 32 bytes".into()))?;
    let signature: [u8; 64] = signature
        .try_into()
        .map_err(|_| BackendError::InvalidInput("Ed25519 signature must be 64 bytes".into()))?;

    let verifying_key = VerifyingKey::from_bytes(&public_key)
        .map_err(|_| BackendError::InvalidInput("invalid Ed25519 public key".into()))?;
    Ok(verifying_key
        .verify(message, &Signature::from_bytes(&signature))
        .is_ok())
}

#[async_trait]
impl Lifecycle for Ed25519Identity {
    async fn is_available(&self) -> bool {
        true
    }

    async fn activate(&self) -> bool {
        let mut key = self.signing_key.write();
        if key.is_none() {
            *key = Some(SigningKey::generate(&mut rand::thread_rng()));
        }
        true
    }

    async fn deactivate(&self) -> Result<(), BackendError> {
        self.signing_key.write().take();
        Ok(())
    }

    /// Keypair generation plus sign/verify, including a forged-message check.
    async fn test(&self) -> Result<TestResult, BackendError> {
        let started = Instant::now();
        let key = SigningKey::generate(&mut rand::thread_rng());
        let public_key = key.verifying_key().to_bytes();
        let signature = key.sign(SELF_TEST_MESSAGE).to_bytes();

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
            .with_detail("scheme", "ed25519")
            .with_detail("public_key_bytes", public_key.len())
            .with_detail("signature_bytes", signature.len()))
    }
}

#[async_trait]
impl IdentityBackend for Ed25519Identity {
    fn scheme(&self) -> SignatureScheme {
        SignatureScheme::Ed25519
    }

    async fn public_key(&self) -> Result<Vec<u8>, BackendError> {
        Ok(self.key()?.verifying_key().to_bytes().to_vec())
    }

    async fn sign(&self, message: &[u8]) -> Result<Vec<u8>, BackendError> {
        Ok(self.key()?.sign(message).to_bytes().to_vec())
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
        .with_name("Ed25519")
        .with_description("Primary node identity with deterministic signatures")
        .with_priority(100)
        .with_strategy(Strategy::Default)
        .with_status(FailsafeStatus::Online)
}

pub fn implementation() -> Implementation<dyn IdentityBackend> {
    let backend: Arc<dyn IdentityBackend> = Arc::new(Ed25519Identity::new());
    Implementation::new(descriptor(), backend)
}
