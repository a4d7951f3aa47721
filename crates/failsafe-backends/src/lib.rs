//! # Failsafe Backends
//!
//! Reference implementations for every component type, and the bootstrap
//! that self-registers them with a [`FailsafeManager`](failsafe_engine::FailsafeManager).
//!
//! | Component | Backend | Priority | Tier |
//! |-----------|---------|----------|------|
//! | Cryptography | XChaCha20-Poly1305 | 100 | default |
//! | Cryptography | AES-256-GCM | 80 | alternate |
//! | Identity | Ed25519 | 100 | default |
//! | Identity | secp256k1 ECDSA | 80 | alternate |
//! | Storage | Filesystem | 100 | default |
//! | Storage | In-memory | 50 | emergency |
//! | Communication | Async channel | 100 | default |
//! | Communication | Loopback queue | 40 | last resort |
//! | Network | TCP probe | 100 | default |
//! | Execution | Blocking pool | 100 | default |
//! | Execution | Inline | 30 | emergency |
//!
//! Crypto and identity self-tests generate fresh keys and run a full round
//! trip, so they never touch the session keys of the active backend.

pub mod bootstrap;
pub mod communication;
pub mod crypto;
pub mod execution;
pub mod identity;
pub mod network;
pub mod storage;

pub use bootstrap::{activate_primaries, register_default_backends, BackendSettings, REFERENCE_BACKENDS};
