//! Cryptography backends.

pub mod aead;
pub mod aes_gcm;
pub mod key;
pub mod xchacha;

pub use aead::{AeadBackend, AeadCipher};
pub use aes_gcm::AesGcmBackend;
pub use key::SecretKey;
pub use xchacha::XChaChaBackend;
