//! Identity backends.

pub mod ed25519;
pub mod secp256k1;

pub use ed25519::Ed25519Identity;
pub use secp256k1::Secp256k1Identity;

pub(crate) const SELF_TEST_MESSAGE: &[u8] = b"tetra failsafe identity self-test";
