//! Ports Layer
//!
//! - `Lifecycle`: the contract the coordinator drives every backend through
//! - capability traits: what each component type's backends can do

pub mod capabilities;
pub mod lifecycle;

pub use capabilities::{
    ChannelMedium, ChannelMessage, CommunicationBackend, CryptoAlgorithm, CryptoBackend,
    ExecutionBackend, ExecutionEnvironment, ExecutionTask, IdentityBackend, NetworkBackend,
    NetworkTransport, SealedPayload, SignatureScheme, StorageBackend, StorageMedium,
};
pub use lifecycle::Lifecycle;
