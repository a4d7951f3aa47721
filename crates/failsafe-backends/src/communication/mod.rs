//! Communication backends.

pub mod channel;
pub mod queue;

pub use channel::ChannelCommunication;
pub use queue::QueueCommunication;
