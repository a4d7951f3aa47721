//! Network backends.

pub mod tcp;

pub use tcp::TcpProbe;
