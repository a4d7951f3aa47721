//! # Failsafe Runtime
//!
//! Process wiring for the `tetra-failsafe` binary: environment
//! configuration, backend bootstrap, the periodic health monitor and the
//! operator commands. `main.rs` only parses arguments and dispatches here.

pub mod adapters;
pub mod commands;
pub mod container;
pub mod monitor;

pub use commands::{CommandError, CommandOutput};
pub use container::{ConfigError, FailsafeContainer, RuntimeConfig};
pub use monitor::{CycleOutcome, HealthMonitor};
