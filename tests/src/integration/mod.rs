//! Cross-crate integration scenarios.

pub mod backends;
pub mod events;
pub mod runtime;
pub mod scenarios;
