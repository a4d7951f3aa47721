//! Domain layer: pure data types, no I/O.

pub mod chain;
pub mod component;
pub mod implementation;
pub mod report;
pub mod status;
pub mod test_result;

pub use chain::FallbackChain;
pub use component::{ComponentType, UnknownComponent};
pub use implementation::{Implementation, ImplementationDescriptor};
pub use report::{recommendation, ComponentSnapshot, SystemReport};
pub use status::{FailsafeStatus, Strategy};
pub use test_result::TestResult;
