//! Execution backends.

pub mod blocking;
pub mod inline;

pub use blocking::BlockingPoolExecutor;
pub use inline::InlineExecutor;

use failsafe_engine::{BackendError, ExecutionTask};

pub(crate) const CHECKSUM_INPUT_LEN: u64 = 4096;

/// Sum of `0..CHECKSUM_INPUT_LEN`.
pub(crate) const EXPECTED_CHECKSUM: u64 = CHECKSUM_INPUT_LEN * (CHECKSUM_INPUT_LEN - 1) / 2;

/// Deterministic CPU task used by the execution self-tests.
pub(crate) fn checksum_task() -> ExecutionTask {
    Box::new(|| -> Result<Vec<u8>, BackendError> {
        let sum: u64 = (0..CHECKSUM_INPUT_LEN).sum();
        Ok(sum.to_le_bytes().to_vec())
    })
}
