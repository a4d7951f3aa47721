//! Runs tasks on the Tokio blocking pool so CPU-heavy work never stalls the
//! async workers.

use async_trait::async_trait;
use failsafe_engine::{
    BackendError, ComponentType, ExecutionBackend, ExecutionEnvironment, ExecutionTask,
    FailsafeStatus, Implementation, ImplementationDescriptor, Lifecycle, Strategy, TestResult,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::runtime::Handle;
use tokio::task;

use super::{checksum_task, CHECKSUM_INPUT_LEN, EXPECTED_CHECKSUM};

pub const ID: &str = "blocking-pool";

#[derive(Default)]
pub struct BlockingPoolExecutor {
    active: AtomicBool,
}

impl BlockingPoolExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    async fn run(task: ExecutionTask) -> Result<Vec<u8>, BackendError> {
        task::spawn_blocking(task)
            .await
            .map_err(|e| BackendError::OperationFailed(format!("blocking task failed: {e}")))?
    }
}

#[async_trait]
impl Lifecycle for BlockingPoolExecutor {
    /// Needs a surrounding Tokio runtime.
    async fn is_available(&self) -> bool {
        Handle::try_current().is_ok()
    }

    async fn activate(&self) -> bool {
        self.active.store(true, Ordering::Release);
        true
    }

    async fn deactivate(&self) -> Result<(), BackendError> {
        self.active.store(false, Ordering::Release);
        Ok(())
    }

    async fn test(&self) -> Result<TestResult, BackendError> {
        let started = Instant::now();
        let output = Self::run(checksum_task()).await?;
        let result = if output == EXPECTED_CHECKSUM.to_le_bytes() {
            TestResult::passed()
        } else {
            TestResult::failed(["blocking pool returned a wrong checksum"])
        };
        Ok(result
            .with_latency(started.elapsed())
            .with_detail("input_bytes", CHECKSUM_INPUT_LEN))
    }
}

#[async_trait]
impl ExecutionBackend for BlockingPoolExecutor {
    fn environment(&self) -> ExecutionEnvironment {
        ExecutionEnvironment::BlockingPool
    }

    async fn execute(&self, task: ExecutionTask) -> Result<Vec<u8>, BackendError> {
        if !self.active.load(Ordering::Acquire) {
            return Err(BackendError::NotActive(ID.to_string()));
        }
        Self::run(task).await
    }
}

pub fn descriptor() -> ImplementationDescriptor {
    ImplementationDescriptor::new(ID, ComponentType::Execution)
        .with_name("Blocking pool")
        .with_description("Tokio blocking thread pool")
        .with_priority(100)
        .with_strategy(Strategy::Default)
        .with_status(FailsafeStatus::Online)
}

pub fn implementation() -> Implementation<dyn ExecutionBackend> {
    let backend: Arc<dyn ExecutionBackend> = Arc::new(BlockingPoolExecutor::new());
    Implementation::new(descriptor(), backend)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_execute_returns_task_output() {
        let executor = BlockingPoolExecutor::new();
        executor.activate().await;

        let output = executor
            .execute(Box::new(|| Ok(b"done".to_vec())))
            .await
            .unwrap();
        assert_eq!(output, b"done");
    }

    #[tokio::test]
    async fn test_task_error_propagates() {
        let executor = BlockingPoolExecutor::new();
        executor.activate().await;

        let result = executor
            .execute(Box::new(|| Err(BackendError::InvalidInput("bad".into()))))
            .await;
        assert_eq!(result, Err(BackendError::InvalidInput("bad".into())));
    }

    #[tokio::test]
    async fn test_task_panic_is_an_error() {
        let executor = BlockingPoolExecutor::new();
        executor.activate().await;

        let result = executor
            .execute(Box::new(|| -> Result<Vec<u8>, BackendError> {
                panic!("worker crashed")
            }))
            .await;
        assert!(matches!(result, Err(BackendError::OperationFailed(_))));
    }

    #[tokio::test]
    async fn test_self_test() {
        let executor = BlockingPoolExecutor::new();
        assert!(executor.is_available().await);
        assert!(executor.test().await.unwrap().success);
    }
}
