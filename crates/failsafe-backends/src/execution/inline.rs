//! Runs tasks directly on the calling task. Emergency only: a long task
//! blocks an async worker thread.

use async_trait::async_trait;
use failsafe_engine::{
    BackendError, ComponentType, ExecutionBackend, ExecutionEnvironment, ExecutionTask,
    FailsafeStatus, Implementation, ImplementationDescriptor, Lifecycle, Strategy, TestResult,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use super::{checksum_task, EXPECTED_CHECKSUM};

pub const ID: &str = "inline";

#[derive(Default)]
pub struct InlineExecutor {
    active: AtomicBool,
}

impl InlineExecutor {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Lifecycle for InlineExecutor {
    async fn is_available(&self) -> bool {
        true
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
        let output = checksum_task()()?;
        let result = if output == EXPECTED_CHECKSUM.to_le_bytes() {
            TestResult::passed()
        } else {
            TestResult::failed(["inline execution returned a wrong checksum"])
        };
        Ok(result.with_latency(started.elapsed()))
    }
}

#[async_trait]
impl ExecutionBackend for InlineExecutor {
    fn environment(&self) -> ExecutionEnvironment {
        ExecutionEnvironment::Inline
    }

    async fn execute(&self, task: ExecutionTask) -> Result<Vec<u8>, BackendError> {
        if !self.active.load(Ordering::Acquire) {
            return Err(BackendError::NotActive(ID.to_string()));
        }
        task()
    }
}

pub fn descriptor() -> ImplementationDescriptor {
    ImplementationDescriptor::new(ID, ComponentType::Execution)
        .with_name("Inline")
        .with_description("Runs tasks on the caller; emergency fallback")
        .with_priority(30)
        .with_strategy(Strategy::Emergency)
        .with_status(FailsafeStatus::Emergency)
}

pub fn implementation() -> Implementation<dyn ExecutionBackend> {
    let backend: Arc<dyn ExecutionBackend> = Arc::new(InlineExecutor::new());
    Implementation::new(descriptor(), backend)
}
