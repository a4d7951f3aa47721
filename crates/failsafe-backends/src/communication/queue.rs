//! Bounded locked queue used as the communication backend of last resort.

use async_trait::async_trait;
use failsafe_engine::{
    BackendError, ChannelMedium, ChannelMessage, CommunicationBackend, ComponentType,
    FailsafeStatus, Implementation, ImplementationDescriptor, Lifecycle, Strategy, TestResult,
};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

pub const ID: &str = "queue";

pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

pub struct QueueCommunication {
    queue: Mutex<VecDeque<ChannelMessage>>,
    capacity: usize,
    active: AtomicBool,
}

impl QueueCommunication {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_QUEUE_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            capacity: capacity.max(1),
            active: AtomicBool::new(false),
        }
    }

    pub fn pending(&self) -> usize {
        self.queue.lock().len()
    }

    fn require_active(&self) -> Result<(), BackendError> {
        if self.active.load(Ordering::Acquire) {
            Ok(())
        } else {
            Err(BackendError::NotActive(ID.to_string()))
        }
    }
}

impl Default for QueueCommunication {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Lifecycle for QueueCommunication {
    async fn is_available(&self) -> bool {
        true
    }

    async fn activate(&self) -> bool {
        self.active.store(true, Ordering::Release);
        true
    }

    async fn deactivate(&self) -> Result<(), BackendError> {
        self.active.store(false, Ordering::Release);
        self.queue.lock().clear();
        Ok(())
    }

    async fn test(&self) -> Result<TestResult, BackendError> {
        let started = Instant::now();
        let mut scratch = VecDeque::with_capacity(2);
        scratch.push_back(ChannelMessage::new("self-test", b"first".to_vec()));
        scratch.push_back(ChannelMessage::new("self-test", b"second".to_vec()));

        let fifo = scratch.pop_front().map(|m| m.payload) == Some(b"first".to_vec());
        let result = if fifo {
            TestResult::passed()
        } else {
            TestResult::failed(["queue did not preserve FIFO order"])
        };
        Ok(result
            .with_latency(started.elapsed())
            .with_detail("capacity", self.capacity)
            .with_detail("pending", self.pending()))
    }
}

#[async_trait]
impl CommunicationBackend for QueueCommunication {
    fn medium(&self) -> ChannelMedium {
        ChannelMedium::Queue
    }

    async fn send(&self, message: ChannelMessage) -> Result<(), BackendError> {
        self.require_active()?;
        let mut queue = self.queue.lock();
        if queue.len() >= self.capacity {
            return Err(BackendError::OperationFailed(format!(
                "queue full ({} messages)",
                self.capacity
            )));
        }
        queue.push_back(message);
        Ok(())
    }

    async fn receive(&self) -> Result<Option<ChannelMessage>, BackendError> {
        self.require_active()?;
        Ok(self.queue.lock().pop_front())
    }
}

pub fn descriptor() -> ImplementationDescriptor {
    ImplementationDescriptor::new(ID, ComponentType::Communication)
        .with_name("Loopback queue")
        .with_description("Bounded in-memory queue of last resort")
        .with_priority(40)
        .with_strategy(Strategy::LastResort)
        .with_status(FailsafeStatus::Emergency)
}

pub fn implementation() -> Implementation<dyn CommunicationBackend> {
    let backend: Arc<dyn CommunicationBackend> = Arc::new(QueueCommunication::new());
    Implementation::new(descriptor(), backend)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_capacity_enforced() {
        let queue = QueueCommunication::with_capacity(2);
        queue.activate().await;

        queue.send(ChannelMessage::new("t", b"1".to_vec())).await.unwrap();
        queue.send(ChannelMessage::new("t", b"2".to_vec())).await.unwrap();
        assert!(queue.send(ChannelMessage::new("t", b"3".to_vec())).await.is_err());

        assert_eq!(queue.receive().await.unwrap().unwrap().payload, b"1");
        assert_eq!(queue.pending(), 1);
    }

    #[tokio::test]
    async fn test_inactive_refuses() {
        let queue = QueueCommunication::new();
        assert!(queue.send(ChannelMessage::new("t", b"x".to_vec())).await.is_err());
    }
}
