//! # Channel Communication
//!
//! In-process messaging over an unbounded Tokio channel. The channel is
//! created on activation; deactivation drops it along with anything still
//! queued.

use async_trait::async_trait;
use failsafe_engine::{
    BackendError, ChannelMedium, ChannelMessage, CommunicationBackend, ComponentType,
    FailsafeStatus, Implementation, ImplementationDescriptor, Lifecycle, Strategy, TestResult,
};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc::{self, error::TryRecvError, UnboundedReceiver, UnboundedSender};

pub const ID: &str = "channel";

struct Endpoints {
    sender: UnboundedSender<ChannelMessage>,
    receiver: UnboundedReceiver<ChannelMessage>,
}

impl Endpoints {
    fn open() -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self { sender, receiver }
    }
}

#[derive(Default)]
pub struct ChannelCommunication {
    endpoints: Mutex<Option<Endpoints>>,
}

impl ChannelCommunication {
    pub fn new() -> Self {
        Self::default()
    }
}

fn loopback(endpoints: &mut Endpoints, message: ChannelMessage) -> Result<Option<ChannelMessage>, BackendError> {
    endpoints
        .sender
        .send(message)
        .map_err(|_| BackendError::OperationFailed("channel closed".into()))?;
    match endpoints.receiver.try_recv() {
        Ok(message) => Ok(Some(message)),
        Err(TryRecvError::Empty) => Ok(None),
        Err(TryRecvError::Disconnected) => {
            Err(BackendError::OperationFailed("channel disconnected".into()))
        }
    }
}

#[async_trait]
impl Lifecycle for ChannelCommunication {
    async fn is_available(&self) -> bool {
        true
    }

    async fn activate(&self) -> bool {
        self.endpoints.lock().get_or_insert_with(Endpoints::open);
        true
    }

    async fn deactivate(&self) -> Result<(), BackendError> {
        self.endpoints.lock().take();
        Ok(())
    }

    /// Loopback over a private channel, independent of the live one.
    async fn test(&self) -> Result<TestResult, BackendError> {
        let started = Instant::now();
        let probe = ChannelMessage::new("self-test", b"ping".to_vec());
        let echoed = loopback(&mut Endpoints::open(), probe.clone())?;

        let result = if echoed.as_ref() == Some(&probe) {
            TestResult::passed()
        } else {
            TestResult::failed(["loopback message not delivered intact"])
        };
        Ok(result.with_latency(started.elapsed()))
    }
}

#[async_trait]
impl CommunicationBackend for ChannelCommunication {
    fn medium(&self) -> ChannelMedium {
        ChannelMedium::Channel
    }

    async fn send(&self, message: ChannelMessage) -> Result<(), BackendError> {
        let endpoints = self.endpoints.lock();
        let endpoints = endpoints
            .as_ref()
            .ok_or_else(|| BackendError::NotActive(ID.to_string()))?;
        endpoints
            .sender
            .send(message)
            .map_err(|_| BackendError::OperationFailed("channel closed".into()))
    }

    async fn receive(&self) -> Result<Option<ChannelMessage>, BackendError> {
        let mut endpoints = self.endpoints.lock();
        let endpoints = endpoints
            .as_mut()
            .ok_or_else(|| BackendError::NotActive(ID.to_string()))?;
        match endpoints.receiver.try_recv() {
            Ok(message) => Ok(Some(message)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => {
                Err(BackendError::OperationFailed("channel disconnected".into()))
            }
        }
    }
}

pub fn descriptor() -> ImplementationDescriptor {
    ImplementationDescriptor::new(ID, ComponentType::Communication)
        .with_name("Async channel")
        .with_description("In-process message channel")
        .with_priority(100)
        .with_strategy(Strategy::Default)
        .with_status(FailsafeStatus::Online)
}

pub fn implementation() -> Implementation<dyn CommunicationBackend> {
    let backend: Arc<dyn CommunicationBackend> = Arc::new(ChannelCommunication::new());
    Implementation::new(descriptor(), backend)
}
