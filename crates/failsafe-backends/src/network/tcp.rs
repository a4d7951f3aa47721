//! # TCP Probe
//!
//! Measures connect latency to an endpoint. The self-test probes the
//! configured target, or a loopback listener when none is set, so a test
//! run never depends on external reachability unless asked to.

use async_trait::async_trait;
use failsafe_engine::{
    BackendError, ComponentType, FailsafeStatus, Implementation, ImplementationDescriptor,
    Lifecycle, NetworkBackend, NetworkTransport, Strategy, TestResult,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;

pub const ID: &str = "tcp";

pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(3);

pub struct TcpProbe {
    probe_target: Option<String>,
    connect_timeout: Duration,
    active: AtomicBool,
}

impl TcpProbe {
    pub fn new(probe_target: Option<String>, connect_timeout: Duration) -> Self {
        Self {
            probe_target,
            connect_timeout,
            active: AtomicBool::new(false),
        }
    }

    async fn connect(&self, endpoint: &str) -> Result<Duration, BackendError> {
        let started = Instant::now();
        match timeout(self.connect_timeout, TcpStream::connect(endpoint)).await {
            Ok(Ok(_stream)) => Ok(started.elapsed()),
            Ok(Err(e)) => Err(BackendError::Io(format!("connect to {endpoint}: {e}"))),
            Err(_) => Err(BackendError::Timeout(self.timeout_millis())),
        }
    }

    /// Connect timeout in milliseconds, saturating at `u64::MAX`.
    fn timeout_millis(&self) -> u64 {
        u64::try_from(self.connect_timeout.as_millis()).unwrap_or(u64::MAX)
    }
}

impl Default for TcpProbe {
    fn default() -> Self {
        Self::new(None, DEFAULT_CONNECT_TIMEOUT)
    }
}

#[async_trait]
impl Lifecycle for TcpProbe {
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
        let (target, _listener) = match &self.probe_target {
            Some(target) => (target.clone(), None),
            None => {
                let listener = TcpListener::bind("127.0.0.1:0").await?;
                (listener.local_addr()?.to_string(), Some(listener))
            }
        };

        let result = match self.connect(&target).await {
            Ok(rtt) => TestResult::passed().with_latency(rtt),
            Err(e) => TestResult::failed([e.to_string()]),
        };
        Ok(result.with_detail("target", target))
    }
}

#[async_trait]
impl NetworkBackend for TcpProbe {
    fn transport(&self) -> NetworkTransport {
        NetworkTransport::Tcp
    }

    async fn probe(&self, endpoint: &str) -> Result<Duration, BackendError> {
        if !self.active.load(Ordering::Acquire) {
            return Err(BackendError::NotActive(ID.to_string()));
        }
        self.connect(endpoint).await
    }
}

pub fn descriptor() -> ImplementationDescriptor {
    ImplementationDescriptor::new(ID, ComponentType::Network)
        .with_name("TCP probe")
        .with_description("TCP connect reachability and latency")
        .with_priority(100)
        .with_strategy(Strategy::Default)
        .with_status(FailsafeStatus::Online)
}

pub fn implementation(
    probe_target: Option<String>,
    connect_timeout: Duration,
) -> Implementation<dyn NetworkBackend> {
    let backend: Arc<dyn NetworkBackend> = Arc::new(TcpProbe::new(probe_target, connect_timeout));
    Implementation::new(descriptor(), backend)
}
