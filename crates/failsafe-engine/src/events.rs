//! # Failsafe Events
//!
//! Every coordinator state change is published on an in-memory broadcast bus
//! so operators and monitors can follow switches and failovers without
//! polling. Publishing with no subscribers is not an error; the event is
//! dropped and counted.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::broadcast;
use tracing::debug;
use uuid::Uuid;

use crate::domain::{ComponentType, FailsafeStatus};

/// Events buffered per subscriber before lagging.
pub const DEFAULT_EVENT_CAPACITY: usize = 256;

/// Why a switch did not complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SwitchFailure {
    UnknownImplementation,
    Unavailable,
    ActivationFailed,
}

/// Coordinator state change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FailsafeEvent {
    ImplementationRegistered {
        component: ComponentType,
        id: String,
        priority: i32,
    },
    RegistrationRejected {
        component: ComponentType,
        id: String,
        reason: String,
    },
    ImplementationUnregistered {
        component: ComponentType,
        id: String,
        was_active: bool,
    },
    ImplementationSwitched {
        component: ComponentType,
        from: Option<String>,
        to: String,
    },
    SwitchFailed {
        component: ComponentType,
        id: String,
        reason: SwitchFailure,
    },
    FailoverExhausted {
        component: ComponentType,
        active: Option<String>,
    },
    StatusChanged {
        component: ComponentType,
        from: FailsafeStatus,
        to: FailsafeStatus,
    },
}

impl FailsafeEvent {
    /// Component the event concerns.
    pub fn component(&self) -> ComponentType {
        match self {
            Self::ImplementationRegistered { component, .. }
            | Self::RegistrationRejected { component, .. }
            | Self::ImplementationUnregistered { component, .. }
            | Self::ImplementationSwitched { component, .. }
            | Self::SwitchFailed { component, .. }
            | Self::FailoverExhausted { component, .. }
            | Self::StatusChanged { component, .. } => *component,
        }
    }
}

/// Event plus delivery metadata.
#[derive(Debug, Clone, Serialize)]
pub struct EventEnvelope {
    pub event_id: Uuid,
    pub emitted_at: DateTime<Utc>,
    pub event: FailsafeEvent,
}

/// In-memory broadcast bus shared by all coordinators of one manager.
pub struct EventBus {
    sender: broadcast::Sender<EventEnvelope>,
    events_published: AtomicU64,
    capacity: usize,
}

impl EventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_EVENT_CAPACITY)
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender,
            events_published: AtomicU64::new(0),
            capacity: capacity.max(1),
        }
    }

    /// Publish an event. Returns the number of subscribers that received it.
    pub fn publish(&self, event: FailsafeEvent) -> usize {
        self.events_published.fetch_add(1, Ordering::Relaxed);
        let component = event.component();
        let envelope = EventEnvelope {
            event_id: Uuid::new_v4(),
            emitted_at: Utc::now(),
            event,
        };

        match self.sender.send(envelope) {
            Ok(receivers) => receivers,
            Err(_) => {
                debug!(component = %component, "Failsafe event dropped (no subscribers)");
                0
            }
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EventEnvelope> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    pub fn events_published(&self) -> u64 {
        self.events_published.load(Ordering::Relaxed)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
