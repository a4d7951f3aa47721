//! # Event Stream
//!
//! Subscribers see every coordinator state change in the order it happened.

#[cfg(test)]
mod tests {
    use failsafe_engine::test_utils::scripted_storage;
    use failsafe_engine::{
        ComponentType, EventEnvelope, FailsafeEvent, FailsafeManager, FailsafeStatus,
    };
    use tokio::sync::broadcast::Receiver;

    fn drain(rx: &mut Receiver<EventEnvelope>) -> Vec<FailsafeEvent> {
        let mut events = Vec::new();
        while let Ok(envelope) = rx.try_recv() {
            events.push(envelope.event);
        }
        events
    }

    #[tokio::test]
    async fn test_failover_until_exhausted() {
        let manager = FailsafeManager::new();
        let (primary, _) = scripted_storage("filesystem", 100, FailsafeStatus::Online);
        let (emergency, _) = scripted_storage("memory", 50, FailsafeStatus::Emergency);
        manager.storage().register_implementation(primary).await.unwrap();
        manager.storage().register_implementation(emergency).await.unwrap();
        let mut rx = manager.subscribe();

        assert!(manager.simulate_failure(ComponentType::Storage).await);
        assert!(!manager.simulate_failure(ComponentType::Storage).await);

        let events = drain(&mut rx);
        assert!(events.contains(&FailsafeEvent::ImplementationSwitched {
            component: ComponentType::Storage,
            from: Some("filesystem".to_string()),
            to: "memory".to_string(),
        }));
        assert!(events.contains(&FailsafeEvent::StatusChanged {
            component: ComponentType::Storage,
            from: FailsafeStatus::Online,
            to: FailsafeStatus::Emergency,
        }));
        assert_eq!(
            events.last(),
            Some(&FailsafeEvent::FailoverExhausted {
                component: ComponentType::Storage,
                active: Some("memory".to_string()),
            })
        );
    }

    #[tokio::test]
    async fn test_rejected_registration_is_published() {
        let manager = FailsafeManager::new();
        let (first, _) = scripted_storage("memory", 50, FailsafeStatus::Online);
        let (duplicate, _) = scripted_storage("memory", 90, FailsafeStatus::Online);
        manager.storage().register_implementation(first).await.unwrap();
        let mut rx = manager.subscribe();

        assert!(manager
            .storage()
            .register_implementation(duplicate)
            .await
            .is_err());

        let events = drain(&mut rx);
        assert_eq!(events.len(), 1);
        assert!(matches!(
            &events[0],
            FailsafeEvent::RegistrationRejected { id, .. } if id == "memory"
        ));
        assert_eq!(manager.storage().len(), 1);
    }

    #[tokio::test]
    async fn test_sole_unregister_publishes_offline() {
        let manager = FailsafeManager::new();
        let (only, _) = scripted_storage("memory", 50, FailsafeStatus::Online);
        manager.storage().register_implementation(only).await.unwrap();
        let mut rx = manager.subscribe();

        assert!(manager.storage().unregister_implementation("memory").await);

        let events = drain(&mut rx);
        assert!(events.contains(&FailsafeEvent::ImplementationUnregistered {
            component: ComponentType::Storage,
            id: "memory".to_string(),
            was_active: true,
        }));
        assert!(events.contains(&FailsafeEvent::StatusChanged {
            component: ComponentType::Storage,
            from: FailsafeStatus::Online,
            to: FailsafeStatus::Offline,
        }));
        assert!(manager.events().events_published() >= 2);
    }
}
