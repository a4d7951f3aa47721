//! # Reference Backends Behind the Manager
//!
//! Registers the shipped backends the way the runtime does and drives them
//! through their capability traits across switches and failovers.

#[cfg(test)]
mod tests {
    use failsafe_backends::{activate_primaries, register_default_backends, BackendSettings};
    use failsafe_engine::{
        BackendError, ChannelMessage, ComponentType, CryptoAlgorithm, FailsafeManager,
        FailsafeStatus, StorageMedium,
    };
    use tempfile::TempDir;

    async fn bootstrapped(dir: &TempDir) -> FailsafeManager {
        let manager = FailsafeManager::new();
        let settings = BackendSettings {
            data_dir: dir.path().join("store"),
            ..BackendSettings::default()
        };
        register_default_backends(&manager, &settings).await.unwrap();
        assert!(activate_primaries(&manager).await.is_empty());
        manager
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_crypto_failover_changes_algorithm() {
        let dir = TempDir::new().unwrap();
        let manager = bootstrapped(&dir).await;

        let primary = manager.current_crypto().unwrap();
        let sealed = primary.encrypt(b"launch codes").await.unwrap();
        assert_eq!(sealed.algorithm, CryptoAlgorithm::XChaCha20Poly1305);

        assert!(manager.simulate_failure(ComponentType::Cryptography).await);
        let alternate = manager.current_crypto().unwrap();
        assert_eq!(alternate.algorithm(), CryptoAlgorithm::Aes256Gcm);
        assert_eq!(
            manager.cryptography().get_status(),
            FailsafeStatus::Fallback
        );

        // Payloads sealed by the primary are not readable by the alternate.
        assert!(matches!(
            alternate.decrypt(&sealed).await,
            Err(BackendError::InvalidInput(_))
        ));
        let resealed = alternate.encrypt(b"launch codes").await.unwrap();
        assert_eq!(alternate.decrypt(&resealed).await.unwrap(), b"launch codes");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_storage_failover_to_memory() {
        let dir = TempDir::new().unwrap();
        let manager = bootstrapped(&dir).await;

        let disk = manager.current_storage().unwrap();
        assert_eq!(disk.medium(), StorageMedium::Filesystem);
        disk.put("peer/7", b"persisted").await.unwrap();
        assert_eq!(disk.get("peer/7").await.unwrap().as_deref(), Some(&b"persisted"[..]));

        assert!(manager.simulate_failure(ComponentType::Storage).await);

        let memory = manager.current_storage().unwrap();
        assert_eq!(memory.medium(), StorageMedium::Memory);
        assert_eq!(memory.get("peer/7").await.unwrap(), None);
        memory.put("peer/7", b"volatile").await.unwrap();
        assert!(memory.delete("peer/7").await.unwrap());

        let report = manager.get_failsafe_report();
        assert_eq!(report.overall_status, FailsafeStatus::Emergency);
        assert!(report.recommendations[0].starts_with("URGENT"));
        assert!(manager.storage_by_medium(StorageMedium::Filesystem).is_some());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_identity_switch_changes_scheme() {
        let dir = TempDir::new().unwrap();
        let manager = bootstrapped(&dir).await;

        let ed25519 = manager.current_identity().unwrap();
        let public_key = ed25519.public_key().await.unwrap();
        let signature = ed25519.sign(b"handshake").await.unwrap();
        assert!(ed25519.verify(&public_key, b"handshake", &signature).await.unwrap());
        assert!(!ed25519.verify(&public_key, b"tampered", &signature).await.unwrap());

        assert!(manager.switch_to_identity("secp256k1").await);
        let secp = manager.current_identity().unwrap();
        let secp_key = secp.public_key().await.unwrap();
        assert_eq!(secp_key.len(), 33);
        let secp_signature = secp.sign(b"handshake").await.unwrap();
        assert!(secp.verify(&secp_key, b"handshake", &secp_signature).await.unwrap());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_communication_failover_to_queue() {
        let dir = TempDir::new().unwrap();
        let manager = bootstrapped(&dir).await;

        let channel = manager.current_communication().unwrap();
        channel
            .send(ChannelMessage::new("alerts", b"ping".to_vec()))
            .await
            .unwrap();
        assert_eq!(channel.receive().await.unwrap().unwrap().payload, b"ping");

        assert!(manager.simulate_failure(ComponentType::Communication).await);
        let queue = manager.current_communication().unwrap();
        queue
            .send(ChannelMessage::new("alerts", b"pong".to_vec()))
            .await
            .unwrap();
        assert_eq!(queue.receive().await.unwrap().unwrap().topic, "alerts");
        assert!(queue.receive().await.unwrap().is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_execution_failover_to_inline() {
        let dir = TempDir::new().unwrap();
        let manager = bootstrapped(&dir).await;

        let pool = manager.current_execution().unwrap();
        let output = pool
            .execute(Box::new(|| -> Result<Vec<u8>, BackendError> { Ok(vec![1, 2, 3]) }))
            .await
            .unwrap();
        assert_eq!(output, vec![1, 2, 3]);

        assert!(manager.simulate_failure(ComponentType::Execution).await);
        assert_eq!(
            manager.execution().active_implementation_id().as_deref(),
            Some("inline")
        );
        // Inline is last: a second failure is a hard stop.
        assert!(!manager.simulate_failure(ComponentType::Execution).await);
        assert_eq!(manager.execution().get_status(), FailsafeStatus::Emergency);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_all_reference_self_tests_pass() {
        let dir = TempDir::new().unwrap();
        let manager = bootstrapped(&dir).await;

        let results = manager.test_all().await;

        for (component, by_id) in &results {
            for (id, result) in by_id {
                assert!(result.success, "{component}/{id} failed: {:?}", result.errors);
            }
        }
        let xchacha = &results[&ComponentType::Cryptography]["xchacha20poly1305"];
        assert!(xchacha.latency_ms.is_some());
        assert!(xchacha.details.as_ref().unwrap().contains_key("algorithm"));
    }
}
