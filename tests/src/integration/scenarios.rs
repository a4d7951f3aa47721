//! # Coordinator Scenarios
//!
//! End-to-end coordinator behaviour through the public manager API, driven
//! by scripted backends whose availability and activation can be flipped.

#[cfg(test)]
mod tests {
    use failsafe_engine::test_utils::{
        scripted_crypto, scripted_identity, scripted_storage, ScriptedTest,
    };
    use failsafe_engine::{ComponentType, FailsafeCoordinator, FailsafeManager, FailsafeStatus};
    use proptest::prelude::*;

    // =========================================================================
    // PRIMARY / ALTERNATE
    // =========================================================================

    #[tokio::test]
    async fn test_primary_alternate_lifecycle() {
        let manager = FailsafeManager::new();
        let (a, a_backend) = scripted_crypto("A", 100, FailsafeStatus::Online);
        let (b, b_backend) = scripted_crypto("B", 80, FailsafeStatus::Fallback);
        let crypto = manager.cryptography();
        crypto.register_implementation(a).await.unwrap();
        crypto.register_implementation(b).await.unwrap();

        assert_eq!(crypto.fallback_chain(), vec!["A", "B"]);
        assert_eq!(crypto.active_implementation_id().as_deref(), Some("A"));
        assert_eq!(a_backend.activation_count(), 0);

        // Manual switch to the alternate.
        assert!(manager.switch_to_crypto("B").await);
        assert_eq!(crypto.active_implementation_id().as_deref(), Some("B"));
        assert_eq!(crypto.get_status(), FailsafeStatus::Fallback);
        assert_eq!(a_backend.deactivation_count(), 1);
        assert_eq!(b_backend.activation_count(), 1);

        // B is last in the chain.
        assert!(!manager.simulate_failure(ComponentType::Cryptography).await);
        assert_eq!(crypto.active_implementation_id().as_deref(), Some("B"));

        // Removing B falls back to A.
        assert!(crypto.unregister_implementation("B").await);
        assert_eq!(crypto.active_implementation_id().as_deref(), Some("A"));
        assert_eq!(crypto.get_status(), FailsafeStatus::Online);
        assert!(a_backend.is_active());
        assert!(!b_backend.is_active());
    }

    #[tokio::test]
    async fn test_unregister_with_unavailable_primary_goes_offline() {
        let manager = FailsafeManager::new();
        let (a, a_backend) = scripted_crypto("A", 100, FailsafeStatus::Online);
        let (b, _) = scripted_crypto("B", 80, FailsafeStatus::Fallback);
        let crypto = manager.cryptography();
        crypto.register_implementation(a).await.unwrap();
        crypto.register_implementation(b).await.unwrap();
        assert!(manager.switch_to_crypto("B").await);

        a_backend.set_available(false);
        assert!(crypto.unregister_implementation("B").await);

        assert_eq!(crypto.active_implementation_id(), None);
        assert_eq!(crypto.get_status(), FailsafeStatus::Offline);
        let report = manager.get_failsafe_report();
        assert_eq!(report.overall_status, FailsafeStatus::Offline);
        assert!(report.recommendations[0].starts_with("CRITICAL"));
    }

    // =========================================================================
    // REPORTING
    // =========================================================================

    #[tokio::test]
    async fn test_three_healthy_components_report_online() {
        let manager = FailsafeManager::new();
        let (crypto, _) = scripted_crypto("xchacha", 100, FailsafeStatus::Online);
        let (storage, _) = scripted_storage("filesystem", 100, FailsafeStatus::Online);
        let (identity, _) = scripted_identity("ed25519", 100, FailsafeStatus::Online);
        manager.cryptography().register_implementation(crypto).await.unwrap();
        manager.storage().register_implementation(storage).await.unwrap();
        manager.identity().register_implementation(identity).await.unwrap();

        let report = manager.get_failsafe_report();

        assert_eq!(report.overall_status, FailsafeStatus::Online);
        assert!(report.recommendations.is_empty());
        assert_eq!(report.exit_code(), 0);
        for component in [
            ComponentType::Cryptography,
            ComponentType::Storage,
            ComponentType::Identity,
        ] {
            assert_eq!(report.components[&component].available_implementations.len(), 1);
        }
    }

    #[tokio::test]
    async fn test_failed_activation_degrades_component() {
        let manager = FailsafeManager::new();
        let (primary, _) = scripted_storage("primary", 100, FailsafeStatus::Online);
        let (flaky, flaky_backend) = scripted_storage("flaky", 60, FailsafeStatus::Fallback);
        manager.storage().register_implementation(primary).await.unwrap();
        manager.storage().register_implementation(flaky).await.unwrap();
        flaky_backend.set_activate_succeeds(false);

        assert!(!manager.simulate_failure(ComponentType::Storage).await);

        let report = manager.get_failsafe_report();
        let storage = &report.components[&ComponentType::Storage];
        assert_eq!(storage.status, FailsafeStatus::Degraded);
        assert_eq!(storage.active_implementation, None);
        assert_eq!(report.recommendations.len(), 1);
        assert!(manager.current_storage().is_none());
    }

    #[tokio::test]
    async fn test_self_tests_never_move_status() {
        let manager = FailsafeManager::new();
        let (primary, backend) = scripted_identity("ed25519", 100, FailsafeStatus::Online);
        manager.identity().register_implementation(primary).await.unwrap();
        backend.set_test(ScriptedTest::Error("key store unreadable".to_string()));

        let results = manager.test_all().await;

        let result = &results[&ComponentType::Identity]["ed25519"];
        assert!(!result.success);
        assert!(result.error_list()[0].contains("key store unreadable"));
        assert_eq!(manager.identity().get_status(), FailsafeStatus::Online);
    }

    // =========================================================================
    // CHAIN ORDERING
    // =========================================================================

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_chain_sorted_after_register_and_unregister(
            priorities in proptest::collection::vec(-3i32..3, 1..12),
            removal in any::<prop::sample::Index>(),
        ) {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .build()
                .unwrap();
            runtime.block_on(async {
                let coordinator = FailsafeCoordinator::new(ComponentType::Cryptography);
                for (n, priority) in priorities.iter().enumerate() {
                    let (implementation, _) =
                        scripted_crypto(&format!("impl-{n}"), *priority, FailsafeStatus::Online);
                    coordinator.register_implementation(implementation).await.unwrap();
                }
                let removed = format!("impl-{}", removal.index(priorities.len()));
                assert!(coordinator.unregister_implementation(&removed).await);

                let chain = coordinator.fallback_chain();
                let ranked: Vec<(i32, usize)> = chain
                    .iter()
                    .map(|id| {
                        let n: usize = id.trim_start_matches("impl-").parse().unwrap();
                        (priorities[n], n)
                    })
                    .collect();
                for pair in ranked.windows(2) {
                    let ((p1, n1), (p2, n2)) = (pair[0], pair[1]);
                    assert!(p1 > p2 || (p1 == p2 && n1 < n2), "chain out of order: {chain:?}");
                }
                assert_eq!(chain.len(), priorities.len() - 1);
                assert!(!chain.contains(&removed));
            });
        }
    }
}
