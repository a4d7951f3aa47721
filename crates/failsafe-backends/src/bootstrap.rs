//! # Bootstrap
//!
//! Self-registration of the reference backends at process start. Backends
//! are only registered here; activation is a separate, explicit step.

use failsafe_engine::{ComponentType, FailsafeManager, RegistrationError};
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::{communication, crypto, execution, identity, network, storage};

/// Settings the reference backends need.
#[derive(Debug, Clone)]
pub struct BackendSettings {
    /// Root directory for filesystem storage.
    pub data_dir: PathBuf,
    /// Endpoint the TCP self-test probes; loopback when `None`.
    pub probe_target: Option<String>,
    pub connect_timeout: Duration,
    /// Backend ids to register. `None` registers everything.
    pub enabled: Option<BTreeSet<String>>,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data/failsafe"),
            probe_target: None,
            connect_timeout: network::tcp::DEFAULT_CONNECT_TIMEOUT,
            enabled: None,
        }
    }
}

impl BackendSettings {
    fn is_enabled(&self, id: &str) -> bool {
        self.enabled
            .as_ref()
            .map_or(true, |enabled| enabled.contains(id))
    }
}

/// Ids of every reference backend, by component.
pub const REFERENCE_BACKENDS: [(ComponentType, &str); 11] = [
    (ComponentType::Cryptography, crypto::xchacha::ID),
    (ComponentType::Cryptography, crypto::aes_gcm::ID),
    (ComponentType::Identity, identity::ed25519::ID),
    (ComponentType::Identity, identity::secp256k1::ID),
    (ComponentType::Storage, storage::filesystem::ID),
    (ComponentType::Storage, storage::memory::ID),
    (ComponentType::Communication, communication::channel::ID),
    (ComponentType::Communication, communication::queue::ID),
    (ComponentType::Network, network::tcp::ID),
    (ComponentType::Execution, execution::blocking::ID),
    (ComponentType::Execution, execution::inline::ID),
];

/// Register every enabled reference backend with its coordinator.
///
/// Returns the number registered. Stops at the first rejection, which only
/// happens when the manager already holds one of these ids.
pub async fn register_default_backends(
    manager: &FailsafeManager,
    settings: &BackendSettings,
) -> Result<usize, RegistrationError> {
    let mut registered = 0;

    macro_rules! register {
        ($coordinator:expr, $id:expr, $implementation:expr) => {
            if settings.is_enabled($id) {
                $coordinator.register_implementation($implementation).await?;
                registered += 1;
            } else {
                debug!(implementation = $id, "Backend disabled by configuration");
            }
        };
    }

    let ciphers = manager.cryptography();
    register!(ciphers, crypto::xchacha::ID, crypto::xchacha::implementation());
    register!(ciphers, crypto::aes_gcm::ID, crypto::aes_gcm::implementation());

    let identities = manager.identity();
    register!(identities, identity::ed25519::ID, identity::ed25519::implementation());
    register!(identities, identity::secp256k1::ID, identity::secp256k1::implementation());

    let stores = manager.storage();
    register!(
        stores,
        storage::filesystem::ID,
        storage::filesystem::implementation(settings.data_dir.clone())
    );
    register!(stores, storage::memory::ID, storage::memory::implementation());

    let channels = manager.communication();
    register!(channels, communication::channel::ID, communication::channel::implementation());
    register!(channels, communication::queue::ID, communication::queue::implementation());

    register!(
        manager.network(),
        network::tcp::ID,
        network::tcp::implementation(settings.probe_target.clone(), settings.connect_timeout)
    );

    let executors = manager.execution();
    register!(executors, execution::blocking::ID, execution::blocking::implementation());
    register!(executors, execution::inline::ID, execution::inline::implementation());

    info!(registered, "Reference backends registered");
    Ok(registered)
}

/// Activate every coordinator's most preferred usable implementation.
///
/// Registration only sets the active pointer; this performs the actual
/// activation, walking down the chain until one implementation comes up.
/// Returns the components left without a confirmed implementation.
pub async fn activate_primaries(manager: &FailsafeManager) -> Vec<ComponentType> {
    let mut unconfirmed = Vec::new();
    for coordinator in manager.coordinators() {
        let component = coordinator.component_type();
        let chain = coordinator.available_implementations();
        if chain.is_empty() {
            continue;
        }

        let mut activated = None;
        for id in &chain {
            if coordinator.switch_to_implementation(id).await {
                activated = Some(id);
                break;
            }
            warn!(component = %component, implementation = %id, "Implementation did not come up; trying next");
        }

        match activated {
            Some(id) => {
                debug!(component = %component, implementation = %id, "Component active")
            }
            None => {
                warn!(component = %component, "No implementation could be activated");
                unconfirmed.push(component);
            }
        }
    }
    unconfirmed
}
