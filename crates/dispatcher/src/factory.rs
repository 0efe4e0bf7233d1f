//! Build a ready-to-use dispatcher from configuration

use std::sync::Arc;

use contracts::{MetricsConfig, MetricsError, NetworkConfig};
use tracing::{info, instrument};

use crate::backends::{LogBackend, NetworkBackend};
use crate::dispatcher::{local_hostname, Dispatcher};
use crate::registry::BackendRegistry;

/// Name of the backend printing to stdout
pub const STDOUT_BACKEND: &str = "stdout";
/// Name of the backend printing to stderr
pub const STDERR_BACKEND: &str = "stderr";
/// Name of the network backend
pub const NETWORK_BACKEND: &str = "riemann";

/// Registry holding the bundled backends; nothing is selected yet
pub fn default_registry(network: &NetworkConfig) -> BackendRegistry {
    let registry = BackendRegistry::new();
    registry.register(STDOUT_BACKEND, Arc::new(LogBackend::stdout(STDOUT_BACKEND)));
    registry.register(STDERR_BACKEND, Arc::new(LogBackend::stderr(STDERR_BACKEND)));
    registry.register(
        NETWORK_BACKEND,
        Arc::new(NetworkBackend::from_config(NETWORK_BACKEND, network)),
    );
    registry
}

/// Create a dispatcher with the bundled backends registered and the
/// configured backend, prefix and host applied
///
/// No connection is opened here; the network backend connects on first use.
///
/// # Errors
/// `MetricsError::BackendNotFound` when `config.backend` names an unknown backend
#[instrument(name = "dispatcher_build", skip(config), fields(backend = ?config.backend))]
pub fn build_dispatcher(config: &MetricsConfig) -> Result<Dispatcher, MetricsError> {
    let registry = Arc::new(default_registry(&config.network));

    if let Some(name) = &config.backend {
        registry.select_active(name)?;
    }

    let host = config.host.clone().unwrap_or_else(local_hostname);
    let dispatcher = Dispatcher::with_default_host(registry, host);
    dispatcher.set_prefix(config.prefix.clone());

    info!(
        backend = ?config.backend,
        prefix = %config.prefix,
        host = %dispatcher.default_host(),
        "Dispatcher ready"
    );

    Ok(dispatcher)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_registry_names() {
        let registry = default_registry(&NetworkConfig::default());
        assert_eq!(registry.names(), vec!["riemann", "stderr", "stdout"]);
        assert!(registry.active().is_none());
    }

    #[test]
    fn test_build_applies_config() {
        let config = MetricsConfig {
            backend: Some("stdout".to_string()),
            prefix: "checkout.".to_string(),
            host: Some("web-3".to_string()),
            ..MetricsConfig::default()
        };

        let dispatcher = build_dispatcher(&config).unwrap();
        assert_eq!(dispatcher.prefix(), "checkout.");
        assert_eq!(dispatcher.default_host(), "web-3");
        assert_eq!(dispatcher.registry().active_name().as_deref(), Some("stdout"));
    }

    #[test]
    fn test_build_unknown_backend() {
        let config = MetricsConfig {
            backend: Some("graphite".to_string()),
            ..MetricsConfig::default()
        };
        let err = build_dispatcher(&config).err().unwrap();
        assert!(matches!(err, MetricsError::BackendNotFound { .. }));
    }

    #[test]
    fn test_build_without_backend_selects_nothing() {
        let dispatcher = build_dispatcher(&MetricsConfig::default()).unwrap();
        assert!(dispatcher.registry().active().is_none());
        assert!(!dispatcher.default_host().is_empty());
    }
}
