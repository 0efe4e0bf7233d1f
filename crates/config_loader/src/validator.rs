//! Configuration validation
//!
//! Rules:
//! - `backend`, if set, is non-empty
//! - `prefix` contains no whitespace
//! - `host`, if set, is non-empty
//! - `network.addr` is `host:port` with a numeric port
//! - `network.max_datagram_size` > 0

use contracts::{MetricsConfig, MetricsError};

/// Validate a MetricsConfig
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(config: &MetricsConfig) -> Result<(), MetricsError> {
    validate_backend(config)?;
    validate_prefix(config)?;
    validate_host(config)?;
    validate_network(config)?;
    Ok(())
}

fn validate_backend(config: &MetricsConfig) -> Result<(), MetricsError> {
    if config.backend.as_deref().is_some_and(|b| b.trim().is_empty()) {
        return Err(MetricsError::config_validation(
            "backend",
            "backend name cannot be empty",
        ));
    }
    Ok(())
}

fn validate_prefix(config: &MetricsConfig) -> Result<(), MetricsError> {
    if config.prefix.chars().any(char::is_whitespace) {
        return Err(MetricsError::config_validation(
            "prefix",
            format!("prefix '{}' must not contain whitespace", config.prefix),
        ));
    }
    Ok(())
}

fn validate_host(config: &MetricsConfig) -> Result<(), MetricsError> {
    if config.host.as_deref().is_some_and(|h| h.trim().is_empty()) {
        return Err(MetricsError::config_validation(
            "host",
            "host override cannot be empty",
        ));
    }
    Ok(())
}

fn validate_network(config: &MetricsConfig) -> Result<(), MetricsError> {
    let network = &config.network;

    if network.addr.is_empty() {
        return Err(MetricsError::config_validation(
            "network.addr",
            "address cannot be empty",
        ));
    }

    // Accepts "host:port" and "[v6]:port"
    let port = network
        .addr
        .rsplit_once(':')
        .map(|(_, port)| port)
        .ok_or_else(|| {
            MetricsError::config_validation(
                "network.addr",
                format!("address '{}' is missing a port", network.addr),
            )
        })?;

    if port.parse::<u16>().is_err() {
        return Err(MetricsError::config_validation(
            "network.addr",
            format!("invalid port '{}' in address '{}'", port, network.addr),
        ));
    }

    if network.max_datagram_size == 0 {
        return Err(MetricsError::config_validation(
            "network.max_datagram_size",
            "max_datagram_size must be > 0",
        ));
    }

    Ok(())
}
