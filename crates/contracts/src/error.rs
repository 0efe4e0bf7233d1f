//! Layered error definitions
//!
//! Categorized by source: registry / transport / dispatch / config

use thiserror::Error;

use crate::Protocol;

/// Failure while transmitting a single event over a live connection.
#[derive(Debug, Error)]
pub enum SendError {
    /// The remote end closed the session (EOF, reset, broken pipe)
    #[error("peer closed the connection")]
    PeerClosed,

    /// Any other transport failure
    #[error("transport error: {0}")]
    Io(#[source] std::io::Error),

    /// The event could not be encoded into a frame
    #[error("encode error: {0}")]
    Encode(String),
}

impl SendError {
    /// Returns true when the remote end is gone
    pub fn is_peer_closed(&self) -> bool {
        matches!(self, Self::PeerClosed)
    }
}

/// Unified error type
#[derive(Debug, Error)]
pub enum MetricsError {
    // ===== Registry Errors =====
    /// Selecting a backend name that was never registered
    #[error("backend not found: {name}")]
    BackendNotFound { name: String },

    // ===== Transport Errors =====
    /// Establishing the transport session failed
    #[error("failed to connect to {address} over {protocol}: {source}")]
    Connection {
        protocol: Protocol,
        address: String,
        #[source]
        source: std::io::Error,
    },

    /// Sending an event failed
    #[error("send failed: {0}")]
    Send(#[from] SendError),

    // ===== Dispatch Errors =====
    /// Wraps a backend failure with the service name of the failing event
    #[error("error publishing metric '{service}': {source}")]
    Publish {
        service: String,
        #[source]
        source: Box<MetricsError>,
    },

    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl MetricsError {
    /// Create backend-not-found error
    pub fn backend_not_found(name: impl Into<String>) -> Self {
        Self::BackendNotFound { name: name.into() }
    }

    /// Create connection error
    pub fn connection(
        protocol: Protocol,
        address: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        Self::Connection {
            protocol,
            address: address.into(),
            source,
        }
    }

    /// Wrap a backend error with the failing event's service name
    pub fn publish(service: impl Into<String>, source: MetricsError) -> Self {
        Self::Publish {
            service: service.into(),
            source: Box::new(source),
        }
    }

    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// The innermost send error, looking through dispatch wrappers
    pub fn send_error(&self) -> Option<&SendError> {
        match self {
            Self::Send(e) => Some(e),
            Self::Publish { source, .. } => source.send_error(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_error_names_service() {
        let err = MetricsError::publish("api.requests", SendError::PeerClosed.into());
        assert_eq!(
            err.to_string(),
            "error publishing metric 'api.requests': send failed: peer closed the connection"
        );
        assert!(err.send_error().is_some_and(SendError::is_peer_closed));
    }

    #[test]
    fn test_connection_error_display() {
        let err = MetricsError::connection(
            Protocol::Tcp,
            "127.0.0.1:5555",
            std::io::Error::from(std::io::ErrorKind::ConnectionRefused),
        );
        let msg = err.to_string();
        assert!(msg.contains("127.0.0.1:5555"));
        assert!(msg.contains("tcp"));
        assert!(err.send_error().is_none());
    }
}
