//! # Dispatcher
//!
//! Event publishing facade.
//!
//! Responsibilities:
//! - Keep a registry of named backends with one active selection
//! - Rewrite events (service prefix, default host) and forward them
//! - Maintain the network backend's lazily opened, self-healing connection

pub mod backends;
pub mod dispatcher;
pub mod factory;
pub mod http;
pub mod metrics;
pub mod registry;
pub mod transport;

pub use backends::{LogBackend, NetworkBackend};
pub use contracts::{Backend, Event, MetricsError};
pub use dispatcher::{local_hostname, Dispatcher};
pub use factory::{
    build_dispatcher, default_registry, NETWORK_BACKEND, STDERR_BACKEND, STDOUT_BACKEND,
};
pub use metrics::BackendMetrics;
pub use registry::BackendRegistry;
pub use transport::{NetConnection, NetConnector};
