//! Dispatcher - the `publish` entry point
//!
//! Rewrites each event (service prefix, default host) and forwards it to
//! whichever backend the registry marks active.

use std::sync::{Arc, PoisonError, RwLock};

use contracts::{Event, MetricsError};
use observability::record_event_published;
use tracing::{instrument, trace, warn};

use crate::registry::BackendRegistry;

#[derive(Debug, Clone)]
struct DispatchSettings {
    prefix: String,
    default_host: String,
}

/// Publishes events through the active backend of a registry
pub struct Dispatcher {
    registry: Arc<BackendRegistry>,
    settings: RwLock<DispatchSettings>,
}

impl Dispatcher {
    /// Create a dispatcher whose default host is this machine's hostname
    pub fn new(registry: Arc<BackendRegistry>) -> Self {
        Self::with_default_host(registry, local_hostname())
    }

    pub fn with_default_host(registry: Arc<BackendRegistry>, host: impl Into<String>) -> Self {
        Self {
            registry,
            settings: RwLock::new(DispatchSettings {
                prefix: String::new(),
                default_host: host.into(),
            }),
        }
    }

    pub fn registry(&self) -> &Arc<BackendRegistry> {
        &self.registry
    }

    /// Set the string prepended to every service name
    pub fn set_prefix(&self, prefix: impl Into<String>) {
        self.settings
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .prefix = prefix.into();
    }

    /// Set the host used for events that carry none
    pub fn set_default_host(&self, host: impl Into<String>) {
        self.settings
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .default_host = host.into();
    }

    pub fn prefix(&self) -> String {
        self.settings().prefix
    }

    pub fn default_host(&self) -> String {
        self.settings().default_host
    }

    /// Publish events to the active backend, one at a time and in order
    ///
    /// Without an active backend this does nothing and succeeds. The caller's
    /// events are not modified; each is copied before rewriting.
    ///
    /// # Errors
    /// Stops at the first event the backend rejects and returns
    /// `MetricsError::Publish` naming that event's (prefixed) service.
    /// Events before it may already have been transmitted.
    #[instrument(name = "dispatcher_publish", skip(self, events), fields(events = events.len()))]
    pub async fn publish(&self, events: &[Event]) -> Result<(), MetricsError> {
        let Some(backend) = self.registry.active() else {
            trace!("No active backend, dropping events");
            return Ok(());
        };

        let settings = self.settings();

        for event in events {
            let event = prepare_event(event, &settings);

            if let Err(e) = backend.publish(std::slice::from_ref(&event)).await {
                record_event_published(backend.name(), false);
                return Err(MetricsError::publish(event.service, e));
            }
            record_event_published(backend.name(), true);
        }

        Ok(())
    }

    fn settings(&self) -> DispatchSettings {
        self.settings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

fn prepare_event(event: &Event, settings: &DispatchSettings) -> Event {
    let mut event = event.clone();
    event.service = format!("{}{}", settings.prefix, event.service);
    if event.host.is_empty() {
        event.host = settings.default_host.clone();
    }
    event
}

/// Hostname of this machine, or "localhost" when it cannot be determined
pub fn local_hostname() -> String {
    match read_hostname() {
        Some(host) if !host.is_empty() => host,
        _ => {
            warn!("Could not determine hostname, using 'localhost'");
            "localhost".to_string()
        }
    }
}

#[cfg(unix)]
fn read_hostname() -> Option<String> {
    nix::unistd::gethostname()
        .ok()
        .and_then(|name| name.into_string().ok())
}

#[cfg(not(unix))]
fn read_hostname() -> Option<String> {
    std::env::var("COMPUTERNAME").ok()
}
