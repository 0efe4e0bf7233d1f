//! NetworkBackend - lazily connected collector client
//!
//! Connection state is `Option<Conn>` behind an async mutex:
//! - `None` until the first publish, while a batch is being sent, and after
//!   any send failure or cancelled publish
//! - the next publish reconnects once, then sends
//!
//! The lock is held for the whole batch, so concurrent publishers queue up
//! behind one another instead of racing on teardown and reconnect.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use contracts::{
    Backend, Connection, Connector, Event, MetricsError, NetworkConfig, Protocol, WireEvent,
};
use observability::{record_connect, record_disconnect};
use tokio::sync::Mutex;
use tracing::{debug, instrument, warn};

use crate::metrics::BackendMetrics;
use crate::transport::NetConnector;

/// Backend that streams events to a remote collector
pub struct NetworkBackend<C: Connector> {
    name: String,
    protocol: Protocol,
    address: String,
    /// Static attributes added to every wire event
    attributes: HashMap<String, String>,
    connector: C,
    connection: Mutex<Option<C::Conn>>,
    metrics: Arc<BackendMetrics>,
}

impl<C: Connector> NetworkBackend<C> {
    /// Create a backend; no connection is opened until the first publish
    pub fn new(
        name: impl Into<String>,
        protocol: Protocol,
        address: impl Into<String>,
        connector: C,
    ) -> Self {
        Self {
            name: name.into(),
            protocol,
            address: address.into(),
            attributes: HashMap::new(),
            connector,
            connection: Mutex::new(None),
            metrics: Arc::new(BackendMetrics::new()),
        }
    }

    pub fn with_attributes(mut self, attributes: HashMap<String, String>) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn metrics(&self) -> &Arc<BackendMetrics> {
        &self.metrics
    }

    /// Whether a live connection is currently held
    pub async fn is_connected(&self) -> bool {
        self.connection.lock().await.is_some()
    }

    async fn open(&self) -> Result<C::Conn, MetricsError> {
        match self.connector.connect(self.protocol, &self.address).await {
            Ok(conn) => {
                self.metrics.inc_connect_count();
                record_connect(&self.name, true);
                debug!(
                    backend = %self.name,
                    protocol = %self.protocol,
                    address = %self.address,
                    "Connected to collector"
                );
                Ok(conn)
            }
            Err(e) => {
                self.metrics.inc_connect_failure_count();
                record_connect(&self.name, false);
                warn!(
                    backend = %self.name,
                    address = %self.address,
                    error = %e,
                    "Connect failed"
                );
                Err(MetricsError::connection(self.protocol, &self.address, e))
            }
        }
    }
}

impl NetworkBackend<NetConnector> {
    /// Build a backend using the bundled TCP/UDP transport
    pub fn from_config(name: impl Into<String>, config: &NetworkConfig) -> Self {
        Self::new(
            name,
            config.protocol,
            config.addr.clone(),
            NetConnector::from_config(config),
        )
        .with_attributes(config.attributes.clone())
    }
}

#[async_trait]
impl<C> Backend for NetworkBackend<C>
where
    C: Connector + Send + Sync + 'static,
    C::Conn: Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "network_backend_publish",
        skip(self, events),
        fields(backend = %self.name, events = events.len())
    )]
    async fn publish(&self, events: &[Event]) -> Result<(), MetricsError> {
        let mut guard = self.connection.lock().await;

        // Out of the slot while sending: a cancelled or failed send leaves it
        // empty, so a half-written frame is never followed by another one
        let mut conn = match guard.take() {
            Some(conn) => conn,
            None => self.open().await?,
        };

        for event in events {
            let wire =
                WireEvent::from_event(event, chrono::Utc::now().timestamp(), &self.attributes);

            if let Err(e) = conn.send(&wire).await {
                let peer_closed = e.is_peer_closed();

                self.metrics.inc_failure_count();
                self.metrics.inc_disconnect_count();
                record_disconnect(&self.name, peer_closed);
                warn!(
                    backend = %self.name,
                    service = %event.service,
                    peer_closed,
                    error = %e,
                    "Send failed, dropping connection"
                );
                return Err(e.into());
            }

            self.metrics.inc_sent_count();
            debug!(backend = %self.name, service = %wire.service, "Sent");
        }

        *guard = Some(conn);
        Ok(())
    }
}
