//! Connector / Connection traits - outbound capability of network backends
//!
//! A connector opens sessions to a remote collector; a connection pushes
//! one wire event at a time over that session.

use crate::{Protocol, SendError, WireEvent};

/// Opens transport sessions
#[trait_variant::make(Connector: Send)]
pub trait LocalConnector {
    /// Live session type produced by this connector
    type Conn: Connection;

    /// Establish a session to `address` using `protocol`
    ///
    /// # Errors
    /// Returns the underlying I/O error; callers add address context
    async fn connect(&self, protocol: Protocol, address: &str) -> std::io::Result<Self::Conn>;
}

/// A live transport session
#[trait_variant::make(Connection: Send)]
pub trait LocalConnection {
    /// Transmit one event
    ///
    /// # Errors
    /// `SendError::PeerClosed` when the remote end went away; the session
    /// must not be reused after any error
    async fn send(&mut self, event: &WireEvent) -> Result<(), SendError>;
}
