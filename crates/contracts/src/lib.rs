//! # Contracts
//!
//! Shared interface contracts for the event publishing facade.
//! All other crates depend on this one; reverse dependencies are prohibited.
//!
//! ## Data flow
//! - Application code builds [`Event`] values
//! - The dispatcher hands each event to the active [`Backend`]
//! - Network backends convert events into [`WireEvent`] and push them
//!   through a [`Connection`] obtained from a [`Connector`]

mod backend;
mod config;
mod error;
mod event;
mod transport;
mod wire;

pub use backend::Backend;
pub use config::*;
pub use error::*;
pub use event::{AttrValue, Event};
pub use transport::{Connection, Connector};
pub use wire::{WireEvent, HTTP_STATUS_ATTR, PERSIST_ATTR};
