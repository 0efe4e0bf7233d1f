//! Backend implementations
//!
//! Contains LogBackend and NetworkBackend.

mod log;
mod network;

pub use self::log::LogBackend;
pub use self::network::NetworkBackend;
