//! Backend trait - Dispatcher output interface

use async_trait::async_trait;

use crate::{Event, MetricsError};

/// Event publishing backend
///
/// Backends are stored as `Arc<dyn Backend>` in the registry and may be
/// called from many tasks at once.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Backend name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Publish events in order, stopping at the first failure
    ///
    /// # Errors
    /// Returns the error of the first event that could not be published
    async fn publish(&self, events: &[Event]) -> Result<(), MetricsError>;
}
