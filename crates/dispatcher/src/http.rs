//! HTTP access helper

use std::time::Duration;

use contracts::{Event, MetricsError};

use crate::dispatcher::Dispatcher;

/// Status that marks an access as critical
const INTERNAL_SERVER_ERROR: u16 = 500;

impl Dispatcher {
    /// Publish the timing and rate events for one served HTTP request
    ///
    /// Emits `inbound.timings` (duration in milliseconds) followed by
    /// `outbound` (count of 1, carrying the status). Both are transient.
    pub async fn publish_http_access(
        &self,
        elapsed: Duration,
        status: u16,
    ) -> Result<(), MetricsError> {
        self.publish(&http_access_events(elapsed, status)).await
    }
}

fn http_access_events(elapsed: Duration, status: u16) -> [Event; 2] {
    let state = if status == INTERNAL_SERVER_ERROR {
        "critical"
    } else {
        "ok"
    };
    let millis = i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX);

    [
        Event::new("inbound.timings")
            .with_state(state)
            .with_tags(["http", "inbound", "percentiles"])
            .with_metric(millis)
            .transient(true),
        Event::new("outbound")
            .with_state(state)
            .with_http_status(status)
            .with_tags(["http", "outbound", "rate"])
            .with_metric(1)
            .transient(true),
    ]
}
