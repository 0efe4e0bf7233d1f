//! Publishing self-metrics
//!
//! Thin wrappers over the `metrics` facade. Without an installed recorder
//! these are no-ops.

use metrics::counter;

/// Record one event handed to a backend
pub fn record_event_published(backend: &str, success: bool) {
    let status = if success { "success" } else { "failure" };
    counter!(
        "metrics_publisher_events_total",
        "backend" => backend.to_string(),
        "status" => status
    )
    .increment(1);
}

/// Record a connection attempt by a network backend
pub fn record_connect(backend: &str, success: bool) {
    let status = if success { "success" } else { "failure" };
    counter!(
        "metrics_publisher_connects_total",
        "backend" => backend.to_string(),
        "status" => status
    )
    .increment(1);
}

/// Record a connection teardown after a send failure
pub fn record_disconnect(backend: &str, peer_closed: bool) {
    let reason = if peer_closed { "peer_closed" } else { "send_error" };
    counter!(
        "metrics_publisher_disconnects_total",
        "backend" => backend.to_string(),
        "reason" => reason
    )
    .increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_without_recorder_is_noop() {
        record_event_published("riemann", true);
        record_connect("riemann", false);
        record_disconnect("riemann", true);
    }
}
