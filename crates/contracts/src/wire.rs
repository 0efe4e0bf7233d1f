//! WireEvent - the shape transmitted to a remote collector

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::Event;

/// Attribute carrying the stringified HTTP status
pub const HTTP_STATUS_ATTR: &str = "status";

/// Attribute carrying the persistence flag ("true" / "false")
pub const PERSIST_ATTR: &str = "persist";

/// Event as seen by the collector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireEvent {
    pub host: String,
    /// Unix seconds
    pub time: i64,
    pub state: String,
    pub service: String,
    pub metric: i64,
    pub ttl: f32,
    #[serde(default)]
    pub tags: Vec<String>,
    /// String-valued; boolean attributes are rendered as "true"/"false"
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

impl WireEvent {
    /// Convert an event, layering synthesized attributes under caller ones.
    ///
    /// `extra` entries (backend-wide static attributes) are added last and,
    /// like the synthesized `status`/`persist` entries, never replace a key
    /// the caller already set.
    pub fn from_event(event: &Event, time: i64, extra: &HashMap<String, String>) -> Self {
        let mut attributes: BTreeMap<String, String> = event
            .attributes
            .iter()
            .flatten()
            .map(|(k, v)| (k.clone(), v.to_string()))
            .collect();

        if event.http_status != 0 {
            attributes
                .entry(HTTP_STATUS_ATTR.to_string())
                .or_insert_with(|| event.http_status.to_string());
        }

        let persist = if event.transient { "false" } else { "true" };
        attributes
            .entry(PERSIST_ATTR.to_string())
            .or_insert_with(|| persist.to_string());

        for (k, v) in extra {
            attributes.entry(k.clone()).or_insert_with(|| v.clone());
        }

        Self {
            host: event.host.clone(),
            time,
            state: event.state.clone(),
            service: event.service.clone(),
            metric: event.metric,
            ttl: event.ttl,
            tags: event.tags.clone(),
            attributes,
        }
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }
}
