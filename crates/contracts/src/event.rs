//! Event - a single observation handed to the dispatcher

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Attribute value carried by an event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Bool(bool),
    String(String),
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{}", b),
            Self::String(s) => f.write_str(s),
        }
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

/// One observation to publish
///
/// Empty `host` is filled in by the dispatcher; `service` gets the configured
/// prefix prepended. Zero `ttl` and zero `http_status` mean "unset".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Status label, e.g. "ok" or "critical"
    #[serde(default)]
    pub state: String,

    /// Origin host
    #[serde(default)]
    pub host: String,

    /// Dot-delimited metric name
    pub service: String,

    /// HTTP status of the observed request (0 = none)
    #[serde(default)]
    pub http_status: u16,

    /// Observation value
    #[serde(default)]
    pub metric: i64,

    /// Seconds the observation stays valid (0 = backend default)
    #[serde(default)]
    pub ttl: f32,

    /// Ordered tags, duplicates allowed
    #[serde(default)]
    pub tags: Vec<String>,

    /// Do not persist
    #[serde(default)]
    pub transient: bool,

    /// Created on first `set_attr`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<HashMap<String, AttrValue>>,
}

impl Event {
    /// Create an event for the given service
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            ..Self::default()
        }
    }

    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.state = state.into();
        self
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_metric(mut self, metric: i64) -> Self {
        self.metric = metric;
        self
    }

    pub fn with_ttl(mut self, ttl: f32) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_http_status(mut self, status: u16) -> Self {
        self.http_status = status;
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn transient(mut self, transient: bool) -> Self {
        self.transient = transient;
        self
    }

    /// Set an attribute, creating the map on first use
    pub fn set_attr(&mut self, key: impl Into<String>, value: impl Into<AttrValue>) {
        self.attributes
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
    }

    pub fn attr(&self, key: &str) -> Option<&AttrValue> {
        self.attributes.as_ref().and_then(|attrs| attrs.get(key))
    }
}
