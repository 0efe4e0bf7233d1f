//! LogBackend - writes a one-line summary of each event

use std::collections::BTreeMap;
use std::io::{self, Write};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use contracts::{Backend, Event, MetricsError};
use tracing::{debug, instrument};

const LINE_PREFIX: &str = "[metrics] ";

/// Backend that prints events to stdout, stderr or any writer
pub struct LogBackend {
    name: String,
    writer: Mutex<Box<dyn Write + Send>>,
}

impl LogBackend {
    pub fn stdout(name: impl Into<String>) -> Self {
        Self::with_writer(name, io::stdout())
    }

    pub fn stderr(name: impl Into<String>) -> Self {
        Self::with_writer(name, io::stderr())
    }

    pub fn with_writer(name: impl Into<String>, writer: impl Write + Send + 'static) -> Self {
        Self {
            name: name.into(),
            writer: Mutex::new(Box::new(writer)),
        }
    }
}

fn format_event(event: &Event) -> String {
    // sorted for stable output
    let attributes: BTreeMap<_, _> = event
        .attributes
        .iter()
        .flatten()
        .map(|(k, v)| (k.as_str(), v.to_string()))
        .collect();

    format!(
        "{}{} {} {:?} ({:?}): {}",
        LINE_PREFIX,
        chrono::Local::now().format("%Y/%m/%d %H:%M:%S"),
        event.service,
        event.tags,
        attributes,
        event.metric
    )
}

#[async_trait]
impl Backend for LogBackend {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "log_backend_publish",
        skip(self, events),
        fields(backend = %self.name, events = events.len())
    )]
    async fn publish(&self, events: &[Event]) -> Result<(), MetricsError> {
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        for event in events {
            writeln!(writer, "{}", format_event(event))?;
            debug!(backend = %self.name, service = %event.service, "Event logged");
        }
        writer.flush()?;
        Ok(())
    }
}
