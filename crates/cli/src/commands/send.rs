//! `send` command implementation.

use anyhow::{Context, Result};
use contracts::{Event, MetricsConfig};
use dispatcher::{build_dispatcher, Dispatcher};
use std::time::{Duration, Instant};
use tracing::{info, warn};

use crate::cli::SendArgs;

/// Outcome counters for one `send` invocation
#[derive(Debug, Default)]
struct SendStats {
    published: u64,
    failed: u64,
    duration: Duration,
}

impl SendStats {
    fn print_summary(&self) {
        println!("\n=== Publish Statistics ===\n");
        println!("  Published: {}", self.published);
        println!("  Failed:    {}", self.failed);
        println!("  Duration:  {:.2}s", self.duration.as_secs_f64());
        println!();
    }
}

/// Execute the `send` command
pub async fn run_send(args: &SendArgs) -> Result<()> {
    let mut config = load_config(args)?;
    apply_overrides(&mut config, args);

    config_loader::ConfigLoader::validate(&config).context("Invalid configuration")?;

    let dispatcher = build_dispatcher(&config).context("Failed to set up dispatcher")?;

    match dispatcher.registry().active_name() {
        Some(backend) => info!(
            backend = %backend,
            protocol = %config.network.protocol,
            addr = %config.network.addr,
            "Publishing"
        ),
        None => warn!("No backend selected, events will be dropped"),
    }

    let event = build_event(args);
    let started = Instant::now();
    let mut stats = SendStats::default();

    let shutdown = setup_shutdown_signal();
    tokio::pin!(shutdown);

    for i in 0..args.count {
        if i > 0 {
            tokio::select! {
                _ = tokio::time::sleep(Duration::from_millis(args.interval_ms)) => {}
                _ = &mut shutdown => {
                    warn!("Received shutdown signal, stopping");
                    break;
                }
            }
        }

        // Failures are reported and the next round retries over a fresh connection
        match publish_once(&dispatcher, args, &event).await {
            Ok(()) => stats.published += 1,
            Err(e) => {
                stats.failed += 1;
                warn!(attempt = i + 1, error = %e, "Publish failed");
            }
        }
    }

    stats.duration = started.elapsed();
    info!(
        published = stats.published,
        failed = stats.failed,
        duration_secs = stats.duration.as_secs_f64(),
        "Send finished"
    );
    stats.print_summary();

    if stats.published == 0 && stats.failed > 0 {
        anyhow::bail!("All {} publish attempts failed", stats.failed);
    }
    Ok(())
}

async fn publish_once(
    dispatcher: &Dispatcher,
    args: &SendArgs,
    event: &Event,
) -> Result<(), contracts::MetricsError> {
    if args.http_access {
        let millis = u64::try_from(args.metric).unwrap_or(0);
        dispatcher
            .publish_http_access(Duration::from_millis(millis), args.http_status)
            .await
    } else {
        dispatcher.publish(std::slice::from_ref(event)).await
    }
}

fn load_config(args: &SendArgs) -> Result<MetricsConfig> {
    let Some(path) = &args.config else {
        info!("No configuration file given, using defaults");
        return Ok(MetricsConfig::default());
    };

    if !path.exists() {
        anyhow::bail!("Configuration file not found: {}", path.display());
    }

    info!(config = %path.display(), "Loading configuration");
    config_loader::ConfigLoader::load_from_path(path)
        .with_context(|| format!("Failed to load config from {}", path.display()))
}

/// Apply CLI overrides on top of the loaded configuration
fn apply_overrides(config: &mut MetricsConfig, args: &SendArgs) {
    if let Some(ref backend) = args.backend {
        info!(backend = %backend, "Overriding backend from CLI");
        config.backend = Some(backend.clone());
    }
    if let Some(ref addr) = args.addr {
        info!(addr = %addr, "Overriding collector address from CLI");
        config.network.addr = addr.clone();
    }
    if let Some(protocol) = args.protocol {
        info!(protocol = %protocol, "Overriding protocol from CLI");
        config.network.protocol = protocol;
    }
    if let Some(ref prefix) = args.prefix {
        config.prefix = prefix.clone();
    }
    if let Some(ref host) = args.host {
        config.host = Some(host.clone());
    }
}

fn build_event(args: &SendArgs) -> Event {
    let mut event = Event::new(args.service.clone())
        .with_state(args.state.clone())
        .with_metric(args.metric)
        .with_ttl(args.ttl)
        .with_tags(args.tags.iter().cloned())
        .with_http_status(args.http_status)
        .transient(args.transient);

    for (key, value) in &args.attrs {
        event.set_attr(key.clone(), value.clone());
    }
    event
}

/// Resolves on Ctrl+C or SIGTERM
async fn setup_shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
