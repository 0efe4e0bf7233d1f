//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use contracts::Protocol;
use std::path::PathBuf;

/// metrics-publish - send events through the configured metrics backend
#[derive(Parser, Debug)]
#[command(
    name = "metrics-publish",
    author,
    version,
    about = "Publish metric events to a monitoring collector",
    long_about = "Publishes metric events through a single active backend.\n\n\
                  Backends: 'riemann' streams events to a remote collector over \n\
                  TCP or UDP, 'stdout'/'stderr' print them. Without a selected \n\
                  backend events are silently dropped."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "METRICS_PUBLISH_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "METRICS_PUBLISH_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    /// Prometheus metrics port (0 = disabled)
    #[arg(long, default_value = "0", global = true, env = "METRICS_PUBLISH_METRICS_PORT")]
    pub metrics_port: u16,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Publish one or more events
    Send(SendArgs),

    /// Validate configuration file
    Validate(ValidateArgs),

    /// Display configuration information
    Info(InfoArgs),
}

/// Arguments for the `send` command
#[derive(Parser, Debug, Clone)]
pub struct SendArgs {
    /// Path to configuration file (TOML or JSON); defaults are used when absent
    #[arg(short, long, env = "METRICS_PUBLISH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Backend to activate (riemann, stdout, stderr)
    #[arg(long, env = "METRICS_BACKEND")]
    pub backend: Option<String>,

    /// Override collector address (host:port)
    #[arg(long, env = "RIEMANN_ADDR")]
    pub addr: Option<String>,

    /// Override collector protocol
    #[arg(long, env = "RIEMANN_NET")]
    pub protocol: Option<Protocol>,

    /// Override service-name prefix
    #[arg(long, env = "METRICS_PREFIX")]
    pub prefix: Option<String>,

    /// Override default event host
    #[arg(long, env = "METRICS_HOST")]
    pub host: Option<String>,

    /// Service name of the event
    #[arg(short, long)]
    pub service: String,

    /// Event state
    #[arg(long, default_value = "ok")]
    pub state: String,

    /// Metric value
    #[arg(short, long, default_value = "1", allow_negative_numbers = true)]
    pub metric: i64,

    /// TTL in seconds (0 = collector default)
    #[arg(long, default_value = "0")]
    pub ttl: f32,

    /// Tag (repeatable)
    #[arg(short, long = "tag")]
    pub tags: Vec<String>,

    /// Attribute as key=value (repeatable)
    #[arg(short, long = "attr", value_parser = parse_attr)]
    pub attrs: Vec<(String, String)>,

    /// Mark the event as not to be persisted
    #[arg(long)]
    pub transient: bool,

    /// HTTP status attached to the event (0 = none)
    #[arg(long, default_value = "0")]
    pub http_status: u16,

    /// Publish the HTTP access pair instead: --metric is the duration in
    /// milliseconds and --http-status the response status
    #[arg(long, conflicts_with_all = ["tags", "attrs"])]
    pub http_access: bool,

    /// Number of times to publish
    #[arg(long, default_value = "1")]
    pub count: u64,

    /// Pause between publishes in milliseconds
    #[arg(long, default_value = "1000")]
    pub interval_ms: u64,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "metrics.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "metrics.toml")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => Self::Json,
            LogFormat::Pretty => Self::Pretty,
            LogFormat::Compact => Self::Compact,
        }
    }
}

fn parse_attr(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", s))?;
    if key.is_empty() {
        return Err(format!("attribute key is empty in '{}'", s));
    }
    Ok((key.to_string(), value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_attr() {
        assert_eq!(
            parse_attr("region=eu=west"),
            Ok(("region".to_string(), "eu=west".to_string()))
        );
        assert!(parse_attr("novalue").is_err());
        assert!(parse_attr("=x").is_err());
    }

    #[test]
    fn test_send_args() {
        let cli = Cli::try_parse_from([
            "metrics-publish",
            "send",
            "--service",
            "api.requests",
            "--protocol",
            "udp",
            "-t",
            "http",
            "-t",
            "inbound",
            "-a",
            "route=/users",
            "--metric",
            "-5",
        ])
        .unwrap();

        let Commands::Send(args) = cli.command else {
            panic!("expected send command");
        };
        assert_eq!(args.service, "api.requests");
        assert_eq!(args.protocol, Some(Protocol::Udp));
        assert_eq!(args.tags, vec!["http", "inbound"]);
        assert_eq!(args.attrs, vec![("route".to_string(), "/users".to_string())]);
        assert_eq!(args.metric, -5);
        assert_eq!(args.count, 1);
    }

    #[test]
    fn test_validate_default_path() {
        let cli = Cli::try_parse_from(["metrics-publish", "validate"]).unwrap();
        let Commands::Validate(args) = cli.command else {
            panic!("expected validate command");
        };
        assert_eq!(args.config, PathBuf::from("metrics.toml"));
    }
}
