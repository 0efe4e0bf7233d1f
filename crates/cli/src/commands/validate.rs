//! `validate` command implementation.

use anyhow::{Context, Result};
use contracts::{MetricsConfig, Protocol};
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Largest payload a UDP datagram can carry over IPv4
const MAX_UDP_PAYLOAD: usize = 65507;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    backend: Option<String>,
    prefix: String,
    protocol: String,
    addr: String,
    attribute_count: usize,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    if !args.config.exists() {
        return invalid(config_path, format!("File not found: {}", args.config.display()));
    }

    let config = match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(config) => config,
        Err(e) => return invalid(config_path, e.to_string()),
    };

    if let Some(ref backend) = config.backend {
        let known = dispatcher::default_registry(&config.network).names();
        if !known.iter().any(|name| name == backend) {
            return invalid(
                config_path,
                format!("Unknown backend '{}', expected one of {:?}", backend, known),
            );
        }
    }

    let warnings = collect_warnings(&config);

    ValidationResult {
        valid: true,
        config_path,
        error: None,
        warnings: if warnings.is_empty() {
            None
        } else {
            Some(warnings)
        },
        summary: Some(ConfigSummary {
            backend: config.backend.clone(),
            prefix: config.prefix.clone(),
            protocol: config.network.protocol.to_string(),
            addr: config.network.addr.clone(),
            attribute_count: config.network.attributes.len(),
        }),
    }
}

fn invalid(config_path: String, error: String) -> ValidationResult {
    ValidationResult {
        valid: false,
        config_path,
        error: Some(error),
        warnings: None,
        summary: None,
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(config: &MetricsConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    if config.backend.is_none() {
        warnings.push("No backend selected - published events will be dropped".to_string());
    }

    if config.network.protocol == Protocol::Udp
        && config.network.max_datagram_size > MAX_UDP_PAYLOAD
    {
        warnings.push(format!(
            "network.max_datagram_size {} exceeds the UDP payload limit of {}",
            config.network.max_datagram_size, MAX_UDP_PAYLOAD
        ));
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!(
                "\n  Backend: {}",
                summary.backend.as_deref().unwrap_or("(none)")
            );
            println!("  Prefix: {:?}", summary.prefix);
            println!("  Collector: {}://{}", summary.protocol, summary.addr);
            println!("  Static attributes: {}", summary.attribute_count);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}
