//! `info` command implementation.

use anyhow::{Context, Result};
use contracts::MetricsConfig;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::info;

use crate::cli::InfoArgs;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    backend: Option<String>,
    available_backends: Vec<String>,
    prefix: String,
    host: String,
    host_from_config: bool,
    network: NetworkInfo,
}

#[derive(Serialize)]
struct NetworkInfo {
    protocol: String,
    addr: String,
    format: String,
    max_datagram_size: usize,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    attributes: BTreeMap<String, String>,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    if !args.config.exists() {
        anyhow::bail!("Configuration file not found: {}", args.config.display());
    }

    let config = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    let info = build_config_info(&config);

    if args.json {
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&info);
    }

    Ok(())
}

fn build_config_info(config: &MetricsConfig) -> ConfigInfo {
    let network = &config.network;

    ConfigInfo {
        backend: config.backend.clone(),
        available_backends: dispatcher::default_registry(network).names(),
        prefix: config.prefix.clone(),
        host: config
            .host
            .clone()
            .unwrap_or_else(dispatcher::local_hostname),
        host_from_config: config.host.is_some(),
        network: NetworkInfo {
            protocol: network.protocol.to_string(),
            addr: network.addr.clone(),
            format: format!("{:?}", network.format).to_lowercase(),
            max_datagram_size: network.max_datagram_size,
            attributes: network
                .attributes
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        },
    }
}

fn print_config_info(info: &ConfigInfo) {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║               Metrics Publisher Configuration                ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    println!("📤 Dispatch");
    println!(
        "   ├─ Backend: {}",
        info.backend.as_deref().unwrap_or("(none, events dropped)")
    );
    println!("   ├─ Available: {}", info.available_backends.join(", "));
    println!("   ├─ Prefix: {:?}", info.prefix);
    if info.host_from_config {
        println!("   └─ Default host: {}", info.host);
    } else {
        println!("   └─ Default host: {} (machine hostname)", info.host);
    }

    let network = &info.network;
    println!("\n🌐 Network");
    println!("   ├─ Collector: {}://{}", network.protocol, network.addr);
    println!("   ├─ Format: {}", network.format);
    if network.attributes.is_empty() {
        println!("   └─ Max datagram: {} bytes", network.max_datagram_size);
    } else {
        println!("   ├─ Max datagram: {} bytes", network.max_datagram_size);
        println!("   └─ Attributes ({}):", network.attributes.len());
        let last = network.attributes.len() - 1;
        for (i, (key, value)) in network.attributes.iter().enumerate() {
            let prefix = if i == last { "└─" } else { "├─" };
            println!("        {} {} = {}", prefix, key, value);
        }
    }

    println!();
}
