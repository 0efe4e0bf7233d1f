//! # Config Loader
//!
//! Configuration loading and parsing module.
//!
//! Responsibilities:
//! - Parse TOML/JSON configuration files
//! - Validate configuration legality
//! - Produce a `MetricsConfig`
//!
//! # Example
//!
//! ```no_run
//! use config_loader::ConfigLoader;
//! use std::path::Path;
//!
//! let config = ConfigLoader::load_from_path(Path::new("metrics.toml")).unwrap();
//! println!("Collector: {}", config.network.addr);
//! ```

mod parser;
mod validator;

pub use contracts::MetricsConfig;
pub use parser::ConfigFormat;

use contracts::MetricsError;
use std::path::Path;

/// Configuration loader
///
/// Provides static methods to load configuration from files or strings.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from file path
    ///
    /// Automatically detects format from file extension (.toml / .json).
    ///
    /// # Errors
    /// - File read failure
    /// - Unsupported format
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_path(path: &Path) -> Result<MetricsConfig, MetricsError> {
        let format = Self::detect_format(path)?;
        let content = Self::read_file(path)?;
        Self::load_from_str(&content, format)
    }

    /// Load configuration from string
    ///
    /// # Errors
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_str(
        content: &str,
        format: ConfigFormat,
    ) -> Result<MetricsConfig, MetricsError> {
        Self::parse_and_validate(content, format)
    }

    /// Validate an already-built configuration (e.g. after CLI overrides)
    pub fn validate(config: &MetricsConfig) -> Result<(), MetricsError> {
        validator::validate(config)
    }

    /// Serialize MetricsConfig to JSON string
    pub fn to_json(config: &MetricsConfig) -> Result<String, MetricsError> {
        serde_json::to_string_pretty(config)
            .map_err(|e| MetricsError::config_parse(format!("JSON serialize error: {e}")))
    }
}

impl ConfigLoader {
    /// Infer configuration format from file extension
    fn detect_format(path: &Path) -> Result<ConfigFormat, MetricsError> {
        let ext = path.extension().and_then(|e| e.to_str()).ok_or_else(|| {
            MetricsError::config_parse("cannot determine file format from extension")
        })?;

        ConfigFormat::from_extension(ext)
            .ok_or_else(|| MetricsError::config_parse(format!("unsupported config format: .{ext}")))
    }

    fn read_file(path: &Path) -> Result<String, MetricsError> {
        Ok(std::fs::read_to_string(path)?)
    }

    fn parse_and_validate(
        content: &str,
        format: ConfigFormat,
    ) -> Result<MetricsConfig, MetricsError> {
        let config = parser::parse(content, format)?;
        validator::validate(&config)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{Protocol, WireFormat};
    use std::io::Write;

    const MINIMAL_TOML: &str = r#"
backend = "riemann"
prefix = "checkout."

[network]
protocol = "udp"
addr = "collector.internal:5555"
format = "bincode"

[network.attributes]
version = "1.4.0"
"#;

    #[test]
    fn test_load_from_str_toml() {
        let result = ConfigLoader::load_from_str(MINIMAL_TOML, ConfigFormat::Toml);
        assert!(result.is_ok(), "Failed: {:?}", result.err());
        let config = result.unwrap();
        assert_eq!(config.backend.as_deref(), Some("riemann"));
        assert_eq!(config.prefix, "checkout.");
        assert_eq!(config.network.protocol, Protocol::Udp);
        assert_eq!(config.network.format, WireFormat::Bincode);
        assert_eq!(
            config.network.attributes.get("version").map(String::as_str),
            Some("1.4.0")
        );
    }

    #[test]
    fn test_round_trip_json() {
        let config = ConfigLoader::load_from_str(MINIMAL_TOML, ConfigFormat::Toml).unwrap();
        let json = ConfigLoader::to_json(&config).unwrap();
        let config2 = ConfigLoader::load_from_str(&json, ConfigFormat::Json).unwrap();
        assert_eq!(config.network.addr, config2.network.addr);
        assert_eq!(config.backend, config2.backend);
    }

    #[test]
    fn test_validation_runs_after_parse() {
        let content = r#"
[network]
addr = "no-port-here"
"#;
        let result = ConfigLoader::load_from_str(content, ConfigFormat::Toml);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("port"));
    }

    #[test]
    fn test_load_from_path_detects_format() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(MINIMAL_TOML.as_bytes()).unwrap();

        let config = ConfigLoader::load_from_path(file.path()).unwrap();
        assert_eq!(config.network.addr, "collector.internal:5555");
    }

    #[test]
    fn test_load_from_path_rejects_unknown_extension() {
        let file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        let err = ConfigLoader::load_from_path(file.path()).unwrap_err();
        assert!(err.to_string().contains("unsupported config format"));
    }
}
