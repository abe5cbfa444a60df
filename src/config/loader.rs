//! Configuration file loading.

use crate::config::{validate_config, Config};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    ParseError(#[from] serde_yaml::Error),

    #[error("configuration validation failed: {0}")]
    ValidationError(String),
}

/// Load configuration from a YAML file.
///
/// Reads the file, parses the YAML, and validates the result. Every section
/// is optional, so an empty document yields the defaults.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let contents = std::fs::read_to_string(path.as_ref())?;
    parse_config(&contents)
}

/// Parse and validate configuration from a YAML string.
pub fn parse_config(contents: &str) -> Result<Config, ConfigError> {
    // serde_yaml rejects an empty document, treat it as all defaults
    let config: Config = if contents.trim().is_empty() {
        Config::default()
    } else {
        serde_yaml::from_str(contents)?
    };

    validate_config(&config).map_err(ConfigError::ValidationError)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LogFormat, PathLabel};
    use std::io::Write;
    use std::time::Duration;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_full_config() {
        let yaml = r#"
global:
  log_level: debug
  log_format: pretty
  service_name: orders
server:
  listen: "0.0.0.0:8080"
metrics:
  path: /internal/metrics
  path_label: route
  record_self: true
demo:
  data_delay_min: 1ms
  data_delay_max: 2ms
"#;

        let mut file = NamedTempFile::new().unwrap();
        file.write_all(yaml.as_bytes()).unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.global.log_level, "debug");
        assert_eq!(config.global.log_format, LogFormat::Pretty);
        assert_eq!(config.global.service_name, "orders");
        assert_eq!(config.server.listen.port(), 8080);
        assert_eq!(config.metrics.path, "/internal/metrics");
        assert_eq!(config.metrics.path_label, PathLabel::Route);
        assert!(config.metrics.record_self);
        assert_eq!(config.demo.data_delay_max, Duration::from_millis(2));
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.metrics.path, "/metrics");
        assert_eq!(config.global.service_name, "example-rust-app");
    }

    #[test]
    fn test_partial_document() {
        let config = parse_config("metrics:\n  path_label: route\n").unwrap();
        assert_eq!(config.metrics.path_label, PathLabel::Route);
        assert_eq!(config.metrics.path, "/metrics");
        assert_eq!(config.global.log_level, "info");
    }

    #[test]
    fn test_load_missing_file() {
        let result = load_config("/nonexistent/path/config.yaml");
        assert!(matches!(result.unwrap_err(), ConfigError::ReadError(_)));
    }

    #[test]
    fn test_load_invalid_yaml() {
        let result = parse_config("not: valid: yaml: {{{}}}");
        assert!(matches!(result.unwrap_err(), ConfigError::ParseError(_)));
    }

    #[test]
    fn test_validation_failure() {
        let result = parse_config("global:\n  log_level: chatty\n");
        assert!(matches!(result.unwrap_err(), ConfigError::ValidationError(_)));
    }
}
