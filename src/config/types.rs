//! Configuration data types.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    /// Global settings
    #[serde(default)]
    pub global: GlobalConfig,

    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Metrics endpoint and labelling
    #[serde(default)]
    pub metrics: MetricsConfig,

    /// Demo route behaviour
    #[serde(default)]
    pub demo: DemoConfig,
}

/// Global configuration settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GlobalConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log format: json or pretty
    #[serde(default)]
    pub log_format: LogFormat,

    /// Service name used in logs, responses and the info gauge
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: LogFormat::Json,
            service_name: default_service_name(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Address and port to listen on
    #[serde(default = "default_listen")]
    pub listen: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

/// Metrics endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MetricsConfig {
    /// Path for the metrics endpoint
    #[serde(default = "default_metrics_path")]
    pub path: String,

    /// How the `path` label is derived from a request
    #[serde(default)]
    pub path_label: PathLabel,

    /// Whether scrapes of the metrics endpoint are themselves recorded
    #[serde(default)]
    pub record_self: bool,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            path: default_metrics_path(),
            path_label: PathLabel::Raw,
            record_self: false,
        }
    }
}

/// Source of the `path` label value.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PathLabel {
    /// The request path, unmodified.
    #[default]
    Raw,
    /// The matched route template, e.g. `/api/items/:id`.
    Route,
}

/// Demo route settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DemoConfig {
    /// Lower bound of the simulated work in `/api/data`
    #[serde(default = "default_data_delay_min", with = "humantime_serde")]
    pub data_delay_min: Duration,

    /// Upper bound of the simulated work in `/api/data`
    #[serde(default = "default_data_delay_max", with = "humantime_serde")]
    pub data_delay_max: Duration,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            data_delay_min: default_data_delay_min(),
            data_delay_max: default_data_delay_max(),
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_service_name() -> String {
    "example-rust-app".to_string()
}

fn default_listen() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 3000))
}

fn default_metrics_path() -> String {
    "/metrics".to_string()
}

fn default_data_delay_min() -> Duration {
    Duration::from_millis(50)
}

fn default_data_delay_max() -> Duration {
    Duration::from_millis(500)
}

/// Custom serde module for humantime durations.
mod humantime_serde {
    use serde::{self, Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let s = humantime::format_duration(*duration).to_string();
        serializer.serialize_str(&s)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        humantime::parse_duration(&s).map_err(serde::de::Error::custom)
    }
}
