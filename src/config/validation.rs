//! Configuration validation.

use crate::config::Config;
use crate::http::is_reserved_path;

/// Validate the configuration.
///
/// Checks for:
/// - A known log level
/// - A non-empty service name
/// - A metrics path that is absolute and does not shadow a demo route
/// - Demo delay bounds in order
///
/// # Returns
///
/// `Ok(())` if valid, or an error message describing every problem found.
pub fn validate_config(config: &Config) -> Result<(), String> {
    let mut errors = Vec::new();

    // Validate log level
    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.global.log_level.to_lowercase().as_str()) {
        errors.push(format!(
            "invalid log level '{}', must be one of: {}",
            config.global.log_level,
            valid_levels.join(", ")
        ));
    }

    if config.global.service_name.trim().is_empty() {
        errors.push("service name cannot be empty".to_string());
    }

    // Validate metrics path
    let path = &config.metrics.path;
    if !path.starts_with('/') {
        errors.push(format!("metrics path '{}' must start with '/'", path));
    } else if is_reserved_path(path) {
        errors.push(format!(
            "metrics path '{}' conflicts with a built-in route",
            path
        ));
    }

    // Validate demo delays
    let demo = &config.demo;
    if demo.data_delay_min > demo.data_delay_max {
        errors.push(format!(
            "data_delay_min ({}) must not exceed data_delay_max ({})",
            humantime::format_duration(demo.data_delay_min),
            humantime::format_duration(demo.data_delay_max)
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors.join("; "))
    }
}
