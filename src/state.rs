//! Shared application state.

use crate::config::Config;
use crate::http::Router;
use crate::metrics::{MetricsRegistry, ProcessInfo};
use crate::util::ShutdownSignal;
use std::sync::Arc;

/// Shared state handed to every connection task.
#[derive(Clone)]
pub struct AppState {
    /// Configuration the process was started with.
    config: Arc<Config>,

    /// Request metrics for this process.
    metrics: MetricsRegistry,

    /// Route table.
    router: Arc<Router>,

    /// Shutdown signal.
    shutdown: ShutdownSignal,
}

impl AppState {
    /// Create application state with a fresh registry.
    pub fn new(config: Config) -> Self {
        let info = ProcessInfo::new(
            config.global.service_name.clone(),
            env!("CARGO_PKG_VERSION"),
        );
        Self::with_registry(config, MetricsRegistry::new(info))
    }

    /// Create application state around an existing registry.
    pub fn with_registry(config: Config, metrics: MetricsRegistry) -> Self {
        let router = Router::new(config.metrics.path.clone());
        Self {
            config: Arc::new(config),
            metrics,
            router: Arc::new(router),
            shutdown: ShutdownSignal::new(),
        }
    }

    /// Get the configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get the metrics registry.
    pub fn metrics(&self) -> &MetricsRegistry {
        &self.metrics
    }

    /// Get the router.
    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Get the shutdown signal.
    pub fn shutdown(&self) -> &ShutdownSignal {
        &self.shutdown
    }

    /// Trigger shutdown.
    pub fn trigger_shutdown(&self) {
        self.shutdown.shutdown();
    }
}
