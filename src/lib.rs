//! reqmetrics - an instrumented example HTTP service
//!
//! This crate provides:
//! - An in-memory request metrics registry (counters and duration summaries)
//! - Prometheus text exposition of that registry
//! - A small HTTP service whose every request is timed and recorded
//! - Structured logging with per-request spans

pub mod config;
pub mod http;
pub mod metrics;
pub mod state;
pub mod util;

pub use config::Config;
pub use metrics::MetricsRegistry;
pub use state::AppState;
