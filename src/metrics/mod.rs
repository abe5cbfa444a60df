//! Request metrics aggregation and exposition.

pub mod exposition;
mod labels;
mod registry;

pub use exposition::CONTENT_TYPE;
pub use labels::{DurationStats, RequestKey, RouteKey};
pub use registry::{MetricsRegistry, ProcessInfo, RequestTimer};
