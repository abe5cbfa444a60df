//! In-memory request metrics registry.
//!
//! Aggregates request counts by (method, path, status) and request durations by
//! (method, path), and renders them in the Prometheus text exposition format.

use crate::metrics::exposition::{format_float, write_header, write_sample, MetricType};
use crate::metrics::labels::{DurationStats, RequestKey, RouteKey, Series};
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::{Duration, Instant};

const REQUESTS_TOTAL: &str = "http_requests_total";
const REQUESTS_TOTAL_HELP: &str = "Total number of HTTP requests";
const REQUEST_DURATION: &str = "http_request_duration_seconds";
const REQUEST_DURATION_HELP: &str = "Duration of HTTP requests in seconds";
const APP_INFO: &str = "app_info";
const APP_INFO_HELP: &str = "Application build information";

/// Static process metadata rendered as the `app_info` gauge.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProcessInfo {
    pub service: String,
    pub version: String,
}

impl ProcessInfo {
    pub fn new(service: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            version: version.into(),
        }
    }
}

impl Default for ProcessInfo {
    fn default() -> Self {
        Self::new(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
    }
}

#[derive(Clone, Default)]
struct Snapshot {
    requests: Series<RequestKey, u64>,
    durations: Series<RouteKey, DurationStats>,
}

/// Request metrics registry.
///
/// Cheap to clone; all clones share the same state.
#[derive(Clone)]
pub struct MetricsRegistry {
    inner: Arc<RegistryInner>,
}

struct RegistryInner {
    /// Both series live under one lock so a request updates them together.
    state: RwLock<Snapshot>,
    info: ProcessInfo,
}

impl MetricsRegistry {
    /// Create an empty registry.
    pub fn new(info: ProcessInfo) -> Self {
        Self {
            inner: Arc::new(RegistryInner {
                state: RwLock::new(Snapshot::default()),
                info,
            }),
        }
    }

    /// Process metadata this registry reports.
    pub fn info(&self) -> &ProcessInfo {
        &self.inner.info
    }

    /// Record a completed request.
    pub fn record_request(&self, method: &str, path: &str, status: u16, duration_seconds: f64) {
        let key = RequestKey::new(method, path, status);
        let route = key.route();

        let mut state = self.inner.state.write();
        *state.requests.entry(key) += 1;
        state.durations.entry(route).observe(duration_seconds);
    }

    /// Record a completed request with a `Duration`.
    pub fn record_request_duration(
        &self,
        method: &str,
        path: &str,
        status: u16,
        duration: Duration,
    ) {
        self.record_request(method, path, status, duration.as_secs_f64());
    }

    /// Current count for a (method, path, status) tuple. Absent tuples are 0.
    pub fn counter(&self, method: &str, path: &str, status: u16) -> u64 {
        let key = RequestKey::new(method, path, status);
        self.inner
            .state
            .read()
            .requests
            .get(&key)
            .copied()
            .unwrap_or(0)
    }

    /// Current duration statistics for a (method, path) tuple.
    pub fn duration(&self, method: &str, path: &str) -> Option<DurationStats> {
        let key = RouteKey::new(method, path);
        self.inner.state.read().durations.get(&key).copied()
    }

    /// Start timing a request. The returned timer records on `finish`.
    pub fn start_request_timer(&self, method: &str) -> RequestTimer {
        RequestTimer {
            registry: self.clone(),
            method: method.to_string(),
            start: Instant::now(),
        }
    }

    /// Render all families in the text exposition format.
    pub fn render(&self) -> String {
        let snapshot = self.inner.state.read().clone();

        let mut out = String::new();

        write_header(&mut out, REQUESTS_TOTAL, REQUESTS_TOTAL_HELP, MetricType::Counter);
        for (key, count) in snapshot.requests.iter() {
            let status = key.status.to_string();
            write_sample(
                &mut out,
                REQUESTS_TOTAL,
                &[
                    ("method", key.method.as_str()),
                    ("path", key.path.as_str()),
                    ("status", status.as_str()),
                ],
                &count.to_string(),
            );
        }

        out.push('\n');
        write_header(
            &mut out,
            REQUEST_DURATION,
            REQUEST_DURATION_HELP,
            MetricType::Summary,
        );
        let sum_name = format!("{}_sum", REQUEST_DURATION);
        let count_name = format!("{}_count", REQUEST_DURATION);
        for (key, stats) in snapshot.durations.iter() {
            let labels = [("method", key.method.as_str()), ("path", key.path.as_str())];
            write_sample(&mut out, &sum_name, &labels, &format_float(stats.sum));
            write_sample(&mut out, &count_name, &labels, &stats.count.to_string());
        }

        out.push('\n');
        write_header(&mut out, APP_INFO, APP_INFO_HELP, MetricType::Gauge);
        let info = &self.inner.info;
        write_sample(
            &mut out,
            APP_INFO,
            &[
                ("service", info.service.as_str()),
                ("version", info.version.as_str()),
            ],
            "1",
        );

        out
    }
}

impl Default for MetricsRegistry {
    fn default() -> Self {
        Self::new(ProcessInfo::default())
    }
}

/// Wall-clock timer for one request.
pub struct RequestTimer {
    registry: MetricsRegistry,
    method: String,
    start: Instant,
}

impl RequestTimer {
    /// Get the elapsed duration.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Record the request under `path` with its final status and consume the timer.
    ///
    /// Dropping the timer without calling this records nothing.
    pub fn finish(self, path: &str, status: u16) -> Duration {
        let duration = self.start.elapsed();
        self.registry
            .record_request_duration(&self.method, path, status, duration);
        duration
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> MetricsRegistry {
        MetricsRegistry::new(ProcessInfo::new("test-app", "1.2.3"))
    }

    #[test]
    fn test_empty_render() {
        let expected = "\
# HELP http_requests_total Total number of HTTP requests
# TYPE http_requests_total counter

# HELP http_request_duration_seconds Duration of HTTP requests in seconds
# TYPE http_request_duration_seconds summary

# HELP app_info Application build information
# TYPE app_info gauge
app_info{service=\"test-app\",version=\"1.2.3\"} 1
";
        assert_eq!(registry().render(), expected);
    }

    #[test]
    fn test_record_and_render() {
        let registry = registry();
        registry.record_request("GET", "/", 200, 0.01);
        registry.record_request("GET", "/", 200, 0.03);

        let output = registry.render();
        assert!(output.contains("http_requests_total{method=\"GET\",path=\"/\",status=\"200\"} 2\n"));
        assert!(output.contains("http_request_duration_seconds_sum{method=\"GET\",path=\"/\"} 0.04\n"));
        assert!(output.contains("http_request_duration_seconds_count{method=\"GET\",path=\"/\"} 2\n"));
    }

    #[test]
    fn test_duration_excludes_status() {
        let registry = registry();
        registry.record_request("GET", "/api/error", 500, 0.5);
        registry.record_request("GET", "/api/error", 200, 0.25);

        assert_eq!(registry.counter("GET", "/api/error", 500), 1);
        assert_eq!(registry.counter("GET", "/api/error", 200), 1);

        let stats = registry.duration("GET", "/api/error").unwrap();
        assert_eq!(stats.count, 2);
        assert_eq!(stats.sum, 0.75);
    }

    #[test]
    fn test_absent_counter_is_zero() {
        let registry = registry();
        assert_eq!(registry.counter("GET", "/nope", 200), 0);
        assert!(registry.duration("GET", "/nope").is_none());
    }

    #[test]
    fn test_insertion_order() {
        let registry = registry();
        registry.record_request("POST", "/z", 201, 0.1);
        registry.record_request("GET", "/a", 200, 0.1);
        registry.record_request("POST", "/z", 201, 0.1);

        let output = registry.render();
        let z = output.find("path=\"/z\",status").unwrap();
        let a = output.find("path=\"/a\",status").unwrap();
        assert!(z < a);
    }

    #[test]
    fn test_render_is_idempotent() {
        let registry = registry();
        registry.record_request("GET", "/", 200, 0.123);
        registry.record_request("DELETE", "/x", 404, 0.001);
        assert_eq!(registry.render(), registry.render());
    }

    #[test]
    fn test_label_values_escaped() {
        let registry = registry();
        registry.record_request("GET", "/a\"b\\c\n", 200, 0.0);
        let output = registry.render();
        assert!(output.contains(r#"path="/a\"b\\c\n",status="200""#));
    }

    #[test]
    fn test_empty_labels_accepted() {
        let registry = registry();
        registry.record_request("", "", 0, 0.0);
        assert_eq!(registry.counter("", "", 0), 1);
        assert!(registry
            .render()
            .contains("http_requests_total{method=\"\",path=\"\",status=\"0\"} 1\n"));
    }

    #[test]
    fn test_request_timer() {
        let registry = registry();
        let timer = registry.start_request_timer("GET");
        std::thread::sleep(Duration::from_millis(5));
        let elapsed = timer.finish("/", 200);

        assert!(elapsed >= Duration::from_millis(5));
        assert_eq!(registry.counter("GET", "/", 200), 1);
        let stats = registry.duration("GET", "/").unwrap();
        assert!(stats.sum >= 0.005);
    }

    #[test]
    fn test_dropped_timer_records_nothing() {
        let registry = registry();
        let timer = registry.start_request_timer("GET");
        drop(timer);
        assert_eq!(registry.counter("GET", "/", 200), 0);
    }

    #[test]
    fn test_concurrent_increments() {
        let registry = registry();
        let threads: Vec<_> = (0..8)
            .map(|_| {
                let registry = registry.clone();
                std::thread::spawn(move || {
                    for _ in 0..1000 {
                        registry.record_request("GET", "/", 200, 0.001);
                    }
                })
            })
            .collect();
        for t in threads {
            t.join().unwrap();
        }

        assert_eq!(registry.counter("GET", "/", 200), 8000);
        assert_eq!(registry.duration("GET", "/").unwrap().count, 8000);
    }
}
