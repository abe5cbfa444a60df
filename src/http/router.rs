//! Route table and path matching.
//!
//! Patterns are `/`-separated; a segment starting with `:` captures any
//! non-empty segment. The metrics endpoint path is configurable and matched
//! literally ahead of the static table.

/// Handler a request resolves to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Endpoint {
    Home,
    Data,
    Error,
    Item,
    Health,
    Metrics,
}

struct Route {
    pattern: &'static str,
    endpoint: Endpoint,
}

const ROUTES: &[Route] = &[
    Route {
        pattern: "/",
        endpoint: Endpoint::Home,
    },
    Route {
        pattern: "/api/data",
        endpoint: Endpoint::Data,
    },
    Route {
        pattern: "/api/error",
        endpoint: Endpoint::Error,
    },
    Route {
        pattern: "/api/items/:id",
        endpoint: Endpoint::Item,
    },
    Route {
        pattern: "/health",
        endpoint: Endpoint::Health,
    },
];

/// Label used for the route template of requests that match nothing.
pub const UNMATCHED_ROUTE: &str = "unmatched";

/// A resolved route.
#[derive(Debug, PartialEq, Eq)]
pub struct RouteMatch<'a> {
    pub endpoint: Endpoint,
    /// Pattern the path matched, e.g. `/api/items/:id`.
    pub template: &'a str,
    params: Vec<(&'a str, &'a str)>,
}

impl<'a> RouteMatch<'a> {
    /// Captured value of a `:name` segment.
    pub fn param(&self, name: &str) -> Option<&'a str> {
        self.params
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| *value)
    }
}

/// Resolves request paths to endpoints.
#[derive(Debug, Clone)]
pub struct Router {
    metrics_path: String,
}

impl Router {
    /// Create a router serving metrics at `metrics_path`.
    pub fn new(metrics_path: impl Into<String>) -> Self {
        Self {
            metrics_path: metrics_path.into(),
        }
    }

    /// Path of the metrics endpoint.
    pub fn metrics_path(&self) -> &str {
        &self.metrics_path
    }

    /// Find the route for `path`.
    pub fn find<'a>(&'a self, path: &'a str) -> Option<RouteMatch<'a>> {
        if path == self.metrics_path {
            return Some(RouteMatch {
                endpoint: Endpoint::Metrics,
                template: &self.metrics_path,
                params: Vec::new(),
            });
        }

        find_static(path)
    }
}

fn find_static(path: &str) -> Option<RouteMatch<'_>> {
    ROUTES.iter().find_map(|route| {
        match_pattern(route.pattern, path).map(|params| RouteMatch {
            endpoint: route.endpoint,
            template: route.pattern,
            params,
        })
    })
}

/// Whether `path` is served by one of the built-in routes.
pub fn is_reserved_path(path: &str) -> bool {
    find_static(path).is_some()
}

fn match_pattern<'a>(pattern: &'a str, path: &'a str) -> Option<Vec<(&'a str, &'a str)>> {
    let mut pattern_segments = pattern.split('/');
    let mut path_segments = path.split('/');
    let mut params = Vec::new();

    loop {
        match (pattern_segments.next(), path_segments.next()) {
            (None, None) => return Some(params),
            (Some(expected), Some(actual)) => {
                if let Some(name) = expected.strip_prefix(':') {
                    if actual.is_empty() {
                        return None;
                    }
                    params.push((name, actual));
                } else if expected != actual {
                    return None;
                }
            }
            _ => return None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_routes() {
        let router = Router::new("/metrics");
        assert_eq!(router.find("/").unwrap().endpoint, Endpoint::Home);
        assert_eq!(router.find("/api/data").unwrap().endpoint, Endpoint::Data);
        assert_eq!(router.find("/api/error").unwrap().endpoint, Endpoint::Error);
        assert_eq!(router.find("/health").unwrap().endpoint, Endpoint::Health);
        assert_eq!(router.find("/metrics").unwrap().endpoint, Endpoint::Metrics);
    }

    #[test]
    fn test_param_capture() {
        let router = Router::new("/metrics");
        let m = router.find("/api/items/42").unwrap();
        assert_eq!(m.endpoint, Endpoint::Item);
        assert_eq!(m.template, "/api/items/:id");
        assert_eq!(m.param("id"), Some("42"));
        assert_eq!(m.param("other"), None);
    }

    #[test]
    fn test_empty_param_does_not_match() {
        let router = Router::new("/metrics");
        assert!(router.find("/api/items/").is_none());
    }

    #[test]
    fn test_unknown_paths() {
        let router = Router::new("/metrics");
        assert!(router.find("/nope").is_none());
        assert!(router.find("/api/data/").is_none());
        assert!(router.find("/api/items/1/extra").is_none());
        assert!(router.find("").is_none());
    }

    #[test]
    fn test_custom_metrics_path() {
        let router = Router::new("/internal/metrics");
        assert_eq!(router.metrics_path(), "/internal/metrics");
        assert!(router.find("/metrics").is_none());
        let m = router.find("/internal/metrics").unwrap();
        assert_eq!(m.endpoint, Endpoint::Metrics);
        assert_eq!(m.template, "/internal/metrics");
    }

    #[test]
    fn test_reserved_paths() {
        assert!(is_reserved_path("/health"));
        assert!(is_reserved_path("/api/items/7"));
        assert!(!is_reserved_path("/metrics"));
    }
}
