//! Request interception: timing, dispatch and metrics recording.
//!
//! Every request is recorded exactly once, after its status is final. Error
//! responses are recorded like any other. A request whose future is dropped
//! before a response exists is not recorded.

use crate::config::PathLabel;
use crate::http::handlers::{self, HttpResponse};
use crate::http::router::{Endpoint, RouteMatch, UNMATCHED_ROUTE};
use crate::state::AppState;
use crate::util::{RequestId, REQUEST_ID_HEADER};
use hyper::{Method, Request};
use std::convert::Infallible;
use tracing::{info, info_span, Instrument};

/// Handle one request end to end.
pub async fn handle<B>(req: Request<B>, state: AppState) -> Result<HttpResponse, Infallible> {
    let request_id = RequestId::from_headers(req.headers());
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let span = info_span!(
        "http_request",
        request_id = %request_id,
        method = %method,
        path = %path,
    );

    async move {
        let timer = state.metrics().start_request_timer(method.as_str());
        let route = state.router().find(&path);

        let mut response = dispatch(&method, route.as_ref(), &state).await;
        if let Some(value) = request_id.header_value() {
            response.headers_mut().insert(REQUEST_ID_HEADER, value);
        }

        let status = response.status().as_u16();
        let is_metrics = matches!(&route, Some(m) if m.endpoint == Endpoint::Metrics);

        let duration = if is_metrics && !state.config().metrics.record_self {
            timer.elapsed()
        } else {
            let label = path_label(state.config().metrics.path_label, &path, route.as_ref());
            timer.finish(label, status)
        };

        info!(
            status,
            duration_ms = duration.as_secs_f64() * 1000.0,
            "request completed"
        );

        Ok(response)
    }
    .instrument(span)
    .await
}

async fn dispatch(
    method: &Method,
    route: Option<&RouteMatch<'_>>,
    state: &AppState,
) -> HttpResponse {
    let Some(route) = route else {
        return handlers::not_found();
    };

    if method != Method::GET {
        return handlers::method_not_allowed();
    }

    match route.endpoint {
        Endpoint::Home => handlers::home(state),
        Endpoint::Data => handlers::data(state).await,
        Endpoint::Error => handlers::error(),
        Endpoint::Item => handlers::item(route),
        Endpoint::Health => handlers::health(state),
        Endpoint::Metrics => handlers::metrics(state),
    }
}

/// Value of the `path` label for a request.
fn path_label<'a>(mode: PathLabel, path: &'a str, route: Option<&RouteMatch<'a>>) -> &'a str {
    match mode {
        PathLabel::Raw => path,
        PathLabel::Route => route.map(|m| m.template).unwrap_or(UNMATCHED_ROUTE),
    }
}
