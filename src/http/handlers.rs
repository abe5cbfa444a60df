//! Route handlers.

use crate::http::router::RouteMatch;
use crate::metrics::CONTENT_TYPE as METRICS_CONTENT_TYPE;
use crate::state::AppState;
use bytes::Bytes;
use http_body_util::Full;
use hyper::header::{HeaderValue, CONTENT_TYPE};
use hyper::{Response, StatusCode};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{error, info, info_span, Instrument};

/// Response type produced by every handler.
pub type HttpResponse = Response<Full<Bytes>>;

pub fn home(state: &AppState) -> HttpResponse {
    info!(endpoint = "/", "home accessed");
    json_response(
        StatusCode::OK,
        &json!({
            "message": format!("Hello from {}!", state.config().global.service_name),
            "status": "healthy",
        }),
    )
}

/// Simulates a unit of work with a random delay inside a `process_data` span.
pub async fn data(state: &AppState) -> HttpResponse {
    let demo = &state.config().demo;
    let delay = random_delay(demo.data_delay_min, demo.data_delay_max);
    let delay_seconds = delay.as_secs_f64();

    let span = info_span!("process_data", delay_seconds);
    async {
        tokio::time::sleep(delay).await;
        info!(endpoint = "/api/data", delay_seconds, "data processed");
    }
    .instrument(span)
    .await;

    json_response(
        StatusCode::OK,
        &json!({
            "data": [1, 2, 3, 4, 5],
            "processed_in": (delay_seconds * 1000.0).round() / 1000.0,
        }),
    )
}

pub fn error() -> HttpResponse {
    error!(endpoint = "/api/error", "error triggered intentionally");
    json_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        &json!({ "error": "Something went wrong!" }),
    )
}

pub fn item(route: &RouteMatch<'_>) -> HttpResponse {
    let raw = route.param("id").unwrap_or_default();
    match raw.parse::<u64>() {
        Ok(id) => json_response(
            StatusCode::OK,
            &json!({ "id": id, "name": format!("item-{}", id) }),
        ),
        Err(_) => json_response(
            StatusCode::BAD_REQUEST,
            &json!({ "error": format!("invalid item id '{}'", raw) }),
        ),
    }
}

pub fn health(state: &AppState) -> HttpResponse {
    json_response(
        StatusCode::OK,
        &json!({
            "status": "healthy",
            "service": state.config().global.service_name,
        }),
    )
}

/// Serves the registry in the text exposition format. Always 200.
pub fn metrics(state: &AppState) -> HttpResponse {
    let body = state.metrics().render();
    let mut response = Response::new(Full::new(Bytes::from(body)));
    response.headers_mut().insert(
        CONTENT_TYPE,
        HeaderValue::from_static(METRICS_CONTENT_TYPE),
    );
    response
}

pub fn method_not_allowed() -> HttpResponse {
    json_response(
        StatusCode::METHOD_NOT_ALLOWED,
        &json!({ "error": "Method Not Allowed" }),
    )
}

pub fn not_found() -> HttpResponse {
    json_response(StatusCode::NOT_FOUND, &json!({ "error": "Not Found" }))
}

/// Build a JSON response without going through the fallible builder.
pub fn json_response(status: StatusCode, body: &Value) -> HttpResponse {
    let mut response = Response::new(Full::new(Bytes::from(body.to_string())));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    response
}

/// Uniform random duration in `[min, max]`.
fn random_delay(min: Duration, max: Duration) -> Duration {
    if max <= min {
        return min;
    }
    min + (max - min).mul_f64(fastrand::f64())
}
