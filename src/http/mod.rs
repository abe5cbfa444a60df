//! HTTP service: routes, request interception and the metrics endpoint.

pub mod handlers;
mod middleware;
mod router;
mod server;

pub use middleware::handle;
pub use router::{is_reserved_path, Endpoint, RouteMatch, Router, UNMATCHED_ROUTE};
pub use server::{HttpServer, ServerError};
