//! MKM booking-intake service library.
//!
//! This crate provides the intake pipeline as a library, allowing the
//! router to be assembled in integration tests with a substitute mail
//! transport.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod routes;
pub mod services;
pub mod state;
pub mod throttle;

use axum::Router;
use axum::http::{HeaderValue, Method, header};
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Version string echoed by the liveness probe and the success response.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Assemble the application router.
///
/// Layers (outermost last): request tracing, a no-store cache directive on
/// every response, and allow-all CORS so the form can be hosted anywhere.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    Router::new()
        .route("/health", axum::routing::get(health))
        .merge(routes::routes())
        .with_state(state)
        .layer(cors)
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store, max-age=0"),
        ))
        .layer(TraceLayer::new_for_http())
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}
