//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET     /api/send-email - Liveness/version probe
//! POST    /api/send-email - Booking submission
//! OPTIONS /api/send-email - CORS pre-flight
//! (other) /api/send-email - 405 with a JSON error body
//!
//! GET     /health         - Health check (in lib.rs)
//! ```

pub mod booking;

use axum::Router;
use axum::routing::get;

use crate::state::AppState;

/// Create the intake routes.
pub fn routes() -> Router<AppState> {
    Router::new().route(
        "/api/send-email",
        get(booking::probe)
            .post(booking::submit)
            .options(booking::preflight)
            .fallback(booking::method_not_allowed),
    )
}
