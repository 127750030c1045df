//! Booking submission route handlers.
//!
//! The pipeline runs in strict order per request: shape gate, field
//! normalization, validation (honeypot first), rate limit, routing,
//! composition, dispatch, result mapping. A request that fails validation
//! or the rate limit produces zero outbound sends.

use std::convert::Infallible;
use std::net::SocketAddr;

use axum::extract::rejection::JsonRejection;
use axum::extract::{ConnectInfo, FromRequestParts, State};
use axum::http::request::Parts;
use axum::http::{HeaderMap, StatusCode};
use axum::{Json, response::IntoResponse};
use mkm_core::{BookingSubmission, Email};
use serde::Serialize;
use serde_json::json;
use tracing::instrument;

use crate::VERSION;
use crate::error::AppError;
use crate::services::mailer::{OutboundEmail, booking_text_body};
use crate::state::AppState;
use crate::throttle::caller_key;

/// Success response for an accepted, dispatched submission.
#[derive(Debug, Serialize)]
pub struct SendOk {
    pub ok: bool,
    pub version: &'static str,
    pub to: Vec<Email>,
    pub id: Option<String>,
}

/// Peer socket address, when the server was built with connect info.
///
/// Infallible: absent connect info (e.g. a router driven directly in
/// tests) yields `None`, and the rate limiter falls back to its shared
/// bucket.
pub struct Peer(pub Option<SocketAddr>);

impl<S> FromRequestParts<S> for Peer
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(
            parts
                .extensions
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| *addr),
        ))
    }
}

/// Liveness/version probe.
///
/// GET /api/send-email
pub async fn probe() -> impl IntoResponse {
    Json(json!({"ok": true, "route": "/api/send-email", "version": VERSION}))
}

/// CORS pre-flight.
///
/// OPTIONS /api/send-email (the CORS layer answers real pre-flights; this
/// keeps a bare OPTIONS from falling through to the 405 handler)
pub async fn preflight() -> StatusCode {
    StatusCode::NO_CONTENT
}

/// Any method other than GET/POST/OPTIONS.
pub async fn method_not_allowed() -> impl IntoResponse {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(json!({"error": "Method not allowed"})),
    )
}

/// Submit a booking request.
///
/// POST /api/send-email
///
/// Validates the payload with the same rule set the form applies, throttles
/// per caller address, routes recipients from the booking type, and
/// dispatches one email through the provider. No retries, no queue: a
/// provider failure is surfaced immediately and the caller may resubmit
/// (subject to the rate limit).
#[instrument(skip_all, fields(caller))]
pub async fn submit(
    State(state): State<AppState>,
    Peer(peer): Peer,
    headers: HeaderMap,
    payload: Result<Json<BookingSubmission>, JsonRejection>,
) -> Result<Json<SendOk>, AppError> {
    // Shape gate: an unparseable body degrades to the generic server error
    // rather than an axum rejection, matching the error contract.
    let Json(submission) = payload.map_err(|e| AppError::Internal(e.body_text()))?;

    let request = submission.normalize();

    // Honeypot first: a tripped honeypot stops here, before the rate
    // limiter and the provider ever see the request.
    let errors = request.validate();
    if !errors.is_empty() {
        if request.is_spam() {
            tracing::warn!("Honeypot tripped, rejecting as spam");
            return Err(AppError::Spam(errors));
        }
        return Err(AppError::Validation(errors));
    }

    // Rate limit: atomic check-and-record per caller key. Denied checks
    // record nothing, so hammering does not extend the window.
    let caller = caller_key(&headers, peer);
    tracing::Span::current().record("caller", caller.as_str());
    if !state.throttle().check(&caller) {
        tracing::warn!("Submission inside cooldown window, throttled");
        return Err(AppError::RateLimited);
    }

    // Validation guarantees a parseable address; a failure here is a bug,
    // not a caller error.
    let reply_to = Email::parse(&request.email)
        .map_err(|e| AppError::Internal(format!("validated email failed to parse: {e}")))?;

    let recipients = state.config().routing.recipients(request.route());
    tracing::info!(
        booking_type = %request.booking_type_raw,
        service = %request.service,
        recipients = ?recipients,
        from = %reply_to.masked(),
        "Routing booking request"
    );

    let from = state.config().resend.from.clone();
    let outbound = OutboundEmail {
        from: format!("MKM Website <{from}>"),
        to: recipients.clone(),
        subject: request.subject_or_default(),
        text: booking_text_body(&request),
        reply_to: Some(reply_to),
        list_unsubscribe: format!("<mailto:{from}>"),
    };

    let receipt = state.mailer().send(&outbound).await?;

    Ok(Json(SendOk {
        ok: true,
        version: VERSION,
        to: recipients,
        id: receipt.id,
    }))
}
