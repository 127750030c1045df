//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that maps every failure in the intake
//! pipeline to the caller-facing JSON shapes, capturing server-side
//! failures to Sentry before responding.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use mkm_core::ErrorMap;
use serde_json::json;
use thiserror::Error;

use crate::services::mailer::MailError;

/// Application-level error type for the intake pipeline.
#[derive(Debug, Error)]
pub enum AppError {
    /// Honeypot tripped. Deliberately carries no field detail beyond the
    /// generic spam marker.
    #[error("Spam detected")]
    Spam(ErrorMap),

    /// One or more fields failed the shared rule set.
    #[error("Validation failed")]
    Validation(ErrorMap),

    /// Caller is inside the submission cooldown window.
    #[error("Rate limited")]
    RateLimited,

    /// The provider accepted the request but reported an error object.
    #[error("Email send failed")]
    Provider(serde_json::Value),

    /// Transport failure, parse failure, or any other unexpected error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<MailError> for AppError {
    fn from(err: MailError) -> Self {
        match err {
            MailError::Provider(details) => Self::Provider(details),
            MailError::Transport(message) => Self::Internal(message),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if matches!(self, Self::Internal(_) | Self::Provider(_)) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let (status, body) = match self {
            Self::Spam(details) => (
                StatusCode::BAD_REQUEST,
                json!({"ok": false, "error": "Invalid submission", "details": details}),
            ),
            Self::Validation(details) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                json!({"ok": false, "error": "Invalid submission", "details": details}),
            ),
            Self::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                json!({"ok": false, "error": "Too many requests. Try again shortly."}),
            ),
            Self::Provider(details) => (
                StatusCode::BAD_GATEWAY,
                json!({"ok": false, "error": "Email send failed", "details": details}),
            ),
            Self::Internal(message) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({"ok": false, "error": "Server error", "details": message}),
            ),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
