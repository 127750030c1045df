//! Booking submission client.
//!
//! Drives one submission cycle: validate, throttle, POST, interpret. A
//! second submit while one is outstanding is refused without I/O, and
//! nothing retries - the user decides whether to resubmit.

use std::sync::atomic::{AtomicBool, Ordering};

use mkm_core::ErrorMap;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::form::BookingForm;
use crate::throttle::LastSubmitStore;

/// Fallback message when the transport fails or the server's error body is
/// unreadable.
const GENERIC_FAILURE: &str = "Something went wrong sending your request.";

/// A submission the server accepted and dispatched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Confirmation {
    /// Recipient addresses the server routed to.
    #[serde(default)]
    pub to: Vec<String>,
    /// Provider message identifier, when one came back.
    #[serde(default)]
    pub id: Option<String>,
}

/// Why a submission cycle did not produce a confirmation.
#[derive(Debug, Error)]
pub enum SubmitError {
    /// Another submission is still outstanding; this one was a no-op.
    #[error("a submission is already in flight")]
    AlreadyInFlight,

    /// The local throttle window has not elapsed.
    #[error("Please wait a moment before sending again.")]
    Throttled,

    /// The honeypot field was filled in.
    #[error("Submission blocked by spam filter.")]
    Spam,

    /// One or more fields failed local validation.
    #[error("Fix the highlighted fields.")]
    Invalid(ErrorMap),

    /// The server rejected the submission, or the request never completed.
    /// Carries the server's message verbatim when one was returned.
    #[error("{0}")]
    Rejected(String),
}

/// Error body shape returned by the intake endpoint.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

/// Client for the booking intake endpoint.
pub struct BookingClient {
    http: reqwest::Client,
    endpoint: Url,
    throttle: LastSubmitStore,
    in_flight: AtomicBool,
}

impl BookingClient {
    /// Create a client for the given endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client fails to build.
    pub fn new(endpoint: Url, throttle: LastSubmitStore) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().build()?;
        Ok(Self {
            http,
            endpoint,
            throttle,
            in_flight: AtomicBool::new(false),
        })
    }

    /// Run one submission cycle.
    ///
    /// Validates locally (honeypot first), checks the resubmission
    /// throttle, serializes the payload, and interprets the response. On
    /// success the throttle timestamp is recorded; any non-2xx surfaces
    /// the server's error message or a generic fallback.
    ///
    /// # Errors
    ///
    /// See [`SubmitError`] for each way a cycle ends without a
    /// confirmation.
    pub async fn submit(&self, form: &BookingForm) -> Result<Confirmation, SubmitError> {
        let _guard = InFlightToken::acquire(&self.in_flight).ok_or(SubmitError::AlreadyInFlight)?;

        let errors = form.validate();
        if !errors.is_empty() {
            if errors.contains_key("honeypot") {
                return Err(SubmitError::Spam);
            }
            return Err(SubmitError::Invalid(errors));
        }

        if !self.throttle.can_submit_now() {
            return Err(SubmitError::Throttled);
        }

        let payload = form.to_submission();
        let response = self
            .http
            .post(self.endpoint.clone())
            .json(&payload)
            .send()
            .await
            .map_err(|err| {
                tracing::warn!(error = %err, "Booking submission transport failure");
                SubmitError::Rejected(GENERIC_FAILURE.to_owned())
            })?;

        let status = response.status();
        if status.is_success() {
            // An unreadable success body is still a success; the server
            // already accepted and dispatched.
            let confirmation = response.json::<Confirmation>().await.unwrap_or_default();
            self.throttle.record_submission();
            return Ok(confirmation);
        }

        let message = response
            .json::<ErrorBody>()
            .await
            .ok()
            .and_then(|body| body.error)
            .unwrap_or_else(|| format!("Request failed ({})", status.as_u16()));
        Err(SubmitError::Rejected(message))
    }
}

/// Single in-flight submission guard.
///
/// Releases on drop, so every exit path of a cycle clears the flag.
struct InFlightToken<'a>(&'a AtomicBool);

impl<'a> InFlightToken<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
            .then_some(Self(flag))
    }
}

impl Drop for InFlightToken<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
