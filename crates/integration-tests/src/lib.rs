//! Integration tests for the MKM booking intake pipeline.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p mkm-integration-tests
//! ```
//!
//! No external services are required: the router is assembled with a
//! recording mail transport, so every test observes exactly which emails
//! the pipeline would have dispatched.
//!
//! # Test Categories
//!
//! - `booking_intake` - The endpoint contract, driven through the router
//! - `client_flow` - The client library against a live local server

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use mkm_core::Email;
use mkm_site::config::{ResendConfig, RoutingConfig, SiteConfig};
use mkm_site::services::mailer::{MailError, Mailer, OutboundEmail, SendReceipt};
use mkm_site::state::AppState;
use secrecy::SecretString;

/// MKM inbox used throughout the tests.
pub const MKM_INBOX: &str = "michaelkylemusic@icloud.com";

/// Pizza Records inbox used throughout the tests.
pub const PIZZA_INBOX: &str = "pizzarecords@aol.com";

/// A mail transport that records instead of sending.
///
/// Optionally scripted to fail, for the provider/transport error paths.
pub struct RecordingMailer {
    sent: Mutex<Vec<OutboundEmail>>,
    fail_with: Mutex<Option<MailError>>,
}

impl RecordingMailer {
    /// A transport that accepts every send.
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            sent: Mutex::new(Vec::new()),
            fail_with: Mutex::new(None),
        })
    }

    /// A transport that fails every send with the given error.
    #[must_use]
    pub fn failing_with(error: MailError) -> Arc<Self> {
        Arc::new(Self {
            sent: Mutex::new(Vec::new()),
            fail_with: Mutex::new(Some(error)),
        })
    }

    /// Snapshot of everything dispatched so far.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn sent(&self) -> Vec<OutboundEmail> {
        self.sent.lock().expect("recording lock poisoned").clone()
    }

    /// Number of dispatched emails.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn sent_count(&self) -> usize {
        self.sent.lock().expect("recording lock poisoned").len()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: &OutboundEmail) -> Result<SendReceipt, MailError> {
        if let Some(error) = self
            .fail_with
            .lock()
            .expect("failure lock poisoned")
            .clone()
        {
            return Err(error);
        }

        self.sent
            .lock()
            .expect("recording lock poisoned")
            .push(email.clone());
        Ok(SendReceipt {
            id: Some("test-message-id".to_owned()),
        })
    }
}

/// Configuration matching the production defaults, without touching the
/// environment.
///
/// # Panics
///
/// Panics if the built-in addresses fail to parse (they don't).
#[must_use]
pub fn test_config() -> SiteConfig {
    SiteConfig {
        host: "127.0.0.1".parse().expect("loopback parses"),
        port: 0,
        resend: ResendConfig {
            api_key: SecretString::from("re_aB3xY9mK2nL5pQ7rT0uW4zC6"),
            from: Email::parse("no-reply@mkmentertainmentllc.com").expect("from address parses"),
        },
        routing: RoutingConfig {
            mkm_inbox: Email::parse(MKM_INBOX).expect("mkm inbox parses"),
            pizza_inbox: Email::parse(PIZZA_INBOX).expect("pizza inbox parses"),
        },
        cooldown_secs: 60,
        sentry_dsn: None,
    }
}

/// Assemble the full router around a recording transport.
#[must_use]
pub fn test_app(mailer: Arc<RecordingMailer>) -> Router {
    mkm_site::app(AppState::with_mailer(test_config(), mailer))
}

/// A complete, valid submission payload the tests mutate per case.
#[must_use]
pub fn valid_payload() -> serde_json::Value {
    serde_json::json!({
        "name": "Jo Lee",
        "email": "jo@example.com",
        "message": "We'd like a DJ set for our anniversary party please",
        "bookingType": "Pizza Records",
        "service": "Pizza Records – Basic"
    })
}
