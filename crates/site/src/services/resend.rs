//! Resend API client for booking notifications.
//!
//! Thin wrapper over the Resend REST API: a single `POST /emails` per
//! accepted booking, with the recipient list passed in one call rather
//! than one call per recipient.

use async_trait::async_trait;
use mkm_core::Email;
use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

use crate::config::ResendConfig;
use crate::services::mailer::{MailError, Mailer, OutboundEmail, SendReceipt};

/// Resend API base URL.
const BASE_URL: &str = "https://api.resend.com";

/// Errors that can occur when interacting with the Resend API.
#[derive(Debug, Error)]
pub enum ResendError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status}")]
    Api {
        status: u16,
        details: serde_json::Value,
    },

    /// Failed to build the client or parse a response.
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Resend API client.
#[derive(Clone)]
pub struct ResendClient {
    client: reqwest::Client,
    from: Email,
}

/// Successful send response body.
#[derive(Debug, Deserialize)]
struct SendResponse {
    id: Option<String>,
}

impl ResendClient {
    /// Create a new Resend API client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &ResendConfig) -> Result<Self, ResendError> {
        let mut headers = HeaderMap::new();

        let auth_value = format!("Bearer {}", config.api_key.expose_secret());
        headers.insert(
            "Authorization",
            HeaderValue::from_str(&auth_value)
                .map_err(|e| ResendError::Parse(format!("Invalid API key format: {e}")))?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            from: config.from.clone(),
        })
    }

    /// The configured sender address.
    #[must_use]
    pub const fn from_address(&self) -> &Email {
        &self.from
    }

    /// Send one email through the API.
    ///
    /// # Errors
    ///
    /// Returns [`ResendError::Api`] when the provider answers with a
    /// non-success status (the error body is passed through for
    /// diagnostics), [`ResendError::Http`]/[`ResendError::Parse`] when the
    /// call or response handling fails.
    pub async fn send_email(&self, email: &OutboundEmail) -> Result<SendReceipt, ResendError> {
        let url = format!("{BASE_URL}/emails");

        let to: Vec<&str> = email.to.iter().map(Email::as_str).collect();
        let mut body = json!({
            "from": email.from,
            "to": to,
            "subject": email.subject,
            "text": email.text,
            "headers": { "List-Unsubscribe": email.list_unsubscribe },
        });
        if let (Some(reply_to), Some(map)) = (&email.reply_to, body.as_object_mut()) {
            map.insert("reply_to".to_owned(), json!(reply_to.as_str()));
        }

        let response = self.client.post(&url).json(&body).send().await?;
        let status = response.status();

        if !status.is_success() {
            let details = response
                .json::<serde_json::Value>()
                .await
                .unwrap_or_else(|_| json!({"message": "unreadable error body"}));
            return Err(ResendError::Api {
                status: status.as_u16(),
                details,
            });
        }

        let parsed: SendResponse = response
            .json()
            .await
            .map_err(|e| ResendError::Parse(e.to_string()))?;

        Ok(SendReceipt { id: parsed.id })
    }
}

#[async_trait]
impl Mailer for ResendClient {
    async fn send(&self, email: &OutboundEmail) -> Result<SendReceipt, MailError> {
        self.send_email(email).await.map_err(|err| match err {
            ResendError::Api { details, .. } => MailError::Provider(details),
            ResendError::Http(e) => MailError::Transport(e.to_string()),
            ResendError::Parse(message) => MailError::Transport(message),
        })
    }
}
