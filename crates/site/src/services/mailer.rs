//! The mail transport seam.
//!
//! The handler composes one [`OutboundEmail`] per accepted request and
//! hands it to a [`Mailer`]. Production wires in the Resend client;
//! integration tests substitute a recording transport. Nothing retries or
//! queues - a failed send is surfaced to the caller immediately.

use async_trait::async_trait;
use mkm_core::{BookingRequest, Email};

/// A composed booking notification, constructed fresh per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundEmail {
    /// Display form, e.g. `MKM Website <no-reply@mkmentertainmentllc.com>`.
    pub from: String,
    /// One send, one or more recipients.
    pub to: Vec<Email>,
    pub subject: String,
    /// Plaintext body; newlines from the submitter's message preserved.
    pub text: String,
    /// The submitter's address, so a reply lands with them.
    pub reply_to: Option<Email>,
    /// `List-Unsubscribe` header value, e.g. `<mailto:no-reply@...>`.
    pub list_unsubscribe: String,
}

/// Provider acknowledgement for a completed send.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SendReceipt {
    /// Provider message identifier, when the provider returned one.
    pub id: Option<String>,
}

/// Errors from a mail transport.
///
/// The split drives the caller-facing status: a provider that answered
/// with an error object is a gateway failure (502), a transport that never
/// completed is an internal failure (500).
#[derive(Debug, Clone, thiserror::Error)]
pub enum MailError {
    /// The provider completed the call but reported an error object.
    #[error("provider rejected the send")]
    Provider(serde_json::Value),

    /// The call itself failed (connect, timeout, unintelligible response).
    #[error("mail transport failed: {0}")]
    Transport(String),
}

/// A mail transport. One send per accepted request, no retries.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Dispatch a single composed message.
    ///
    /// # Errors
    ///
    /// Returns [`MailError::Provider`] when the provider reports an
    /// application-level error, [`MailError::Transport`] when the call
    /// never completes.
    async fn send(&self, email: &OutboundEmail) -> Result<SendReceipt, MailError>;
}

/// Compose the fixed-order plaintext body for a booking notification.
///
/// Optional fields render as placeholders rather than vanishing, so the
/// inbox always sees the same block shape. The message is included
/// verbatim (carriage returns were already stripped at normalization).
#[must_use]
pub fn booking_text_body(request: &BookingRequest) -> String {
    let or = |s: &str, fallback: &str| -> String {
        if s.is_empty() {
            fallback.to_owned()
        } else {
            s.to_owned()
        }
    };

    let add_ons = if request.add_ons.is_empty() {
        "None".to_owned()
    } else {
        request.add_ons.join(", ")
    };

    format!(
        "Booking Type: {}\n\
         Selected Service: {}\n\
         Add-Ons: {}\n\
         Event Date: {}\n\
         \n\
         From: {}\n\
         Email: {}\n\
         Phone: {}\n\
         \n\
         Message:\n\
         {}",
        or(&request.booking_type_raw, "N/A"),
        or(&request.service, "N/A"),
        add_ons,
        or(&request.date, "Not specified"),
        or(&request.name, "(no name)"),
        or(&request.email, "(no email)"),
        or(&request.phone, "(no phone)"),
        or(&request.message, "(no message)"),
    )
}
