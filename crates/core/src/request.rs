//! The booking submission payload and its normalized form.
//!
//! [`BookingSubmission`] is the loose wire shape: every field optional,
//! defaults applied once at the boundary rather than scattered through the
//! handler. [`BookingRequest`] is the normalized result both the client
//! form and the server handler validate.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::booking::{BookingType, Route, default_subject};
use crate::email::Email;
use crate::rules::{
    ADD_ONS_MAX, MESSAGE_MAX_CHARS, MESSAGE_MAX_LINKS, MESSAGE_MIN_CHARS, NAME_MIN_CHARS,
    collapse_whitespace, count_links, is_date_shaped, normalize_message,
};

/// Field name to human-readable message, as returned in 422 responses and
/// rendered next to the form fields.
pub type ErrorMap = BTreeMap<String, String>;

/// Subject used when the caller provides none and the booking type is
/// unusable for synthesis.
const FALLBACK_SUBJECT: &str = "MKM Booking Request";

/// The JSON payload posted to `/api/send-email`.
///
/// Partially-specified payloads are accepted; absent fields default to
/// empty and are resolved by [`Self::normalize`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BookingSubmission {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub service: String,
    pub selected_service: String,
    pub date: String,
    pub message: String,
    pub booking_type: String,
    pub add_ons: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    /// Honeypot. Hidden on the real form; any content marks the
    /// submission as spam.
    pub company: String,
}

impl BookingSubmission {
    /// Normalize the wire payload: trim and collapse whitespace, strip
    /// carriage returns from the message, resolve the effective service
    /// package. Applied identically on both sides of the wire.
    #[must_use]
    pub fn normalize(&self) -> BookingRequest {
        let booking_type_raw = collapse_whitespace(&self.booking_type);
        let booking_type = BookingType::parse(&booking_type_raw);

        let selected = collapse_whitespace(&self.selected_service);
        let named = collapse_whitespace(&self.service);
        let service = if selected.is_empty() {
            if named.is_empty() {
                booking_type.map_or_else(String::new, |t| t.default_service().to_owned())
            } else {
                named
            }
        } else {
            selected
        };

        BookingRequest {
            name: collapse_whitespace(&self.name),
            email: collapse_whitespace(&self.email),
            phone: collapse_whitespace(&self.phone),
            service,
            date: collapse_whitespace(&self.date),
            message: normalize_message(&self.message),
            booking_type,
            booking_type_raw,
            add_ons: self
                .add_ons
                .iter()
                .map(|a| collapse_whitespace(a))
                .filter(|a| !a.is_empty())
                .collect(),
            subject: self
                .subject
                .as_deref()
                .map(collapse_whitespace)
                .filter(|s| !s.is_empty()),
            honeypot: self.company.trim().to_owned(),
        }
    }
}

/// A normalized booking request, ready for validation and dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    /// Effective service package (selected, named, or the booking type's
    /// default).
    pub service: String,
    pub date: String,
    pub message: String,
    pub booking_type: Option<BookingType>,
    /// The collapsed wire string, kept for routing and the email body.
    pub booking_type_raw: String,
    pub add_ons: Vec<String>,
    pub subject: Option<String>,
    pub honeypot: String,
}

impl BookingRequest {
    /// Apply the shared rule set and return field-keyed errors; empty means
    /// the request is acceptable.
    ///
    /// A tripped honeypot produces only the single spam error and
    /// suppresses all field detail, so automated submitters learn nothing
    /// about the rules.
    #[must_use]
    pub fn validate(&self) -> ErrorMap {
        let mut errors = ErrorMap::new();

        if !self.honeypot.is_empty() {
            errors.insert("honeypot".to_owned(), "Spam detected.".to_owned());
            return errors;
        }

        if self.name.chars().count() < NAME_MIN_CHARS {
            errors.insert(
                "name".to_owned(),
                "Enter your full name (≥2 characters).".to_owned(),
            );
        }

        if Email::parse(&self.email).is_err() {
            errors.insert("email".to_owned(), "Enter a valid email.".to_owned());
        }

        let collapsed = collapse_whitespace(&self.message);
        if collapsed.chars().count() < MESSAGE_MIN_CHARS {
            errors.insert(
                "message".to_owned(),
                "Please provide more detail (≥20 characters).".to_owned(),
            );
        } else if self.message.chars().count() > MESSAGE_MAX_CHARS {
            errors.insert(
                "message".to_owned(),
                "Message is too long (max 5000 characters).".to_owned(),
            );
        } else if count_links(&self.message) > MESSAGE_MAX_LINKS {
            errors.insert("message".to_owned(), "Too many links (max 5).".to_owned());
        }

        if self.service.is_empty() {
            errors.insert("service".to_owned(), "Please select a package.".to_owned());
        }

        if self.booking_type.is_none() {
            errors.insert(
                "bookingType".to_owned(),
                "Choose a booking type.".to_owned(),
            );
        }

        if self.booking_type == Some(BookingType::External) && self.add_ons.len() > ADD_ONS_MAX {
            errors.insert(
                "addOns".to_owned(),
                "Too many add-ons selected.".to_owned(),
            );
        }

        if !self.date.is_empty() && !is_date_shaped(&self.date) {
            errors.insert("date".to_owned(), "Invalid date.".to_owned());
        }

        errors
    }

    /// Whether the honeypot field was filled in.
    #[must_use]
    pub fn is_spam(&self) -> bool {
        !self.honeypot.is_empty()
    }

    /// Recipient route for this request.
    #[must_use]
    pub fn route(&self) -> Route {
        Route::from_raw(&self.booking_type_raw)
    }

    /// Caller-provided subject, or one synthesized from the booking type
    /// and service.
    #[must_use]
    pub fn subject_or_default(&self) -> String {
        self.subject.clone().unwrap_or_else(|| {
            self.booking_type.map_or_else(
                || FALLBACK_SUBJECT.to_owned(),
                |t| default_subject(t, &self.service),
            )
        })
    }
}
