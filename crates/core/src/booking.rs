//! Booking type and recipient routing.

use serde::{Deserialize, Serialize};

use crate::rules::collapse_whitespace;

/// The two kinds of bookings the site accepts.
///
/// `PizzaRecords` books the venue itself; `External` books the mobile PA
/// rig for an outside event. The booking type controls recipient routing
/// and the default service package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BookingType {
    PizzaRecords,
    External,
}

impl BookingType {
    /// Parse a booking type from its wire string.
    ///
    /// Matching is case-insensitive on the trimmed, whitespace-collapsed
    /// input. Anything other than the two enumerated values is `None`.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match collapse_whitespace(s).to_lowercase().as_str() {
            "pizza records" => Some(Self::PizzaRecords),
            "external" => Some(Self::External),
            _ => None,
        }
    }

    /// Canonical display string, as shown in subjects and email bodies.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::PizzaRecords => "Pizza Records",
            Self::External => "External",
        }
    }

    /// Subject prefix for synthesized subjects.
    #[must_use]
    pub const fn subject_tag(self) -> &'static str {
        match self {
            Self::PizzaRecords => "[Pizza Records]",
            Self::External => "[External]",
        }
    }

    /// The package applied when the submission names none.
    #[must_use]
    pub const fn default_service(self) -> &'static str {
        match self {
            Self::PizzaRecords => "Pizza Records – Basic",
            Self::External => "External – Compact PA",
        }
    }
}

/// Which inboxes a booking is delivered to.
///
/// Derived from the booking type, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// MKM inbox plus the Pizza Records inbox (one send, two recipients).
    DualInbox,
    /// MKM inbox only.
    MkmOnly,
}

impl Route {
    /// Derive the route from a raw booking-type string.
    ///
    /// Total over strings: only an exact match of the normalized input
    /// against "pizza records" routes to both inboxes. A substring or
    /// prefix match must not - "pizza records venue" goes to MKM only.
    #[must_use]
    pub fn from_raw(booking_type: &str) -> Self {
        if collapse_whitespace(booking_type).to_lowercase() == "pizza records" {
            Self::DualInbox
        } else {
            Self::MkmOnly
        }
    }
}

impl From<BookingType> for Route {
    fn from(booking_type: BookingType) -> Self {
        Self::from_raw(booking_type.label())
    }
}

/// Synthesize the subject line used when the caller provides none.
#[must_use]
pub fn default_subject(booking_type: BookingType, service: &str) -> String {
    format!(
        "{} {service} — Booking Request",
        booking_type.subject_tag()
    )
}
