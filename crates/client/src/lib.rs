//! MKM booking-form client library.
//!
//! The browser-side half of the intake pipeline: form values, fast local
//! validation with the same rule set the server applies, a persisted
//! resubmission throttle, and JSON submission to the intake endpoint.
//!
//! Local validation and the local throttle are UX niceties, not security
//! controls - the server re-derives both authoritatively.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod client;
pub mod form;
pub mod throttle;

pub use client::{BookingClient, Confirmation, SubmitError};
pub use form::BookingForm;
pub use throttle::LastSubmitStore;
