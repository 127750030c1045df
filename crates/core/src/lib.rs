//! MKM Core - Shared booking types and validation rules.
//!
//! This crate provides the types and rules used across the MKM components:
//! - `site` - Public booking-intake HTTP service
//! - `client` - Booking-form client library
//! - `cli` - Command-line tools for submissions and show maintenance
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients. Both the client form and the server handler validate with the
//! same rule set; the server never trusts the client's result and re-derives
//! validity from the raw payload.
//!
//! # Modules
//!
//! - [`booking`] - Booking type, recipient routing, and service defaults
//! - [`email`] - Validated email address with log masking
//! - [`request`] - The booking submission payload and its normalized form
//! - [`rules`] - Field constraints shared by client and server

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod booking;
pub mod email;
pub mod request;
pub mod rules;

pub use booking::{BookingType, Route, default_subject};
pub use email::{Email, EmailError};
pub use request::{BookingRequest, BookingSubmission, ErrorMap};
