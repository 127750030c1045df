//! Outbound services for the intake pipeline.
//!
//! # Services
//!
//! - `mailer` - The mail transport seam: the composed message, the
//!   transport trait, and the body composer
//! - `resend` - Resend API client implementing the transport

pub mod mailer;
pub mod resend;

pub use mailer::{MailError, Mailer, OutboundEmail, SendReceipt, booking_text_body};
pub use resend::ResendClient;
