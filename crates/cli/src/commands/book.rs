//! Booking submission command.
//!
//! # Usage
//!
//! ```bash
//! mkm-cli book -n "Jo Lee" -e jo@example.com -t "Pizza Records" \
//!     -m "We'd like a DJ set for our anniversary party please"
//!
//! # External booking with add-ons and a date
//! mkm-cli book -n "Jo Lee" -e jo@example.com -t External \
//!     -s "External – Full PA" -a "Standard Lighting — $50" \
//!     -d 2026-09-12 -m "Outdoor wedding reception, about 120 guests"
//! ```

use clap::Args;
use mkm_client::{BookingClient, BookingForm, LastSubmitStore, SubmitError};
use thiserror::Error;
use url::Url;

/// Errors that can occur while submitting a booking.
#[derive(Debug, Error)]
pub enum BookError {
    /// The endpoint URL is not parseable.
    #[error("Invalid endpoint URL: {0}")]
    InvalidEndpoint(#[from] url::ParseError),

    /// The HTTP client failed to build.
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// The submission cycle ended without a confirmation.
    #[error("{0}")]
    Submit(#[from] SubmitError),
}

/// Arguments for the `book` command.
#[derive(Debug, Args)]
pub struct BookArgs {
    /// Intake endpoint URL
    #[arg(
        long,
        default_value = "http://localhost:3000/api/send-email",
        value_name = "URL"
    )]
    pub endpoint: String,

    /// Your full name
    #[arg(short, long)]
    pub name: String,

    /// Your email address
    #[arg(short, long)]
    pub email: String,

    /// Phone number (optional)
    #[arg(short, long, default_value = "")]
    pub phone: String,

    /// Booking type: "Pizza Records" or "External"
    #[arg(short = 't', long = "booking-type")]
    pub booking_type: String,

    /// Service package (defaults per booking type)
    #[arg(short, long, default_value = "")]
    pub service: String,

    /// Add-on, repeatable (External bookings only)
    #[arg(short = 'a', long = "add-on", value_name = "ADD_ON")]
    pub add_ons: Vec<String>,

    /// Event date, YYYY-MM-DD (optional)
    #[arg(short, long, default_value = "")]
    pub date: String,

    /// What you are booking and when
    #[arg(short, long)]
    pub message: String,

    /// State file for the local resubmission throttle
    #[arg(long, default_value = ".mkm_last_submit", value_name = "PATH")]
    pub state_file: String,
}

/// Submit a booking request through the intake endpoint.
pub async fn submit(args: BookArgs) -> Result<(), BookError> {
    let endpoint = Url::parse(&args.endpoint)?;
    let throttle = LastSubmitStore::new(&args.state_file);
    let client = BookingClient::new(endpoint, throttle)?;

    let form = BookingForm {
        name: args.name,
        email: args.email,
        phone: args.phone,
        booking_type: args.booking_type,
        service: args.service,
        add_ons: args.add_ons,
        date: args.date,
        message: args.message,
        ..BookingForm::default()
    };

    match client.submit(&form).await {
        Ok(confirmation) => {
            tracing::info!("Booking request sent!");
            tracing::info!("  Delivered to: {}", confirmation.to.join(", "));
            if let Some(id) = confirmation.id {
                tracing::info!("  Provider message id: {id}");
            }
            Ok(())
        }
        Err(SubmitError::Invalid(errors)) => {
            for (field, message) in &errors {
                tracing::error!("  {field}: {message}");
            }
            Err(SubmitError::Invalid(errors).into())
        }
        Err(err) => Err(err.into()),
    }
}
