//! Booking form values and local validation.

use mkm_core::{BookingSubmission, BookingType, ErrorMap};

/// The fields a user fills in on the booking form.
///
/// All values are raw user input; normalization happens inside the shared
/// rule set, so the form and the server agree on every verdict.
#[derive(Debug, Clone, Default)]
pub struct BookingForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub booking_type: String,
    /// Package named in the free-form field.
    pub service: String,
    /// Package chosen from the package cards; wins over `service`.
    pub selected_service: String,
    /// Add-on selections; only meaningful for External bookings.
    pub add_ons: Vec<String>,
    pub date: String,
    pub message: String,
    /// Honeypot. Rendered off-screen on the real form; humans never fill
    /// it.
    pub company: String,
}

impl BookingForm {
    /// Apply the shared rule set locally.
    ///
    /// Returns the same field-keyed errors the server would produce;
    /// empty means the form is ready to submit.
    #[must_use]
    pub fn validate(&self) -> ErrorMap {
        self.to_submission().normalize().validate()
    }

    /// Assemble the wire payload.
    ///
    /// Mirrors what the form serializes: add-ons are dropped for venue
    /// bookings (they only apply to the mobile rig), and the subject is
    /// prefilled from the booking type and effective service.
    #[must_use]
    pub fn to_submission(&self) -> BookingSubmission {
        let is_pizza = BookingType::parse(&self.booking_type) == Some(BookingType::PizzaRecords);

        let mut submission = BookingSubmission {
            name: self.name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            service: self.service.clone(),
            selected_service: self.selected_service.clone(),
            date: self.date.clone(),
            message: self.message.clone(),
            booking_type: self.booking_type.clone(),
            add_ons: if is_pizza {
                Vec::new()
            } else {
                self.add_ons.clone()
            },
            subject: None,
            company: self.company.clone(),
        };
        submission.subject = Some(submission.normalize().subject_or_default());
        submission
    }
}
