//! Field constraints shared by the client form and the server handler.
//!
//! Both sides apply exactly this rule set; the server re-derives validity
//! from the raw payload and never trusts the client's verdict.

use std::sync::LazyLock;

use regex::Regex;

/// Minimum length of the submitter's name, after whitespace collapsing.
pub const NAME_MIN_CHARS: usize = 2;

/// Minimum message length, counted on the whitespace-collapsed form.
pub const MESSAGE_MIN_CHARS: usize = 20;

/// Maximum message length, counted on the raw (newline-preserving) form.
pub const MESSAGE_MAX_CHARS: usize = 5000;

/// Maximum number of embedded links a message may carry.
pub const MESSAGE_MAX_LINKS: usize = 5;

/// Maximum number of add-ons an External booking may select.
pub const ADD_ONS_MAX: usize = 12;

/// Resubmission cooldown applied on both sides of the wire, in seconds.
///
/// The client-side throttle is a UX nicety only; the server enforces the
/// same window authoritatively per caller address.
pub const SUBMIT_COOLDOWN_SECS: u64 = 60;

static DATE_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("date pattern is valid"));

static LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)https?://|www\.").expect("link pattern is valid"));

/// Trim and collapse internal whitespace runs to single spaces.
///
/// The same normalization the form applies before measuring field lengths.
#[must_use]
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalize a message body for the outgoing email: strip carriage returns,
/// preserve newlines, trim the ends.
#[must_use]
pub fn normalize_message(s: &str) -> String {
    s.replace('\r', "").trim().to_owned()
}

/// Whether a date string has the exact `YYYY-MM-DD` shape.
///
/// No calendar validity check beyond the shape - "2025-99-99" passes,
/// matching the form's behavior.
#[must_use]
pub fn is_date_shaped(s: &str) -> bool {
    DATE_SHAPE.is_match(s)
}

/// Count embedded links: case-insensitive occurrences of `http://`,
/// `https://`, and `www.`.
#[must_use]
pub fn count_links(s: &str) -> usize {
    LINK.find_iter(s).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  Jo   Lee "), "Jo Lee");
        assert_eq!(collapse_whitespace("one\t\ntwo"), "one two");
        assert_eq!(collapse_whitespace(""), "");
        assert_eq!(collapse_whitespace("   "), "");
    }

    #[test]
    fn test_normalize_message_strips_cr_keeps_lf() {
        assert_eq!(normalize_message("line one\r\nline two\r\n"), "line one\nline two");
        assert_eq!(normalize_message("  padded  "), "padded");
    }

    #[test]
    fn test_date_shape() {
        assert!(is_date_shaped("2026-08-05"));
        assert!(is_date_shaped("2025-99-99")); // shape only, no calendar check

        assert!(!is_date_shaped("2026-8-5"));
        assert!(!is_date_shaped("08/05/2026"));
        assert!(!is_date_shaped("2026-08-05 "));
        assert!(!is_date_shaped(""));
    }

    #[test]
    fn test_count_links() {
        assert_eq!(count_links("no links here"), 0);
        assert_eq!(count_links("see http://a.com and https://b.com"), 2);
        assert_eq!(count_links("visit www.example.com"), 1);
        assert_eq!(count_links("HTTP://SHOUTY.COM and WWW.LOUD.COM"), 2);
        // A full URL with a www host counts as two occurrences.
        assert_eq!(count_links("https://www.example.com"), 2);
    }
}
