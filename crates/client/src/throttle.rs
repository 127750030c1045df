//! Local resubmission throttle.
//!
//! The browser form keeps its last-submission timestamp in local storage;
//! this is the same idea persisted to a small state file. Storage failures
//! never block the user - the throttle quietly degrades to "allowed",
//! because the server enforces the same window authoritatively.

use std::path::PathBuf;

use chrono::Utc;
use mkm_core::rules::SUBMIT_COOLDOWN_SECS;

/// Persisted timestamp of the last successful submission.
#[derive(Debug, Clone)]
pub struct LastSubmitStore {
    path: PathBuf,
}

impl LastSubmitStore {
    /// Create a store backed by the given state file. The file need not
    /// exist yet.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Whether enough time has passed since the last recorded submission.
    ///
    /// A missing or unreadable state file counts as "allowed".
    #[must_use]
    pub fn can_submit_now(&self) -> bool {
        let Some(last) = self.read_timestamp() else {
            return true;
        };
        let elapsed = Utc::now().timestamp().saturating_sub(last);
        u64::try_from(elapsed).is_ok_and(|secs| secs >= SUBMIT_COOLDOWN_SECS)
    }

    /// Record a successful submission at the current time.
    ///
    /// Write failures are swallowed; the next submission simply won't be
    /// throttled locally.
    pub fn record_submission(&self) {
        let now = Utc::now().timestamp();
        if let Err(err) = std::fs::write(&self.path, now.to_string()) {
            tracing::debug!(path = %self.path.display(), error = %err, "Could not persist submit timestamp");
        }
    }

    fn read_timestamp(&self) -> Option<i64> {
        let contents = std::fs::read_to_string(&self.path).ok()?;
        contents.trim().parse::<i64>().ok()
    }
}
