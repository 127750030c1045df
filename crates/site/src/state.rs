//! Application state shared across handlers.

use std::sync::Arc;
use std::time::Duration;

use crate::config::SiteConfig;
use crate::services::mailer::Mailer;
use crate::services::resend::{ResendClient, ResendError};
use crate::throttle::SubmissionThrottle;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`; holds the configuration, the mail
/// transport, and the submission throttle (the only mutable shared state
/// in the service).
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: SiteConfig,
    mailer: Arc<dyn Mailer>,
    throttle: SubmissionThrottle,
}

impl AppState {
    /// Create the production state: a Resend transport built from the
    /// configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the Resend client fails to build.
    pub fn new(config: SiteConfig) -> Result<Self, ResendError> {
        let mailer = Arc::new(ResendClient::new(&config.resend)?);
        Ok(Self::with_mailer(config, mailer))
    }

    /// Create state with an explicit mail transport (tests substitute a
    /// recording one here).
    #[must_use]
    pub fn with_mailer(config: SiteConfig, mailer: Arc<dyn Mailer>) -> Self {
        let throttle = SubmissionThrottle::new(Duration::from_secs(config.cooldown_secs));
        Self {
            inner: Arc::new(AppStateInner {
                config,
                mailer,
                throttle,
            }),
        }
    }

    /// Get a reference to the site configuration.
    #[must_use]
    pub fn config(&self) -> &SiteConfig {
        &self.inner.config
    }

    /// Get a reference to the mail transport.
    #[must_use]
    pub fn mailer(&self) -> &dyn Mailer {
        self.inner.mailer.as_ref()
    }

    /// Get a reference to the submission throttle.
    #[must_use]
    pub fn throttle(&self) -> &SubmissionThrottle {
        &self.inner.throttle
    }
}
