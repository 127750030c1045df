//! Site configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `RESEND_API_KEY` - Resend API credential (high entropy, validated)
//!
//! ## Optional
//! - `RESEND_FROM` - Sender address (default: no-reply@mkmentertainmentllc.com)
//! - `MKM_INBOX` - MKM booking inbox (default: michaelkylemusic@icloud.com)
//! - `PIZZA_INBOX` - Pizza Records inbox (default: pizzarecords@aol.com)
//! - `SITE_HOST` - Bind address (default: 127.0.0.1)
//! - `SITE_PORT` - Listen port (default: 3000)
//! - `SUBMIT_COOLDOWN_SECS` - Per-caller submission cooldown (default: 60)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use mkm_core::{Email, Route};
use secrecy::SecretString;
use thiserror::Error;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Site application configuration.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Resend API configuration
    pub resend: ResendConfig,
    /// Recipient inbox routing configuration
    pub routing: RoutingConfig,
    /// Per-caller submission cooldown in seconds (must be nonzero)
    pub cooldown_secs: u64,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

/// Resend API configuration.
///
/// Implements `Debug` manually to redact the credential.
#[derive(Clone)]
pub struct ResendConfig {
    /// Resend API key (server-side only)
    pub api_key: SecretString,
    /// Sender address for outbound mail
    pub from: Email,
}

impl std::fmt::Debug for ResendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResendConfig")
            .field("api_key", &"[REDACTED]")
            .field("from", &self.from)
            .finish()
    }
}

/// Destination inboxes for booking requests.
#[derive(Debug, Clone)]
pub struct RoutingConfig {
    /// MKM inbox, on every route
    pub mkm_inbox: Email,
    /// Pizza Records inbox, added for venue bookings
    pub pizza_inbox: Email,
}

impl RoutingConfig {
    /// Resolve a route to its recipient list.
    #[must_use]
    pub fn recipients(&self, route: Route) -> Vec<Email> {
        match route {
            Route::DualInbox => vec![self.mkm_inbox.clone(), self.pizza_inbox.clone()],
            Route::MkmOnly => vec![self.mkm_inbox.clone()],
        }
    }
}

impl SiteConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if the API key fails validation (placeholder detection, entropy
    /// check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("SITE_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("SITE_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("SITE_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("SITE_PORT".to_string(), e.to_string()))?;

        let default_cooldown = mkm_core::rules::SUBMIT_COOLDOWN_SECS.to_string();
        let cooldown_secs = get_env_or_default("SUBMIT_COOLDOWN_SECS", &default_cooldown)
            .parse::<u64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("SUBMIT_COOLDOWN_SECS".to_string(), e.to_string())
            })?;
        if cooldown_secs == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "SUBMIT_COOLDOWN_SECS".to_string(),
                "must be nonzero".to_string(),
            ));
        }

        let resend = ResendConfig::from_env()?;
        let routing = RoutingConfig::from_env()?;
        let sentry_dsn = get_optional_env("SENTRY_DSN");

        Ok(Self {
            host,
            port,
            resend,
            routing,
            cooldown_secs,
            sentry_dsn,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl ResendConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            api_key: get_validated_secret("RESEND_API_KEY")?,
            from: get_email_or_default("RESEND_FROM", "no-reply@mkmentertainmentllc.com")?,
        })
    }
}

impl RoutingConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            mkm_inbox: get_email_or_default("MKM_INBOX", "michaelkylemusic@icloud.com")?,
            pizza_inbox: get_email_or_default("PIZZA_INBOX", "pizzarecords@aol.com")?,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Get an environment variable as a validated email address, with a default.
fn get_email_or_default(key: &str, default: &str) -> Result<Email, ConfigError> {
    let value = get_env_or_default(key, default);
    Email::parse(&value).map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    // Check blocklist
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    // Check entropy (real API keys have high entropy)
    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use the real provider credential."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}
