//! Portal configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `QRVOTIFY_BASE_URL` - Public URL for the portal
//!
//! ## Optional
//! - `QRVOTIFY_HOST` - Bind address (default: 127.0.0.1)
//! - `QRVOTIFY_PORT` - Listen port (default: 3000)
//! - `QRVOTIFY_API_BASE_URL` - Voter API base URL (default: <http://localhost:5000/api>)
//! - `QRVOTIFY_API_TOKEN` - Bearer token for the voter API
//! - `QRVOTIFY_API_TIMEOUT_SECS` - Voter API request timeout (default: 30)
//! - `RECAPTCHA_SITE_KEY` - reCAPTCHA site key; the login captcha is required when set
//! - `QRVOTIFY_SESSION_TIMEOUT_MINUTES` - Login inactivity timeout (default: 10)
//! - `QRVOTIFY_DRAFT_IDLE_MINUTES` - Registration draft idle expiry (default: 30)
//! - `QRVOTIFY_MAX_UPLOAD_BYTES` - Registration request body limit (default: 10 MiB)
//! - `QRVOTIFY_STEP_GATE` - `ungated` or `block` (default: ungated)
//! - `QRVOTIFY_TRUST_PROXY_HEADERS` - Key rate limits on `X-Forwarded-For` /
//!   `X-Real-IP` instead of the peer address; only behind a proxy that sets
//!   them (default: false)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use qrvotify_core::registration::StepGate;
use secrecy::SecretString;
use thiserror::Error;
use url::Url;

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
    "insert",
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

/// Portal application configuration.
#[derive(Debug, Clone)]
pub struct PortalConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the portal
    pub base_url: String,
    /// Voter API configuration
    pub api: VoterApiConfig,
    /// reCAPTCHA site key (public)
    pub recaptcha_site_key: Option<String>,
    /// Inactivity timeout for logged-in sessions
    pub session_timeout: Duration,
    /// Idle expiry for registration drafts
    pub draft_idle_timeout: Duration,
    /// Body limit for registration uploads
    pub max_upload_bytes: usize,
    /// Whether "Next" waits for the current step to be valid
    pub step_gate: StepGate,
    /// Whether client IPs are taken from proxy headers
    pub trust_proxy_headers: bool,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Voter API configuration.
///
/// Implements `Debug` manually to redact the token.
#[derive(Clone)]
pub struct VoterApiConfig {
    /// Base URL, e.g. `http://localhost:5000/api`
    pub base_url: Url,
    /// Optional bearer token
    pub token: Option<SecretString>,
    /// Per-request timeout
    pub timeout: Duration,
}

impl std::fmt::Debug for VoterApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VoterApiConfig")
            .field("base_url", &self.base_url.as_str())
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl PortalConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if the API token fails validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = parse_env("QRVOTIFY_HOST", "127.0.0.1")?;
        let port = parse_env("QRVOTIFY_PORT", "3000")?;
        let base_url = get_required_env("QRVOTIFY_BASE_URL")?;
        let api = VoterApiConfig::from_env()?;
        let recaptcha_site_key = get_optional_env("RECAPTCHA_SITE_KEY");
        let session_timeout = parse_minutes("QRVOTIFY_SESSION_TIMEOUT_MINUTES", "10")?;
        let draft_idle_timeout = parse_minutes("QRVOTIFY_DRAFT_IDLE_MINUTES", "30")?;
        let max_upload_bytes = parse_env("QRVOTIFY_MAX_UPLOAD_BYTES", "10485760")?;
        let step_gate = parse_env("QRVOTIFY_STEP_GATE", "ungated")?;
        let trust_proxy_headers = parse_env("QRVOTIFY_TRUST_PROXY_HEADERS", "false")?;

        Ok(Self {
            host,
            port,
            base_url,
            api,
            recaptcha_site_key,
            session_timeout,
            draft_idle_timeout,
            max_upload_bytes,
            step_gate,
            trust_proxy_headers,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies should be marked `Secure`.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

impl VoterApiConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let raw = get_env_or_default("QRVOTIFY_API_BASE_URL", "http://localhost:5000/api");
        let base_url = Url::parse(&raw).map_err(|e| {
            ConfigError::InvalidEnvVar("QRVOTIFY_API_BASE_URL".to_string(), e.to_string())
        })?;
        let token = get_optional_env("QRVOTIFY_API_TOKEN")
            .map(|value| {
                validate_secret_strength(&value, "QRVOTIFY_API_TOKEN")?;
                Ok::<_, ConfigError>(SecretString::from(value))
            })
            .transpose()?;
        let timeout = Duration::from_secs(parse_env("QRVOTIFY_API_TIMEOUT_SECS", "30")?);

        Ok(Self {
            base_url,
            token,
            timeout,
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

/// Get an optional environment variable. Empty values count as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an environment variable (or its default) into `T`.
fn parse_env<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    get_env_or_default(key, default)
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Parse a whole number of minutes into a `Duration`.
fn parse_minutes(key: &str, default: &str) -> Result<Duration, ConfigError> {
    minutes(key, parse_env(key, default)?)
}

fn minutes(key: &str, minutes: u64) -> Result<Duration, ConfigError> {
    minutes
        .checked_mul(60)
        .map(Duration::from_secs)
        .ok_or_else(|| {
            ConfigError::InvalidEnvVar(key.to_string(), format!("{minutes} minutes is too long"))
        })
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
    let len = s.chars().count() as f64;
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

    if let Some(pattern) = PLACEHOLDER_PATTERNS.iter().find(|p| lower.contains(*p)) {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!("appears to be a placeholder (contains '{pattern}')"),
        ));
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated token."
            ),
        ));
    }

    Ok(())
}
