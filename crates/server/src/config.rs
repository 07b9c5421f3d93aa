//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `DATABASE_URL` - `PostgreSQL` connection string
//! - `VIOLET_BASE_URL` - Public URL of the site (OAuth redirects are built from it)
//! - `VIOLET_SESSION_SECRET` - Session secret (min 32 chars, high entropy)
//! - `GOOGLE_CLIENT_ID` - Google OAuth client ID
//! - `GOOGLE_CLIENT_SECRET` - Google OAuth client secret
//! - `GOOGLE_BOOKS_API_KEY` - Google Books API key
//! - `REDIS_URL` - Redis connection string for the description cache
//! - `OPENAI_API_KEY` - `OpenAI` API key
//! - `R2_ACCOUNT_ID` - Cloudflare account id (storage host prefix)
//! - `R2_ACCESS_KEY_ID` - Object storage access key id
//! - `R2_SECRET_ACCESS_KEY` - Object storage secret access key
//! - `BUCKET_PUBLIC_URL` - Public base URL uploaded images are served from
//!
//! ## Optional
//! - `VIOLET_HOST` - Bind address (default: 127.0.0.1)
//! - `VIOLET_PORT` - Listen port (default: 3000)
//! - `OPENAI_MODEL` - Chat model used for descriptions (default: gpt-4o-mini)
//! - `R2_BUCKET` - Bucket name (default: book-app)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

const MIN_SESSION_SECRET_LENGTH: usize = 32;
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

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL of the site, without trailing slash
    pub base_url: String,
    /// Session secret
    pub session_secret: SecretString,
    /// Google OAuth and Books API configuration
    pub google: GoogleConfig,
    /// Redis connection URL (may contain password)
    pub redis_url: SecretString,
    /// `OpenAI` configuration
    pub openai: OpenAiConfig,
    /// Object storage configuration
    pub storage: StorageConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment tag
    pub sentry_environment: Option<String>,
}

/// Google OAuth and Books API configuration.
///
/// Implements `Debug` manually to redact secret fields.
#[derive(Clone)]
pub struct GoogleConfig {
    /// OAuth client ID
    pub client_id: String,
    /// OAuth client secret
    pub client_secret: SecretString,
    /// Books API key
    pub books_api_key: SecretString,
}

impl std::fmt::Debug for GoogleConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("books_api_key", &"[REDACTED]")
            .finish()
    }
}

/// `OpenAI` chat completions configuration.
#[derive(Clone)]
pub struct OpenAiConfig {
    /// API key
    pub api_key: SecretString,
    /// Model name
    pub model: String,
}

impl std::fmt::Debug for OpenAiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiConfig")
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .finish()
    }
}

/// S3-compatible object storage configuration (Cloudflare R2).
#[derive(Clone)]
pub struct StorageConfig {
    /// Account id, used as the storage host prefix
    pub account_id: String,
    /// Access key id
    pub access_key_id: String,
    /// Secret access key
    pub secret_access_key: SecretString,
    /// Bucket name
    pub bucket: String,
    /// Public base URL for uploaded objects, without trailing slash
    pub public_url: String,
}

impl std::fmt::Debug for StorageConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageConfig")
            .field("account_id", &self.account_id)
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"[REDACTED]")
            .field("bucket", &self.bucket)
            .field("public_url", &self.public_url)
            .finish()
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_required_secret("DATABASE_URL")?;
        let host = get_env_or_default("VIOLET_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("VIOLET_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("VIOLET_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("VIOLET_PORT".to_string(), e.to_string()))?;
        let base_url = normalize_base_url(&get_required_env("VIOLET_BASE_URL")?, "VIOLET_BASE_URL")?;
        let session_secret = get_validated_secret("VIOLET_SESSION_SECRET")?;
        validate_session_secret(&session_secret, "VIOLET_SESSION_SECRET")?;

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            session_secret,
            google: GoogleConfig::from_env()?,
            redis_url: get_required_secret("REDIS_URL")?,
            openai: OpenAiConfig::from_env()?,
            storage: StorageConfig::from_env()?,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies should carry the `Secure` attribute.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }

    /// OAuth callback URL registered with Google.
    #[must_use]
    pub fn oauth_redirect_uri(&self) -> String {
        format!("{}/auth/google/callback", self.base_url)
    }
}

impl GoogleConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            client_id: get_required_env("GOOGLE_CLIENT_ID")?,
            client_secret: get_validated_secret("GOOGLE_CLIENT_SECRET")?,
            books_api_key: get_validated_secret("GOOGLE_BOOKS_API_KEY")?,
        })
    }
}

impl OpenAiConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            api_key: get_validated_secret("OPENAI_API_KEY")?,
            model: get_env_or_default("OPENAI_MODEL", "gpt-4o-mini"),
        })
    }
}

impl StorageConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            account_id: get_required_env("R2_ACCOUNT_ID")?,
            access_key_id: get_required_env("R2_ACCESS_KEY_ID")?,
            secret_access_key: get_validated_secret("R2_SECRET_ACCESS_KEY")?,
            bucket: get_env_or_default("R2_BUCKET", "book-app"),
            public_url: normalize_base_url(
                &get_required_env("BUCKET_PUBLIC_URL")?,
                "BUCKET_PUBLIC_URL",
            )?,
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

/// Get a required environment variable as a secret.
fn get_required_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    Ok(SecretString::from(value))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Check that a URL parses and strip any trailing slash.
fn normalize_base_url(value: &str, var_name: &str) -> Result<String, ConfigError> {
    url::Url::parse(value)
        .map_err(|e| ConfigError::InvalidEnvVar(var_name.to_string(), e.to_string()))?;
    Ok(value.trim_end_matches('/').to_string())
}

/// Validate that a session secret meets minimum length requirements.
fn validate_session_secret(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.len() < MIN_SESSION_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_SESSION_SECRET_LENGTH,
                value.len()
            ),
        ));
    }
    Ok(())
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
            #[allow(clippy::cast_precision_loss)]
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
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
