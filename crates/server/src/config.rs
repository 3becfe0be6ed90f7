//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `ACCESS_TOKEN_SECRET` - Access token signing secret (min 32 chars, high entropy)
//! - `REFRESH_TOKEN_SECRET` - Refresh token signing secret (min 32 chars, differs from access)
//! - `RATINGS_DATABASE_URL` or `DATABASE_URL` - `PostgreSQL` connection string.
//!   When neither is set the URL is assembled from `DB_HOST`, `DB_PORT`,
//!   `DB_USER`, `DB_PASSWORD` and `DB_NAME`.
//!
//! ## Optional
//! - `RATINGS_HOST` - Bind address (default: 127.0.0.1)
//! - `RATINGS_PORT` or `PORT` - Listen port (default: 5000)
//! - `ALLOWED_ORIGINS` (or `ALLOWED_ORIGIN`) - CORS origins, JSON array or
//!   comma separated (default: `http://localhost:5173`)
//! - `ACCESS_TOKEN_TTL_HOURS` - Access token validity (default: 72)
//! - `REFRESH_TOKEN_TTL_HOURS` - Refresh token validity (default: 168)
//! - `COOKIE_SECURE` - Mark auth cookies `Secure` (default: true)
//! - `DATABASE_MAX_CONNECTIONS` - Pool size (default: 10)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

const MIN_TOKEN_SECRET_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;
const DEFAULT_ACCESS_TTL_HOURS: u64 = 72;
const DEFAULT_REFRESH_TTL_HOURS: u64 = 168;
const DEFAULT_ALLOWED_ORIGIN: &str = "http://localhost:5173";

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
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

/// Server application configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// Maximum number of pooled database connections
    pub max_connections: u32,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Origins allowed to make credentialed cross-origin requests
    pub allowed_origins: Vec<String>,
    /// Token signing configuration
    pub tokens: TokenConfig,
    /// Whether auth cookies carry the `Secure` attribute
    pub cookie_secure: bool,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Access/refresh token configuration.
///
/// Implements `Debug` manually to redact secret fields.
#[derive(Clone)]
pub struct TokenConfig {
    /// Secret used to sign access tokens
    pub access_secret: SecretString,
    /// Secret used to sign refresh tokens
    pub refresh_secret: SecretString,
    /// How long an access token stays valid
    pub access_ttl: Duration,
    /// How long a refresh token stays valid
    pub refresh_ttl: Duration,
}

impl std::fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenConfig")
            .field("access_secret", &"[REDACTED]")
            .field("refresh_secret", &"[REDACTED]")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish()
    }
}

impl TokenConfig {
    /// Build a token configuration with the default 3 day / 7 day validity.
    #[must_use]
    pub fn new(access_secret: SecretString, refresh_secret: SecretString) -> Self {
        Self {
            access_secret,
            refresh_secret,
            access_ttl: Duration::from_secs(DEFAULT_ACCESS_TTL_HOURS * 3600),
            refresh_ttl: Duration::from_secs(DEFAULT_REFRESH_TTL_HOURS * 3600),
        }
    }

    fn from_env() -> Result<Self, ConfigError> {
        let access_secret = get_validated_secret("ACCESS_TOKEN_SECRET")?;
        let refresh_secret = get_validated_secret("REFRESH_TOKEN_SECRET")?;

        if access_secret.expose_secret() == refresh_secret.expose_secret() {
            return Err(ConfigError::InsecureSecret(
                "REFRESH_TOKEN_SECRET".to_string(),
                "must differ from ACCESS_TOKEN_SECRET".to_string(),
            ));
        }

        let access_hours = parse_env_or_default::<u64>(
            "ACCESS_TOKEN_TTL_HOURS",
            DEFAULT_ACCESS_TTL_HOURS,
        )?;
        let refresh_hours = parse_env_or_default::<u64>(
            "REFRESH_TOKEN_TTL_HOURS",
            DEFAULT_REFRESH_TTL_HOURS,
        )?;

        Ok(Self {
            access_secret,
            refresh_secret,
            access_ttl: ttl_from_hours("ACCESS_TOKEN_TTL_HOURS", access_hours)?,
            refresh_ttl: ttl_from_hours("REFRESH_TOKEN_TTL_HOURS", refresh_hours)?,
        })
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

        let database_url = get_database_url("RATINGS_DATABASE_URL")?;
        let max_connections = parse_env_or_default::<u32>("DATABASE_MAX_CONNECTIONS", 10)?;
        let host = get_env_or_default("RATINGS_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("RATINGS_HOST".to_string(), e.to_string()))?;
        let port_key = if get_optional_env("RATINGS_PORT").is_some() {
            "RATINGS_PORT"
        } else {
            "PORT"
        };
        let port = parse_env_or_default::<u16>(port_key, 5000)?;
        let allowed_origins = parse_origins(
            &get_optional_env("ALLOWED_ORIGINS")
                .or_else(|| get_optional_env("ALLOWED_ORIGIN"))
                .unwrap_or_else(|| DEFAULT_ALLOWED_ORIGIN.to_string()),
        )
        .map_err(|e| ConfigError::InvalidEnvVar("ALLOWED_ORIGINS".to_string(), e))?;
        let tokens = TokenConfig::from_env()?;
        let cookie_secure = parse_env_or_default::<bool>("COOKIE_SECURE", true)?;
        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");

        Ok(Self {
            database_url,
            max_connections,
            host,
            port,
            allowed_origins,
            tokens,
            cookie_secure,
            sentry_dsn,
            sentry_environment,
        })
    }

    /// Resolve only the database URL, for tools that never sign tokens.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVar` when no URL can be assembled.
    pub fn database_url_from_env() -> Result<SecretString, ConfigError> {
        let _ = dotenvy::dotenv();
        get_database_url("RATINGS_DATABASE_URL")
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get database URL, falling back to `DATABASE_URL` and then to the
/// discrete `DB_*` variables.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    let Some(host) = get_optional_env("DB_HOST") else {
        return Err(ConfigError::MissingEnvVar(primary_key.to_string()));
    };
    let port = parse_env_or_default::<u16>("DB_PORT", 5432)?;
    let user = get_env_or_default("DB_USER", "postgres");
    let password = get_optional_env("DB_PASSWORD").unwrap_or_default();
    let name = get_env_or_default("DB_NAME", "store_ratings");

    Ok(SecretString::from(assemble_database_url(
        &host, port, &user, &password, &name,
    )))
}

fn assemble_database_url(host: &str, port: u16, user: &str, password: &str, name: &str) -> String {
    if password.is_empty() {
        format!("postgres://{user}@{host}:{port}/{name}")
    } else {
        format!("postgres://{user}:{password}@{host}:{port}/{name}")
    }
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an environment variable, using `default` when it is unset.
fn parse_env_or_default<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match get_optional_env(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
        None => Ok(default),
    }
}

/// Convert a TTL in hours, rejecting values whose seconds overflow `u64`.
fn ttl_from_hours(key: &str, hours: u64) -> Result<Duration, ConfigError> {
    hours
        .checked_mul(3600)
        .map(Duration::from_secs)
        .ok_or_else(|| {
            ConfigError::InvalidEnvVar(key.to_string(), format!("{hours} hours is out of range"))
        })
}

/// Parse allowed origins from a JSON array (`["http://a", "http://b"]`) or a
/// comma-separated list.
fn parse_origins(raw: &str) -> Result<Vec<String>, String> {
    let trimmed = raw.trim();
    let origins: Vec<String> = if trimmed.starts_with('[') {
        serde_json::from_str::<Vec<String>>(trimmed).map_err(|e| e.to_string())?
    } else {
        trimmed
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect()
    };

    if origins.is_empty() {
        return Err("at least one origin is required".to_string());
    }
    Ok(origins)
}

/// Validate that a token secret meets minimum length requirements.
fn validate_token_secret_length(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.len() < MIN_TOKEN_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_TOKEN_SECRET_LENGTH,
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

/// Load and validate a signing secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    let secret = SecretString::from(value);
    validate_token_secret_length(&secret, key)?;
    Ok(secret)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_single_char() {
        assert!((shannon_entropy("aaaaaaa") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_high() {
        let entropy = shannon_entropy("aB3$xY9!mK2@nL5#");
        assert!(entropy > 3.3);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let result = validate_secret_strength("your-jwt-key-here", "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let result = validate_secret_strength("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa", "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        let result = validate_secret_strength("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6", "TEST_VAR");
        assert!(result.is_ok());
    }

    #[test]
    fn test_validate_token_secret_too_short() {
        let secret = SecretString::from("short");
        assert!(validate_token_secret_length(&secret, "TEST_SECRET").is_err());
    }

    #[test]
    fn test_validate_token_secret_valid_length() {
        let secret = SecretString::from("a".repeat(32));
        assert!(validate_token_secret_length(&secret, "TEST_SECRET").is_ok());
    }

    #[test]
    fn test_parse_origins_json_array() {
        let origins = parse_origins(r#"["http://localhost:5173", "https://ratings.app"]"#).unwrap();
        assert_eq!(origins, vec!["http://localhost:5173", "https://ratings.app"]);
    }

    #[test]
    fn test_parse_origins_comma_separated() {
        let origins = parse_origins("http://a.test, http://b.test,").unwrap();
        assert_eq!(origins, vec!["http://a.test", "http://b.test"]);
    }

    #[test]
    fn test_parse_origins_rejects_empty() {
        assert!(parse_origins(" ").is_err());
        assert!(parse_origins("[]").is_err());
        assert!(parse_origins("[not json").is_err());
    }

    #[test]
    fn test_assemble_database_url() {
        assert_eq!(
            assemble_database_url("db", 5432, "app", "pw", "ratings"),
            "postgres://app:pw@db:5432/ratings"
        );
        assert_eq!(
            assemble_database_url("localhost", 5433, "postgres", "", "ratings"),
            "postgres://postgres@localhost:5433/ratings"
        );
    }

    #[test]
    fn test_token_config_default_ttls() {
        let config = TokenConfig::new(SecretString::from("a"), SecretString::from("b"));
        assert_eq!(config.access_ttl, Duration::from_secs(3 * 24 * 3600));
        assert_eq!(config.refresh_ttl, Duration::from_secs(7 * 24 * 3600));
    }

    #[test]
    fn test_token_config_debug_redacts() {
        let config = TokenConfig::new(
            SecretString::from("access-material"),
            SecretString::from("refresh-material"),
        );
        let debug = format!("{config:?}");
        assert!(!debug.contains("access-material"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn test_ttl_from_hours() {
        assert_eq!(
            ttl_from_hours("ACCESS_TOKEN_TTL_HOURS", 72).unwrap(),
            Duration::from_secs(259_200)
        );
        assert!(matches!(
            ttl_from_hours("ACCESS_TOKEN_TTL_HOURS", u64::MAX),
            Err(ConfigError::InvalidEnvVar(key, _)) if key == "ACCESS_TOKEN_TTL_HOURS"
        ));
        assert!(ttl_from_hours("REFRESH_TOKEN_TTL_HOURS", u64::MAX / 3600).is_ok());
    }
}
