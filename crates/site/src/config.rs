//! Site configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required in production
//! - `ADMIN_USERNAME` - Admin login name (development default: `admin`)
//! - `ADMIN_PASSWORD_HASH` - Argon2 PHC hash of the admin password
//! - `JWT_SECRET` - Session token signing secret (min 32 chars, high entropy)
//!
//! ## Required when `PORTFOLIO_STORE=postgres`
//! - `PORTFOLIO_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//!
//! ## Optional
//! - `PORTFOLIO_ENV` - `development` (default) or `production`
//! - `PORTFOLIO_HOST` - Bind address (default: 127.0.0.1)
//! - `PORTFOLIO_PORT` - Listen port (default: 3000)
//! - `PORTFOLIO_STORE` - `postgres` (default) or `memory`
//! - `BLOB_READ_WRITE_TOKEN` - Blob storage token; uploads fail without it
//! - `BLOB_API_URL` - Blob storage endpoint (default: <https://blob.vercel-storage.com>)
//! - `ADMIN_STATIC_DIR` - Directory of prebuilt admin UI assets served under `/admin`
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT`, `SENTRY_SAMPLE_RATE`, `SENTRY_TRACES_SAMPLE_RATE`

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

const MIN_JWT_SECRET_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Token signing secret used outside production when `JWT_SECRET` is unset.
pub const DEV_JWT_SECRET: &str = "dev-jwt-secret-change-me";
/// Admin login name used outside production when `ADMIN_USERNAME` is unset.
pub const DEFAULT_ADMIN_USERNAME: &str = "admin";
/// Default blob storage endpoint.
pub const DEFAULT_BLOB_API_URL: &str = "https://blob.vercel-storage.com";

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "change-me",
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

/// Deployment environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    #[must_use]
    pub const fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

/// Which document store backs the site.
#[derive(Clone)]
pub enum StoreConfig {
    /// `PostgreSQL` JSONB documents.
    Postgres { database_url: SecretString },
    /// Process-local store, lost on restart.
    Memory,
}

impl std::fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Postgres { .. } => f
                .debug_struct("Postgres")
                .field("database_url", &"[REDACTED]")
                .finish(),
            Self::Memory => f.write_str("Memory"),
        }
    }
}

/// Admin credential and session token configuration.
///
/// Implements `Debug` manually to redact the hash and signing secret.
#[derive(Clone)]
pub struct AuthConfig {
    /// The single admin identity.
    pub admin_username: String,
    /// Argon2 PHC hash of the admin password.
    pub password_hash: Option<SecretString>,
    /// HS256 signing secret for session tokens.
    pub jwt_secret: SecretString,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("admin_username", &self.admin_username)
            .field(
                "password_hash",
                &self.password_hash.as_ref().map(|_| "[REDACTED]"),
            )
            .field("jwt_secret", &"[REDACTED]")
            .finish()
    }
}

/// Blob storage configuration for image uploads.
///
/// Implements `Debug` manually to redact the token.
#[derive(Clone)]
pub struct BlobConfig {
    /// Read/write token
    pub token: SecretString,
    /// API endpoint
    pub api_url: String,
}

impl std::fmt::Debug for BlobConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlobConfig")
            .field("token", &"[REDACTED]")
            .field("api_url", &self.api_url)
            .finish()
    }
}

/// Site application configuration.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    /// Development or production
    pub environment: Environment,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Document store backend
    pub store: StoreConfig,
    /// Admin credentials and token secret
    pub auth: AuthConfig,
    /// Blob storage (optional - uploads return 500 without it)
    pub blob: Option<BlobConfig>,
    /// Prebuilt admin UI assets
    pub admin_static_dir: Option<PathBuf>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "staging", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate for performance monitoring (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

impl SiteConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if production secrets fail validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(&|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source.
    ///
    /// Empty values are treated as unset.
    ///
    /// # Errors
    ///
    /// See [`SiteConfig::from_env`].
    pub fn from_lookup(lookup: &dyn Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env(lookup);

        let environment = match env.or_default("PORTFOLIO_ENV", "development").as_str() {
            "production" => Environment::Production,
            "development" | "test" => Environment::Development,
            other => {
                return Err(ConfigError::InvalidEnvVar(
                    "PORTFOLIO_ENV".to_string(),
                    format!("expected 'development' or 'production', got '{other}'"),
                ));
            }
        };

        let host = env
            .or_default("PORTFOLIO_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("PORTFOLIO_HOST".to_string(), e.to_string()))?;
        let port = env
            .or_default("PORTFOLIO_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("PORTFOLIO_PORT".to_string(), e.to_string()))?;

        let store = match env.or_default("PORTFOLIO_STORE", "postgres").as_str() {
            "postgres" => StoreConfig::Postgres {
                database_url: env.database_url("PORTFOLIO_DATABASE_URL")?,
            },
            "memory" => {
                if environment.is_production() {
                    tracing::warn!("PORTFOLIO_STORE=memory in production; content is lost on restart");
                }
                StoreConfig::Memory
            }
            other => {
                return Err(ConfigError::InvalidEnvVar(
                    "PORTFOLIO_STORE".to_string(),
                    format!("expected 'postgres' or 'memory', got '{other}'"),
                ));
            }
        };

        let auth = AuthConfig::from_env(&env, environment)?;
        let blob = env.optional("BLOB_READ_WRITE_TOKEN").map(|token| BlobConfig {
            token: SecretString::from(token),
            api_url: env.or_default("BLOB_API_URL", DEFAULT_BLOB_API_URL),
        });

        let sentry_sample_rate = env
            .optional("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let sentry_traces_sample_rate = env
            .optional("SENTRY_TRACES_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);

        Ok(Self {
            environment,
            host,
            port,
            store,
            auth,
            blob,
            admin_static_dir: env.optional("ADMIN_STATIC_DIR").map(PathBuf::from),
            sentry_dsn: env.optional("SENTRY_DSN"),
            sentry_environment: env.optional("SENTRY_ENVIRONMENT"),
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    #[must_use]
    pub const fn is_production(&self) -> bool {
        self.environment.is_production()
    }

    /// Development configuration backed by the in-memory store.
    #[must_use]
    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            host: IpAddr::from([127, 0, 0, 1]),
            port: 3000,
            store: StoreConfig::Memory,
            auth: AuthConfig {
                admin_username: DEFAULT_ADMIN_USERNAME.to_string(),
                password_hash: None,
                jwt_secret: SecretString::from(DEV_JWT_SECRET),
            },
            blob: None,
            admin_static_dir: None,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 1.0,
        }
    }
}

impl AuthConfig {
    fn from_env(env: &Env<'_>, environment: Environment) -> Result<Self, ConfigError> {
        if environment.is_production() {
            let admin_username = env.required("ADMIN_USERNAME")?;
            let password_hash = env.required("ADMIN_PASSWORD_HASH")?;
            argon2::PasswordHash::new(&password_hash).map_err(|e| {
                ConfigError::InvalidEnvVar("ADMIN_PASSWORD_HASH".to_string(), e.to_string())
            })?;
            let jwt_secret = SecretString::from(env.required("JWT_SECRET")?);
            validate_jwt_secret(&jwt_secret, "JWT_SECRET")?;
            validate_secret_strength(jwt_secret.expose_secret(), "JWT_SECRET")?;

            return Ok(Self {
                admin_username,
                password_hash: Some(SecretString::from(password_hash)),
                jwt_secret,
            });
        }

        let jwt_secret = env.optional("JWT_SECRET").map_or_else(
            || SecretString::from(DEV_JWT_SECRET),
            |secret| {
                if let Err(e) = validate_secret_strength(&secret, "JWT_SECRET") {
                    tracing::warn!("JWT_SECRET validation warning: {e}");
                }
                SecretString::from(secret)
            },
        );

        Ok(Self {
            admin_username: env.or_default("ADMIN_USERNAME", DEFAULT_ADMIN_USERNAME),
            password_hash: env.optional("ADMIN_PASSWORD_HASH").map(SecretString::from),
            jwt_secret,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Variable source; empty values read as unset.
struct Env<'a>(&'a dyn Fn(&str) -> Option<String>);

impl Env<'_> {
    /// Get an optional environment variable.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    /// Get a required environment variable.
    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key)
            .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
    }

    /// Get an environment variable with a default value.
    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    /// Get database URL with fallback to generic `DATABASE_URL` (used by Fly.io postgres attach).
    fn database_url(&self, primary_key: &str) -> Result<SecretString, ConfigError> {
        self.optional(primary_key)
            .or_else(|| self.optional("DATABASE_URL"))
            .map(SecretString::from)
            .ok_or_else(|| ConfigError::MissingEnvVar(primary_key.to_string()))
    }
}

/// Validate that a signing secret meets minimum length requirements.
fn validate_jwt_secret(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.len() < MIN_JWT_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_JWT_SECRET_LENGTH,
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

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const STRONG_SECRET: &str = "aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6";
    // Well-formed Argon2id PHC string
    const VALID_HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$c2FsdHNhbHRzYWx0$Z0YkS8LzD0kJ1Xc8S0wYyS2Zl1Qw5b0kq3l0m6Q8t9A";

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_two_chars() {
        let entropy = shannon_entropy("ab");
        assert!((entropy - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_validate_secret_strength() {
        assert!(validate_secret_strength("your-api-key-here", "TEST_VAR").is_err());
        assert!(validate_secret_strength(DEV_JWT_SECRET, "TEST_VAR").is_err());
        assert!(validate_secret_strength("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa", "TEST_VAR").is_err());
        assert!(validate_secret_strength(STRONG_SECRET, "TEST_VAR").is_ok());
    }

    #[test]
    fn test_validate_jwt_secret_length() {
        assert!(validate_jwt_secret(&SecretString::from("short"), "JWT_SECRET").is_err());
        assert!(validate_jwt_secret(&SecretString::from("a".repeat(32)), "JWT_SECRET").is_ok());
    }

    #[test]
    fn test_development_defaults() {
        let config = SiteConfig::from_lookup(&lookup(&[("PORTFOLIO_STORE", "memory")])).unwrap();
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:3000");
        assert!(matches!(config.store, StoreConfig::Memory));
        assert_eq!(config.auth.admin_username, "admin");
        assert_eq!(config.auth.jwt_secret.expose_secret(), DEV_JWT_SECRET);
        assert!(config.auth.password_hash.is_none());
        assert!(config.blob.is_none());
    }

    #[test]
    fn test_postgres_requires_database_url() {
        let err = SiteConfig::from_lookup(&lookup(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref k) if k == "PORTFOLIO_DATABASE_URL"));
    }

    #[test]
    fn test_database_url_fallback() {
        let config =
            SiteConfig::from_lookup(&lookup(&[("DATABASE_URL", "postgres://localhost/portfolio")]))
                .unwrap();
        match config.store {
            StoreConfig::Postgres { database_url } => {
                assert_eq!(database_url.expose_secret(), "postgres://localhost/portfolio");
            }
            StoreConfig::Memory => panic!("expected postgres store"),
        }
    }

    #[test]
    fn test_production_requires_credentials() {
        let err = SiteConfig::from_lookup(&lookup(&[
            ("PORTFOLIO_ENV", "production"),
            ("PORTFOLIO_STORE", "memory"),
            ("ADMIN_USERNAME", "owner"),
            ("ADMIN_PASSWORD_HASH", VALID_HASH),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref k) if k == "JWT_SECRET"));
    }

    #[test]
    fn test_production_treats_empty_as_missing() {
        let err = SiteConfig::from_lookup(&lookup(&[
            ("PORTFOLIO_ENV", "production"),
            ("PORTFOLIO_STORE", "memory"),
            ("ADMIN_USERNAME", "  "),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref k) if k == "ADMIN_USERNAME"));
    }

    #[test]
    fn test_production_rejects_weak_secret() {
        let err = SiteConfig::from_lookup(&lookup(&[
            ("PORTFOLIO_ENV", "production"),
            ("PORTFOLIO_STORE", "memory"),
            ("ADMIN_USERNAME", "owner"),
            ("ADMIN_PASSWORD_HASH", VALID_HASH),
            ("JWT_SECRET", DEV_JWT_SECRET),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(_, _)));
    }

    #[test]
    fn test_production_rejects_unparseable_hash() {
        let err = SiteConfig::from_lookup(&lookup(&[
            ("PORTFOLIO_ENV", "production"),
            ("PORTFOLIO_STORE", "memory"),
            ("ADMIN_USERNAME", "owner"),
            ("ADMIN_PASSWORD_HASH", "plain-text"),
            ("JWT_SECRET", STRONG_SECRET),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref k, _) if k == "ADMIN_PASSWORD_HASH"));
    }

    #[test]
    fn test_production_valid() {
        let config = SiteConfig::from_lookup(&lookup(&[
            ("PORTFOLIO_ENV", "production"),
            ("PORTFOLIO_STORE", "memory"),
            ("ADMIN_USERNAME", "owner"),
            ("ADMIN_PASSWORD_HASH", VALID_HASH),
            ("JWT_SECRET", STRONG_SECRET),
            ("BLOB_READ_WRITE_TOKEN", "vercel_blob_rw_token"),
        ]))
        .unwrap();
        assert!(config.is_production());
        assert_eq!(config.auth.admin_username, "owner");
        assert_eq!(config.blob.unwrap().api_url, DEFAULT_BLOB_API_URL);
    }

    #[test]
    fn test_invalid_enum_values() {
        assert!(matches!(
            SiteConfig::from_lookup(&lookup(&[("PORTFOLIO_ENV", "staging")])),
            Err(ConfigError::InvalidEnvVar(_, _))
        ));
        assert!(matches!(
            SiteConfig::from_lookup(&lookup(&[("PORTFOLIO_STORE", "mongo")])),
            Err(ConfigError::InvalidEnvVar(_, _))
        ));
        assert!(matches!(
            SiteConfig::from_lookup(&lookup(&[("PORTFOLIO_STORE", "memory"), ("PORTFOLIO_PORT", "http")])),
            Err(ConfigError::InvalidEnvVar(_, _))
        ));
    }

    #[test]
    fn test_auth_config_debug_redacts_secrets() {
        let config = AuthConfig {
            admin_username: "owner".to_string(),
            password_hash: Some(SecretString::from(VALID_HASH)),
            jwt_secret: SecretString::from("super_secret_signing_key"),
        };

        let debug_output = format!("{config:?}");

        assert!(debug_output.contains("owner"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_signing_key"));
        assert!(!debug_output.contains("argon2id"));
    }

    #[test]
    fn test_blob_config_debug_redacts_token() {
        let config = BlobConfig {
            token: SecretString::from("vercel_blob_rw_abc"),
            api_url: DEFAULT_BLOB_API_URL.to_string(),
        };
        let debug_output = format!("{config:?}");
        assert!(debug_output.contains(DEFAULT_BLOB_API_URL));
        assert!(!debug_output.contains("vercel_blob_rw_abc"));
    }
}
