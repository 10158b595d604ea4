//! Admin authentication service.
//!
//! A single admin identity is configured through the environment. Login
//! checks the username and an Argon2 password hash, then mints a session
//! token for the configured username.

mod error;
mod password;
mod token;

pub use error::AuthError;
pub use password::hash_password;
pub use token::{Claims, SESSION_TTL_SECS, TokenCodec};

use argon2::password_hash::PasswordHash;
use secrecy::{ExposeSecret, SecretString};

use crate::config::{AuthConfig, Environment};

/// Plain-text password accepted outside production when no usable hash is configured.
pub const DEV_FALLBACK_PASSWORD: &str = "admin123";

/// Result of a login attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// Credentials matched; the token authenticates later requests.
    Success { token: String },
    /// Credentials did not match.
    Rejected,
}

impl LoginOutcome {
    /// Client-facing message for a rejected login.
    pub const REJECTED_MESSAGE: &'static str = "Invalid credentials";
}

/// Checks admin credentials and issues session tokens.
#[derive(Debug, Clone)]
pub struct CredentialVerifier {
    admin_username: String,
    password_hash: Option<SecretString>,
    environment: Environment,
    codec: TokenCodec,
}

impl CredentialVerifier {
    #[must_use]
    pub fn new(auth: &AuthConfig, environment: Environment, codec: TokenCodec) -> Self {
        Self {
            admin_username: auth.admin_username.clone(),
            password_hash: auth.password_hash.clone(),
            environment,
            codec,
        }
    }

    /// Verify `username` and `password`.
    ///
    /// The username is trimmed and compared case-insensitively. Both halves
    /// are always checked so a wrong username and a wrong password look the
    /// same to the caller.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::TokenSigning` if the credentials match but the
    /// token cannot be signed.
    pub fn login(&self, username: &str, password: &str) -> Result<LoginOutcome, AuthError> {
        let username_ok =
            username.trim().to_lowercase() == self.admin_username.trim().to_lowercase();
        let password_ok = self.password_matches(password);

        if !(username_ok && password_ok) {
            tracing::info!(username_ok, "Admin login rejected");
            return Ok(LoginOutcome::Rejected);
        }

        let token = self.codec.sign(&self.admin_username)?;
        tracing::info!(username = %self.admin_username, "Admin login succeeded");
        Ok(LoginOutcome::Success { token })
    }

    /// Verify a session token.
    #[must_use]
    pub fn verify_token(&self, token: &str) -> Option<Claims> {
        self.codec.verify(token)
    }

    fn password_matches(&self, password: &str) -> bool {
        let parsed = self
            .password_hash
            .as_ref()
            .and_then(|hash| PasswordHash::new(hash.expose_secret()).ok());

        match parsed {
            Some(hash) => password::verify_password(password, &hash).is_ok(),
            None if self.environment.is_production() => {
                tracing::error!("ADMIN_PASSWORD_HASH is missing or malformed; rejecting login");
                false
            }
            None => {
                tracing::warn!("No usable ADMIN_PASSWORD_HASH; accepting development password");
                password == DEV_FALLBACK_PASSWORD
            }
        }
    }
}
