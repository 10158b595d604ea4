//! Session token codec.
//!
//! Tokens are HS256-signed JWTs carrying the admin username as `sub`. They
//! are stateless: nothing is stored server-side, so a token stays valid until
//! `exp` or until the signing secret changes.

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use super::AuthError;

/// Session lifetime in seconds (7 days).
pub const SESSION_TTL_SECS: i64 = 7 * 24 * 60 * 60;

/// Claims embedded in every session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Admin username.
    pub sub: String,
    /// Issued-at time (UTC Unix timestamp).
    pub iat: i64,
    /// Expiration time (UTC Unix timestamp).
    pub exp: i64,
}

/// Signs and verifies session tokens with a server-held secret.
#[derive(Clone)]
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("secret", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl TokenCodec {
    #[must_use]
    pub fn new(secret: &SecretString) -> Self {
        let bytes = secret.expose_secret().as_bytes();
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(bytes),
            decoding: DecodingKey::from_secret(bytes),
            validation,
        }
    }

    /// Sign a token for `user_id` that expires in [`SESSION_TTL_SECS`].
    ///
    /// # Errors
    ///
    /// Returns `AuthError::TokenSigning` if encoding fails.
    pub fn sign(&self, user_id: &str) -> Result<String, AuthError> {
        self.sign_at(user_id, Utc::now().timestamp())
    }

    fn sign_at(&self, user_id: &str, issued_at: i64) -> Result<String, AuthError> {
        let claims = Claims {
            sub: user_id.to_owned(),
            iat: issued_at,
            exp: issued_at + SESSION_TTL_SECS,
        };
        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?)
    }

    /// Verify a token. Any parse, signature or expiry failure is `None`.
    #[must_use]
    pub fn verify(&self, token: &str) -> Option<Claims> {
        match decode::<Claims>(token, &self.decoding, &self.validation) {
            Ok(data) => Some(data.claims),
            Err(e) => {
                tracing::debug!(error = %e, "Session token rejected");
                None
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn codec(secret: &str) -> TokenCodec {
        TokenCodec::new(&SecretString::from(secret))
    }

    #[test]
    fn test_sign_and_verify() {
        let codec = codec("test-secret-that-is-long-enough-for-hmac");
        let token = codec.sign("admin").unwrap();

        let claims = codec.verify(&token).unwrap();
        assert_eq!(claims.sub, "admin");
        assert_eq!(claims.exp - claims.iat, SESSION_TTL_SECS);
    }

    #[test]
    fn test_expired_token_fails() {
        let codec = codec("test-secret-that-is-long-enough-for-hmac");
        let issued = Utc::now().timestamp() - SESSION_TTL_SECS - 1;
        let token = codec.sign_at("admin", issued).unwrap();

        assert!(codec.verify(&token).is_none(), "expired token must fail");
    }

    #[test]
    fn test_different_secrets_fail() {
        let token = codec("secret-alpha").sign("admin").unwrap();
        assert!(codec("secret-bravo").verify(&token).is_none());
    }

    #[test]
    fn test_garbage_fails() {
        let codec = codec("secret");
        assert!(codec.verify("").is_none());
        assert!(codec.verify("not.a.jwt").is_none());
    }

    #[test]
    fn test_debug_redacts_secret() {
        let debug = format!("{:?}", codec("super-secret-value"));
        assert!(!debug.contains("super-secret-value"));
    }
}
