//! Token service for credential issuance and validation
//!
//! This module provides functionality for creating and validating the
//! signed bearer credentials that bind a session to a user identity,
//! using the HS256 algorithm with a single process-wide secret. Tokens
//! are stateless: nothing is stored server-side, and a credential is
//! invalidated only by expiry or by the client discarding it.

use chrono::{DateTime, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Authentication error taxonomy
#[derive(Error, Debug, PartialEq, Eq)]
pub enum AuthError {
    /// Token is malformed or its signature does not verify
    #[error("Invalid token")]
    InvalidToken,

    /// Token signature verifies but the validity window has passed
    #[error("Token has expired")]
    ExpiredToken,

    /// Registration handle already exists
    #[error("Identity already registered")]
    DuplicateIdentity,
}

/// Token configuration
#[derive(Debug, Clone)]
pub struct TokenConfig {
    /// Shared secret for signing and verifying tokens
    pub secret: String,
    /// Token expiration time in seconds (default: 24 hours)
    pub token_expiry: u64,
}

impl TokenConfig {
    /// Create a new TokenConfig from environment variables
    ///
    /// # Environment Variables
    /// - `TOKEN_SECRET`: Shared HS256 secret (required)
    /// - `TOKEN_EXPIRY`: Token expiry in seconds (default: 86400)
    pub fn from_env() -> anyhow::Result<Self> {
        let secret = std::env::var("TOKEN_SECRET")
            .map_err(|_| anyhow::anyhow!("TOKEN_SECRET environment variable not set"))?;

        let token_expiry = std::env::var("TOKEN_EXPIRY")
            .unwrap_or_else(|_| "86400".to_string())
            .parse()
            .unwrap_or(86400);

        Ok(TokenConfig {
            secret,
            token_expiry,
        })
    }
}

/// Claims carried by a credential
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject identity
    pub sub: Uuid,
    /// Issued at time (unix seconds)
    pub iat: u64,
    /// Expiration time (unix seconds)
    pub exp: u64,
}

/// Token service
///
/// The signing key is loaded once at construction and injected into every
/// service that needs it; there is no ambient lookup and no rotation at
/// runtime. Both `issue` and `validate` take the current time as an
/// explicit input so they are pure functions of their arguments.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    token_expiry: u64,
}

impl TokenService {
    /// Initialize a new token service
    pub fn new(config: &TokenConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());
        let mut validation = Validation::new(jsonwebtoken::Algorithm::HS256);
        // Expiry is checked against the caller-supplied clock in `validate`,
        // not against the library's view of the system time.
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        TokenService {
            encoding_key,
            decoding_key,
            validation,
            token_expiry: config.token_expiry,
        }
    }

    /// Issue a credential for an identity with a fixed validity window
    pub fn issue(&self, subject: Uuid, now: DateTime<Utc>) -> Result<String, AuthError> {
        let iat = now.timestamp().max(0) as u64;

        let claims = Claims {
            sub: subject,
            iat,
            exp: iat + self.token_expiry,
        };

        encode(
            &Header::new(jsonwebtoken::Algorithm::HS256),
            &claims,
            &self.encoding_key,
        )
        .map_err(|_| AuthError::InvalidToken)
    }

    /// Validate a credential and return its claims
    ///
    /// Fails with `InvalidToken` if the token is malformed or the signature
    /// does not verify, and with `ExpiredToken` if the validity window has
    /// passed relative to `now`. Success has no side effect.
    pub fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, AuthError> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|_| AuthError::InvalidToken)?;

        let claims = token_data.claims;
        if (claims.exp as i64) < now.timestamp() {
            return Err(AuthError::ExpiredToken);
        }

        Ok(claims)
    }

    /// Get the token expiry window in seconds
    pub fn token_expiry(&self) -> u64 {
        self.token_expiry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn service(secret: &str) -> TokenService {
        TokenService::new(&TokenConfig {
            secret: secret.to_string(),
            token_expiry: 3600,
        })
    }

    fn at(ts: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(ts, 0).unwrap()
    }

    #[test]
    fn test_issue_and_validate_round_trip() {
        let svc = service("test-secret");
        let subject = Uuid::new_v4();
        let now = at(1_700_000_000);

        let token = svc.issue(subject, now).unwrap();
        let claims = svc.validate(&token, now).unwrap();

        assert_eq!(claims.sub, subject);
        assert_eq!(claims.iat, 1_700_000_000);
        assert_eq!(claims.exp, 1_700_000_000 + 3600);
    }

    #[test]
    fn test_expired_token_rejected_despite_valid_signature() {
        let svc = service("test-secret");
        let issued_at = at(1_700_000_000);
        let token = svc.issue(Uuid::new_v4(), issued_at).unwrap();

        // One second past the validity window.
        let later = at(1_700_000_000 + 3601);
        assert_eq!(svc.validate(&token, later), Err(AuthError::ExpiredToken));

        // At the boundary the token is still valid.
        let boundary = at(1_700_000_000 + 3600);
        assert!(svc.validate(&token, boundary).is_ok());
    }

    #[test]
    fn test_malformed_token_rejected() {
        let svc = service("test-secret");
        let now = at(1_700_000_000);

        assert_eq!(
            svc.validate("not-a-token", now),
            Err(AuthError::InvalidToken)
        );
        assert_eq!(svc.validate("", now), Err(AuthError::InvalidToken));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let issuer = service("secret-a");
        let verifier = service("secret-b");
        let now = at(1_700_000_000);

        let token = issuer.issue(Uuid::new_v4(), now).unwrap();
        assert_eq!(
            verifier.validate(&token, now),
            Err(AuthError::InvalidToken)
        );
    }
}
