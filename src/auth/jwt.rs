//! JWT utilities for token issuance and verification
//!
//! Tokens are signed with a server-wide secret using an HMAC algorithm
//! (HS256 by default). Verification distinguishes a malformed token, a bad
//! signature, and an expired token, because callers treat the three
//! differently. The expiry check applies a configurable clock-skew leeway,
//! zero by default.

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default access token lifetime (30 minutes)
const DEFAULT_LIFETIME_MINUTES: i64 = 30;

/// Signer configuration, constructed once at process start.
#[derive(Clone)]
pub struct JwtConfig {
    /// Secret key for signing tokens
    pub secret: String,
    /// Signing algorithm (HMAC family)
    pub algorithm: Algorithm,
    /// Access token lifetime in minutes
    pub lifetime_minutes: i64,
    /// Token issuer
    pub issuer: String,
    /// Clock skew tolerance applied to the expiry check, in seconds
    pub leeway_seconds: u64,
}

impl JwtConfig {
    /// Create a configuration with default algorithm, lifetime, and issuer.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            algorithm: Algorithm::HS256,
            lifetime_minutes: DEFAULT_LIFETIME_MINUTES,
            issuer: "authgate".to_string(),
            leeway_seconds: 0,
        }
    }

    /// Set the signing algorithm
    pub fn algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Set the token lifetime in minutes
    pub fn lifetime(mut self, minutes: i64) -> Self {
        self.lifetime_minutes = minutes;
        self
    }

    /// Set the issuer
    pub fn issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = issuer.into();
        self
    }

    /// Set the clock skew tolerance in seconds
    pub fn leeway(mut self, seconds: u64) -> Self {
        self.leeway_seconds = seconds;
        self
    }
}

/// Token verification and issuance errors
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("malformed token")]
    Malformed,

    #[error("invalid token signature")]
    InvalidSignature,

    #[error("token expired")]
    Expired,

    #[error("token encoding failed: {0}")]
    EncodingError(String),
}

impl From<jsonwebtoken::errors::Error> for JwtError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match err.kind() {
            ErrorKind::ExpiredSignature => JwtError::Expired,
            ErrorKind::InvalidSignature
            | ErrorKind::InvalidAlgorithm
            | ErrorKind::InvalidIssuer => JwtError::InvalidSignature,
            _ => JwtError::Malformed,
        }
    }
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the principal identity (email)
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issuer
    pub iss: String,
    /// Unique identifier for this token. Two tokens issued for the same
    /// subject within the same second still differ because of this.
    pub jti: String,
}

/// Signer: issues and verifies signed token payloads. Stateless; performs
/// no I/O.
#[derive(Clone)]
pub struct JwtService {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtService {
    /// Create a new signer from an immutable configuration.
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    /// Issue a signed token for `identity`.
    ///
    /// Returns the token and its expiry as a Unix timestamp.
    pub fn issue(&self, identity: &str) -> Result<(String, i64), JwtError> {
        let now = Utc::now();
        let exp = now + Duration::minutes(self.config.lifetime_minutes);

        let claims = Claims {
            sub: identity.to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            iss: self.config.issuer.clone(),
            jti: Uuid::new_v4().to_string(),
        };

        let token = encode(
            &Header::new(self.config.algorithm),
            &claims,
            &self.encoding_key,
        )
        .map_err(|e| JwtError::EncodingError(e.to_string()))?;

        Ok((token, exp.timestamp()))
    }

    /// Verify signature, expiry, and issuer; return the claims on success.
    pub fn verify(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(self.config.algorithm);
        validation.set_issuer(&[&self.config.issuer]);
        validation.leeway = self.config.leeway_seconds;

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation)?;

        Ok(token_data.claims)
    }

    /// Token lifetime as a duration, used as the store entry TTL.
    pub fn lifetime(&self) -> std::time::Duration {
        std::time::Duration::from_secs((self.config.lifetime_minutes.max(0) as u64) * 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_service() -> JwtService {
        JwtService::new(JwtConfig::new("test_secret_key_for_testing_only_32bytes!"))
    }

    // ========================================================================
    // JwtConfig Tests
    // ========================================================================

    #[test]
    fn test_config_defaults() {
        let config = JwtConfig::new("my_secret");

        assert_eq!(config.secret, "my_secret");
        assert!(matches!(config.algorithm, Algorithm::HS256));
        assert_eq!(config.lifetime_minutes, DEFAULT_LIFETIME_MINUTES);
        assert_eq!(config.issuer, "authgate");
        assert_eq!(config.leeway_seconds, 0);
    }

    #[test]
    fn test_config_builder() {
        let config = JwtConfig::new("secret")
            .algorithm(Algorithm::HS512)
            .lifetime(5)
            .issuer("my_app")
            .leeway(10);

        assert!(matches!(config.algorithm, Algorithm::HS512));
        assert_eq!(config.lifetime_minutes, 5);
        assert_eq!(config.issuer, "my_app");
        assert_eq!(config.leeway_seconds, 10);
    }

    // ========================================================================
    // Issue / Verify Tests
    // ========================================================================

    #[test]
    fn test_issue_then_verify() {
        let service = test_service();

        let (token, exp) = service.issue("a@x.com").unwrap();
        assert!(!token.is_empty());
        assert!(exp > Utc::now().timestamp());

        let claims = service.verify(&token).unwrap();
        assert_eq!(claims.sub, "a@x.com");
        assert_eq!(claims.iss, "authgate");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_verify_wrong_secret_fails_with_invalid_signature() {
        let service1 = JwtService::new(JwtConfig::new("secret_one"));
        let service2 = JwtService::new(JwtConfig::new("secret_two"));

        let (token, _) = service1.issue("a@x.com").unwrap();

        let result = service2.verify(&token);
        assert!(matches!(result, Err(JwtError::InvalidSignature)));
    }

    #[test]
    fn test_verify_garbage_fails_with_malformed() {
        let service = test_service();

        assert!(matches!(
            service.verify("not.a.token"),
            Err(JwtError::Malformed)
        ));
        assert!(matches!(service.verify(""), Err(JwtError::Malformed)));
    }

    #[test]
    fn test_verify_expired_token() {
        let service = JwtService::new(
            JwtConfig::new("test_secret").lifetime(-1), // already expired
        );

        let (token, _) = service.issue("a@x.com").unwrap();

        let result = service.verify(&token);
        assert!(
            matches!(result, Err(JwtError::Expired)),
            "expected Expired, got: {:?}",
            result
        );
    }

    #[test]
    fn test_leeway_tolerates_bounded_skew() {
        let secret = "test_secret";
        let strict = JwtService::new(JwtConfig::new(secret).lifetime(-1));
        let lenient = JwtService::new(JwtConfig::new(secret).lifetime(-1).leeway(120));

        let (token, _) = strict.issue("a@x.com").unwrap();

        assert!(matches!(strict.verify(&token), Err(JwtError::Expired)));
        // Expired 60 seconds ago, within a 120 second leeway
        assert!(lenient.verify(&token).is_ok());
    }

    #[test]
    fn test_issuer_mismatch_rejected() {
        let secret = "test_secret";
        let issuer_a = JwtService::new(JwtConfig::new(secret).issuer("service-a"));
        let issuer_b = JwtService::new(JwtConfig::new(secret).issuer("service-b"));

        let (token, _) = issuer_a.issue("a@x.com").unwrap();

        let result = issuer_b.verify(&token);
        assert!(matches!(result, Err(JwtError::InvalidSignature)));
    }

    #[test]
    fn test_tokens_are_unique_per_issuance() {
        let service = test_service();

        let (token1, _) = service.issue("a@x.com").unwrap();
        let (token2, _) = service.issue("a@x.com").unwrap();

        // Same subject, same second: jti still makes them distinct
        assert_ne!(token1, token2);

        let claims1 = service.verify(&token1).unwrap();
        let claims2 = service.verify(&token2).unwrap();
        assert_ne!(claims1.jti, claims2.jti);
    }

    #[test]
    fn test_algorithm_mismatch_rejected() {
        let secret = "test_secret";
        let hs256 = JwtService::new(JwtConfig::new(secret));
        let hs512 = JwtService::new(JwtConfig::new(secret).algorithm(Algorithm::HS512));

        let (token, _) = hs256.issue("a@x.com").unwrap();

        assert!(hs512.verify(&token).is_err());
    }

    #[test]
    fn test_lifetime_duration() {
        let service = JwtService::new(JwtConfig::new("secret").lifetime(30));
        assert_eq!(service.lifetime(), std::time::Duration::from_secs(1800));
    }

    // ========================================================================
    // Error Tests
    // ========================================================================

    #[test]
    fn test_jwt_error_display() {
        assert_eq!(format!("{}", JwtError::Malformed), "malformed token");
        assert_eq!(
            format!("{}", JwtError::InvalidSignature),
            "invalid token signature"
        );
        assert_eq!(format!("{}", JwtError::Expired), "token expired");
    }
}
