//! Authentication service
//!
//! Business logic for user registration, login, logout, and token
//! validation. Login issues a signed token and records it in the session
//! store as the single live session for that user; validation combines the
//! stateless signature check with the stateful store check, and both must
//! pass.

use std::sync::Arc;

use crate::auth::jwt::{JwtError, JwtService};
use crate::db::models::UserResponse;
use crate::db::repositories::user::{self, UserRepositoryError, UserStore};
use crate::store::{SessionStore, StoreError};

/// Authentication error taxonomy. Every rejection path maps to a distinct
/// variant so callers can tell them apart.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("email already registered")]
    DuplicateEmail,

    #[error("invalid email format")]
    InvalidEmail,

    #[error("password too short (minimum 8 characters)")]
    PasswordTooShort,

    #[error("password too weak")]
    PasswordTooWeak,

    #[error("user not found")]
    UserNotFound,

    #[error("malformed token")]
    Malformed,

    #[error("invalid token signature")]
    InvalidSignature,

    #[error("token expired")]
    Expired,

    #[error("token revoked")]
    Revoked,

    #[error("token superseded by a newer session")]
    Superseded,

    #[error("session store unavailable")]
    StoreUnavailable,

    #[error("session store timed out")]
    StoreTimeout,

    #[error("persistence failure: {0}")]
    PersistenceFailure(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<JwtError> for AuthError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired => AuthError::Expired,
            JwtError::InvalidSignature => AuthError::InvalidSignature,
            JwtError::Malformed => AuthError::Malformed,
            JwtError::EncodingError(e) => AuthError::Internal(e),
        }
    }
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        // An unreachable store is an infrastructure failure, not a revoked
        // session.
        match err {
            StoreError::Unavailable(_) => AuthError::StoreUnavailable,
            StoreError::Timeout => AuthError::StoreTimeout,
        }
    }
}

impl From<UserRepositoryError> for AuthError {
    fn from(err: UserRepositoryError) -> Self {
        match err {
            UserRepositoryError::NotFound => AuthError::UserNotFound,
            UserRepositoryError::EmailAlreadyExists => AuthError::DuplicateEmail,
            UserRepositoryError::HashingError(e) => AuthError::Internal(e),
            UserRepositoryError::DatabaseError(e) => AuthError::PersistenceFailure(e.to_string()),
        }
    }
}

/// Registration request data
#[derive(Debug, Clone, serde::Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
}

/// Login request data
#[derive(Debug, Clone, serde::Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Issued token response
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct TokenGrant {
    pub access_token: String,
    pub token_type: String,
}

impl TokenGrant {
    fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: "bearer".to_string(),
        }
    }
}

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    sessions: Arc<dyn SessionStore>,
    jwt: JwtService,
}

impl AuthService {
    /// Create a new authentication service
    pub fn new(
        users: Arc<dyn UserStore>,
        sessions: Arc<dyn SessionStore>,
        jwt: JwtService,
    ) -> Self {
        Self {
            users,
            sessions,
            jwt,
        }
    }

    /// Validate email format
    fn validate_email(email: &str) -> Result<(), AuthError> {
        let parts: Vec<&str> = email.split('@').collect();
        if parts.len() != 2 {
            return Err(AuthError::InvalidEmail);
        }

        let (local, domain) = (parts[0], parts[1]);
        if local.is_empty() || domain.is_empty() || !domain.contains('.') {
            return Err(AuthError::InvalidEmail);
        }

        if domain.split('.').any(|p| p.is_empty()) {
            return Err(AuthError::InvalidEmail);
        }

        Ok(())
    }

    /// Validate password strength
    fn validate_password(password: &str) -> Result<(), AuthError> {
        if password.len() < 8 {
            return Err(AuthError::PasswordTooShort);
        }

        let has_letter = password.chars().any(|c| c.is_alphabetic());
        let has_digit = password.chars().any(|c| c.is_ascii_digit());
        if !has_letter || !has_digit {
            return Err(AuthError::PasswordTooWeak);
        }

        Ok(())
    }

    /// Register a new user
    pub async fn register(&self, request: RegisterRequest) -> Result<UserResponse, AuthError> {
        Self::validate_email(&request.email)?;
        Self::validate_password(&request.password)?;

        if self.users.find_by_email(&request.email).await?.is_some() {
            return Err(AuthError::DuplicateEmail);
        }

        let password_hash = user::hash_password(&request.password)?;
        let created = self.users.insert(&request.email, &password_hash).await?;

        tracing::info!("user registered: {}", created.email);

        Ok(created.into())
    }

    /// Login an existing user and issue an access token
    pub async fn login(&self, request: LoginRequest) -> Result<TokenGrant, AuthError> {
        let user = self
            .users
            .find_by_email(&request.email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let password_ok = user::verify_password(&request.password, &user.password_hash)
            .map_err(|e| AuthError::Internal(e.to_string()))?;
        if !password_ok {
            tracing::info!("failed login attempt for {}", request.email);
            return Err(AuthError::InvalidCredentials);
        }

        self.start_session(&user.email).await
    }

    /// Issue a token and record it as the single live session for
    /// `identity`, replacing (and thereby superseding) any previous one.
    pub async fn start_session(&self, identity: &str) -> Result<TokenGrant, AuthError> {
        let (token, _expires_at) = self.jwt.issue(identity)?;
        self.sessions
            .put(identity, &token, self.jwt.lifetime())
            .await?;

        tracing::info!("session started for {}", identity);

        Ok(TokenGrant::bearer(token))
    }

    /// End the session for `identity`, invalidating its token immediately.
    ///
    /// Returns whether a session existed; logging out with no live session
    /// is a no-op, not an error.
    pub async fn logout(&self, identity: &str) -> Result<bool, AuthError> {
        let removed = self.sessions.delete(identity).await?;
        if removed {
            tracing::info!("session revoked for {}", identity);
        }
        Ok(removed)
    }

    /// Validate a presented token and resolve it to its identity.
    ///
    /// Signature expiry and store liveness are independent checks and both
    /// must pass: an expired signature is rejected even if the store entry
    /// is still present, and a token whose signature is still valid is
    /// rejected once the store entry is gone (`Revoked`) or holds a newer
    /// token (`Superseded`).
    pub async fn validate(&self, presented: &str) -> Result<String, AuthError> {
        let claims = self.jwt.verify(presented)?;

        match self.sessions.get(&claims.sub).await? {
            None => Err(AuthError::Revoked),
            Some(stored) if stored != presented => Err(AuthError::Superseded),
            Some(_) => Ok(claims.sub),
        }
    }

    /// Resolve a presented token to its user record.
    pub async fn current_user(&self, presented: &str) -> Result<UserResponse, AuthError> {
        let identity = self.validate(presented).await?;

        let user = self
            .users
            .find_by_email(&identity)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        Ok(user.into())
    }
}
