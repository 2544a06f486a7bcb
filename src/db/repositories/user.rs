//! User repository for database operations
//!
//! Persists credential records (email, password hash) with secure password
//! hashing using bcrypt. The `UserStore` trait is the boundary the session
//! manager depends on; `UserRepository` is its PostgreSQL implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::models::User;

/// Cost factor for bcrypt hashing (12 is recommended for production)
const BCRYPT_COST: u32 = 12;

/// User repository error types
#[derive(Debug, thiserror::Error)]
pub enum UserRepositoryError {
    #[error("user not found")]
    NotFound,

    #[error("email already registered")]
    EmailAlreadyExists,

    #[error("password hashing failed: {0}")]
    HashingError(String),

    #[error("database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

/// Hash a password using bcrypt with automatic salt generation
pub fn hash_password(password: &str) -> Result<String, UserRepositoryError> {
    bcrypt::hash(password, BCRYPT_COST)
        .map_err(|e| UserRepositoryError::HashingError(e.to_string()))
}

/// Verify a password against a bcrypt hash in constant time
pub fn verify_password(password: &str, hash: &str) -> Result<bool, UserRepositoryError> {
    bcrypt::verify(password, hash).map_err(|e| UserRepositoryError::HashingError(e.to_string()))
}

/// Persistence boundary for credential records.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a new credential record. `password_hash` must already be
    /// hashed. A duplicate email fails with `EmailAlreadyExists` and leaves
    /// no partial record.
    async fn insert(&self, email: &str, password_hash: &str) -> Result<User, UserRepositoryError>;

    /// Find a user by email
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserRepositoryError>;

    /// Find a user by ID
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, UserRepositoryError>;
}

/// PostgreSQL-backed user store
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for UserRepository {
    async fn insert(&self, email: &str, password_hash: &str) -> Result<User, UserRepositoryError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, password_hash)
            VALUES ($1, $2)
            RETURNING id, email, password_hash, created_at, updated_at
            "#,
        )
        .bind(email)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            // A racing duplicate slips past the service's pre-check; the
            // unique constraint still reports it as a duplicate, not as a
            // generic persistence failure.
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return UserRepositoryError::EmailAlreadyExists;
                }
            }
            UserRepositoryError::DatabaseError(e)
        })?;

        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserRepositoryError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, UserRepositoryError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }
}
