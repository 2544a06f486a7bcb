//! Database module
//!
//! Database connectivity, models, and repositories for persistent storage
//! using PostgreSQL and SQLx.

pub mod models;
pub mod pool;
pub mod repositories;

pub use models::{User, UserResponse};
pub use pool::{DbConfig, DbError, create_pool, create_pool_with_migrations, health_check};
pub use repositories::{UserRepository, UserRepositoryError, UserStore};

pub use sqlx::PgPool;
