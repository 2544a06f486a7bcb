//! Database repositories
//!
//! Repositories encapsulate data access and expose the boundary traits the
//! business logic depends on.

pub mod user;

pub use user::{UserRepository, UserRepositoryError, UserStore};
