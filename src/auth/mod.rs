//! Authentication module
//!
//! Token issuance, storage, and revocation:
//! - JWT issuance and verification (stateless signature + expiry check)
//! - Session management backed by the revocation store (stateful check)
//! - REST API endpoints for auth operations

pub mod api;
pub mod jwt;
pub mod service;

pub use api::{AuthApiState, auth_api_router};
pub use jwt::{Claims, JwtConfig, JwtError, JwtService};
pub use service::{AuthError, AuthService, LoginRequest, RegisterRequest, TokenGrant};
