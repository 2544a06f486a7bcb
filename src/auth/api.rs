//! Auth API endpoints
//!
//! REST API endpoints for authentication:
//! - POST /register  - Register a new user
//! - POST /token     - Login and get an access token
//! - POST /logout    - End the session for an identity
//! - GET  /protected - Identity-scoped payload, requires a live token
//! - GET  /me        - Current user info, requires a live token
//! - GET  /health    - Database connectivity check

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::auth::{AuthError, AuthService, LoginRequest, RegisterRequest, TokenGrant};
use crate::db::models::UserResponse;
use crate::db::pool::health_check;
use sqlx::PgPool;

/// Auth API state
#[derive(Clone)]
pub struct AuthApiState {
    pub auth_service: AuthService,
    pub pool: PgPool,
}

/// API error response
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: String,
    pub code: String,
}

impl ApiError {
    pub fn new(error: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: code.into(),
        }
    }
}

/// Convert AuthError to an API response with a machine-readable code
impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            AuthError::InvalidCredentials => (StatusCode::BAD_REQUEST, "INVALID_CREDENTIALS"),
            AuthError::DuplicateEmail => (StatusCode::CONFLICT, "DUPLICATE_EMAIL"),
            AuthError::InvalidEmail => (StatusCode::BAD_REQUEST, "INVALID_EMAIL"),
            AuthError::PasswordTooShort => (StatusCode::BAD_REQUEST, "PASSWORD_TOO_SHORT"),
            AuthError::PasswordTooWeak => (StatusCode::BAD_REQUEST, "PASSWORD_TOO_WEAK"),
            AuthError::UserNotFound => (StatusCode::NOT_FOUND, "USER_NOT_FOUND"),
            AuthError::Malformed => (StatusCode::UNAUTHORIZED, "TOKEN_MALFORMED"),
            AuthError::InvalidSignature => (StatusCode::UNAUTHORIZED, "INVALID_SIGNATURE"),
            AuthError::Expired => (StatusCode::UNAUTHORIZED, "TOKEN_EXPIRED"),
            AuthError::Revoked => (StatusCode::UNAUTHORIZED, "TOKEN_REVOKED"),
            AuthError::Superseded => (StatusCode::UNAUTHORIZED, "TOKEN_SUPERSEDED"),
            AuthError::StoreUnavailable => {
                (StatusCode::SERVICE_UNAVAILABLE, "STORE_UNAVAILABLE")
            }
            AuthError::StoreTimeout => (StatusCode::SERVICE_UNAVAILABLE, "STORE_TIMEOUT"),
            AuthError::PersistenceFailure(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "PERSISTENCE_FAILURE")
            }
            AuthError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        // An unreachable session store must never be reported as a revoked
        // session; it is an infrastructure failure and is logged as such.
        match &self {
            AuthError::StoreUnavailable | AuthError::StoreTimeout => {
                tracing::error!("session store failure: {}", self);
            }
            AuthError::PersistenceFailure(e) => {
                tracing::error!("persistence failure: {}", e);
            }
            _ => {}
        }

        let body = ApiError::new(self.to_string(), code);

        (status, Json(body)).into_response()
    }
}

/// Request to end a session
#[derive(Debug, Deserialize)]
pub struct LogoutRequest {
    pub email: String,
}

/// Response for logout
#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub message: String,
}

/// Identity-scoped payload for the protected route
#[derive(Debug, Serialize)]
pub struct ProtectedResponse {
    pub message: String,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
}

/// Create the auth API router
pub fn auth_api_router(state: AuthApiState) -> Router {
    let state = Arc::new(state);

    Router::new()
        .route("/register", post(register_handler))
        .route("/token", post(token_handler))
        .route("/logout", post(logout_handler))
        .route("/protected", get(protected_handler))
        .route("/me", get(me_handler))
        .route("/health", get(health_handler))
        .with_state(state)
}

/// POST /register
/// Register a new user
async fn register_handler(
    State(state): State<Arc<AuthApiState>>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserResponse>), AuthError> {
    tracing::info!("registration attempt for {}", request.email);

    let user = state.auth_service.register(request).await?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// POST /token
/// Login and get an access token
async fn token_handler(
    State(state): State<Arc<AuthApiState>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<TokenGrant>, AuthError> {
    tracing::info!("login attempt for {}", request.email);

    let grant = state.auth_service.login(request).await?;

    Ok(Json(grant))
}

/// POST /logout
/// End the session for an identity. Idempotent: always succeeds, whether or
/// not a session existed.
async fn logout_handler(
    State(state): State<Arc<AuthApiState>>,
    Json(request): Json<LogoutRequest>,
) -> Result<Json<LogoutResponse>, AuthError> {
    state.auth_service.logout(&request.email).await?;

    Ok(Json(LogoutResponse {
        message: "logged out successfully".to_string(),
    }))
}

/// GET /protected
/// Identity-scoped payload, only reachable with a live token
async fn protected_handler(
    State(state): State<Arc<AuthApiState>>,
    headers: HeaderMap,
) -> Result<Json<ProtectedResponse>, AuthError> {
    let token = extract_bearer_token(&headers)?;

    let identity = state.auth_service.validate(&token).await?;

    Ok(Json(ProtectedResponse {
        message: format!("Hello, {}! Your token is valid.", identity),
    }))
}

/// GET /me
/// Current user info from the presented token
async fn me_handler(
    State(state): State<Arc<AuthApiState>>,
    headers: HeaderMap,
) -> Result<Json<UserResponse>, AuthError> {
    let token = extract_bearer_token(&headers)?;

    let user = state.auth_service.current_user(&token).await?;

    Ok(Json(user))
}

/// GET /health
/// Database connectivity check
async fn health_handler(State(state): State<Arc<AuthApiState>>) -> Response {
    match health_check(&state.pool).await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "ok".to_string(),
            }),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "unavailable".to_string(),
                }),
            )
                .into_response()
        }
    }
}

/// Extract the bearer token from the Authorization header
fn extract_bearer_token(headers: &HeaderMap) -> Result<String, AuthError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::Malformed)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(AuthError::Malformed)?;

    if token.is_empty() {
        return Err(AuthError::Malformed);
    }

    Ok(token.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    // ========================================================================
    // Bearer Token Extraction Tests
    // ========================================================================

    #[test]
    fn test_extract_bearer_token_valid() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer my_token_123"),
        );

        let token = extract_bearer_token(&headers).unwrap();
        assert_eq!(token, "my_token_123");
    }

    #[test]
    fn test_extract_bearer_token_missing_header() {
        let headers = HeaderMap::new();

        let result = extract_bearer_token(&headers);
        assert!(matches!(result, Err(AuthError::Malformed)));
    }

    #[test]
    fn test_extract_bearer_token_wrong_scheme() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Basic base64credentials"),
        );

        let result = extract_bearer_token(&headers);
        assert!(matches!(result, Err(AuthError::Malformed)));
    }

    #[test]
    fn test_extract_bearer_token_empty_token() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer "));

        let result = extract_bearer_token(&headers);
        assert!(matches!(result, Err(AuthError::Malformed)));
    }

    // ========================================================================
    // Status Mapping Tests
    // ========================================================================

    #[test]
    fn test_credential_errors_map_to_4xx() {
        assert_eq!(
            AuthError::InvalidCredentials.into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AuthError::DuplicateEmail.into_response().status(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_token_rejections_map_to_401() {
        for err in [
            AuthError::Malformed,
            AuthError::InvalidSignature,
            AuthError::Expired,
            AuthError::Revoked,
            AuthError::Superseded,
        ] {
            assert_eq!(err.into_response().status(), StatusCode::UNAUTHORIZED);
        }
    }

    #[test]
    fn test_store_failures_map_to_503_not_401() {
        assert_eq!(
            AuthError::StoreUnavailable.into_response().status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            AuthError::StoreTimeout.into_response().status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_persistence_failure_maps_to_500() {
        assert_eq!(
            AuthError::PersistenceFailure("oops".to_string())
                .into_response()
                .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    // ========================================================================
    // Serialization Tests
    // ========================================================================

    #[test]
    fn test_api_error_serialization() {
        let error = ApiError::new("token revoked", "TOKEN_REVOKED");
        let json = serde_json::to_string(&error).unwrap();

        assert!(json.contains("token revoked"));
        assert!(json.contains("TOKEN_REVOKED"));
    }

    #[test]
    fn test_logout_request_deserialization() {
        let json = r#"{"email": "a@x.com"}"#;

        let request: LogoutRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.email, "a@x.com");
    }

    #[test]
    fn test_logout_response_serialization() {
        let response = LogoutResponse {
            message: "logged out successfully".to_string(),
        };
        let json = serde_json::to_string(&response).unwrap();

        assert!(json.contains("logged out successfully"));
    }
}
