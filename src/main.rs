use std::sync::Arc;
use std::time::Duration;

use tower_http::trace::TraceLayer;

use authgate::auth::{AuthApiState, AuthService, JwtConfig, JwtService, auth_api_router};
use authgate::config::Config;
use authgate::db::pool::{DbConfig, create_pool_with_migrations};
use authgate::db::repositories::UserRepository;
use authgate::store::RedisSessionStore;

#[tokio::main]
async fn main() {
    // Load .env file (if exists)
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load and validate application config; configuration problems are
    // startup failures, not runtime surprises
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    // Connect to PostgreSQL and run migrations
    let pool = match create_pool_with_migrations(&DbConfig::from_url(&config.database_url)).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("database setup failed: {}", e);
            std::process::exit(1);
        }
    };

    // Connect the Redis-backed session store
    let store_timeout = Duration::from_secs(config.store_timeout_secs);
    let sessions = match RedisSessionStore::connect(&config.redis_url(), store_timeout).await {
        Ok(store) => store,
        Err(e) => {
            tracing::error!("session store setup failed: {}", e);
            std::process::exit(1);
        }
    };

    // Signing configuration is built once here and never mutated afterwards
    let jwt_service = JwtService::new(
        JwtConfig::new(config.secret_key.as_str())
            .algorithm(config.jwt_algorithm)
            .lifetime(config.access_token_expire_minutes)
            .issuer(config.jwt_issuer.as_str())
            .leeway(config.jwt_leeway_seconds),
    );

    let auth_service = AuthService::new(
        Arc::new(UserRepository::new(pool.clone())),
        Arc::new(sessions),
        jwt_service,
    );

    let app = auth_api_router(AuthApiState { auth_service, pool })
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .expect("failed to bind listen address");
    tracing::info!("listening on http://{}", config.listen_addr);

    axum::serve(listener, app.into_make_service())
        .await
        .expect("server error");
}
