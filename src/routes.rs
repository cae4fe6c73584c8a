//! Route definitions for the auth API

use axum::routing::{get, post};
use axum::Router;

use crate::app_state::AppState;
use crate::handlers::*;

// Registration and login routes
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/api/registration", post(registration))
        .route("/api/auth", post(authentication))
}

// Token check routes
pub fn token_routes() -> Router<AppState> {
    Router::new().route("/api/check_token", post(check_token))
}

// Probe routes
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/api/healthz/ready", get(healthz_ready))
}

// Photo verification routes
pub fn verify_routes() -> Router<AppState> {
    Router::new().route("/api/verify", post(verify))
}

/// Assemble the full application router. Used by `main` and by the
/// integration tests.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(auth_routes())
        .merge(token_routes())
        .merge(health_routes())
        .merge(verify_routes())
        .with_state(state)
}
