use crate::{AppState, handlers};
use axum::{Router, routing::{get, post}};

/// Public Router Module
///
/// Defines endpoints that are **unauthenticated** and accessible to any
/// client. Only the identity gateway lives here: every POI operation,
/// including read-only search, requires an authenticated caller.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // A simple, unauthenticated endpoint used for monitoring and load balancer checks.
        // Returns "ok" immediately to verify the service is running and responsive.
        .route("/health", get(|| async { "ok" }))
        // POST /register
        // Creates a user account and returns the first bearer token.
        .route("/register", post(handlers::register_user))
        // POST /login
        // Exchanges credentials (email or phone plus password) for a fresh token.
        .route("/login", post(handlers::login_user))
}
