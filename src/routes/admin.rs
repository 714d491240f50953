use crate::{AppState, handlers};
use axum::{Router, routing::post};

/// Admin Router Module
///
/// Defines the routes exclusively accessible to users with the admin role.
///
/// Access Control:
/// This entire router is wrapped in the authentication middleware, so every
/// request arrives with a resolved `AuthUser`. The admin role requirement
/// itself is enforced by the catalog's authorization guard when the handler
/// runs, keeping the rule in one place.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // POST /admin/pois
        // Registers a new point of interest. The sensitive fields (name,
        // location) are encrypted before they reach the record store; the
        // caller becomes the record's owner.
        .route("/pois", post(handlers::create_poi))
}
