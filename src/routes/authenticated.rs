use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{delete, get},
};

/// Authenticated Router Module
///
/// Defines the routes accessible to any user who has successfully passed the
/// authentication layer: profile access plus the POI search, listing and
/// delete operations available to the standard 'user' role.
///
/// Access Control Strategy:
/// Every handler in this module relies on the `AuthUser` extractor middleware
/// being present on the router layer above this module. This guarantees that
/// all handlers receive a validated `AuthUser` struct containing the user's
/// ID and role, which the catalog's authorization guard then uses for the
/// ownership check on delete.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // GET/PUT /me
        // Retrieves or partially updates the authenticated user's profile.
        .route("/me", get(handlers::get_me).put(handlers::update_me))
        // GET /me/pois
        // Lists all POIs uploaded by the authenticated user, decrypted.
        .route("/me/pois", get(handlers::get_my_pois))
        // GET /pois/search?keyword=...&lat=...&lng=...
        // Keyword search over decrypted names; optional center attaches distances.
        .route("/pois/search", get(handlers::search_pois))
        // GET /pois/nearby?lat=...&lng=...&radius=...
        // Radius search (km, inclusive boundary) over decrypted locations.
        .route("/pois/nearby", get(handlers::nearby_pois))
        // DELETE /pois/{id}
        // Removes a POI. The catalog permits the record's owner or an admin.
        // The static /pois/search and /pois/nearby segments take precedence
        // over this capture.
        .route("/pois/{id}", delete(handlers::delete_poi))
}
