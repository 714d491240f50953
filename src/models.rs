use crate::auth::Role;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Core Application Schemas (Mapped to Database) ---

/// User
///
/// The canonical identity record stored in the `users` table. The password
/// hash never leaves the persistence and login paths; API responses use
/// [`UserProfile`] instead.
#[derive(Debug, Clone, FromRow, Default)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    // Stored as text so ten-digit numbers keep their leading zeros.
    pub phone: String,
    pub password_hash: String,
    // The RBAC field, a closed enumeration rather than a free-form string.
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Poi
///
/// A point-of-interest record as persisted. `name_encrypted` and
/// `location_encrypted` are opaque ciphertext strings produced by the codec;
/// the plaintext name and `"lat,lng"` location are never stored.
#[derive(Debug, Clone, FromRow, Default)]
pub struct Poi {
    pub id: Uuid,
    pub name_encrypted: String,
    pub location_encrypted: String,
    pub category: String,
    // Creating user, immutable; the basis for ownership checks on delete.
    pub uploaded_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// NewPoi
///
/// The already-encrypted payload handed to the repository by the catalog's
/// create operation. Keeps the encrypt step on the caller's side of the
/// store boundary.
#[derive(Debug, Clone)]
pub struct NewPoi {
    pub name_encrypted: String,
    pub location_encrypted: String,
    pub category: String,
    pub uploaded_by: Uuid,
}

// --- Request Payloads (Input Schemas) ---

/// RegisterRequest
///
/// Input payload for the public registration endpoint (POST /register).
/// The password is hashed before storage and never persisted or logged in
/// clear text.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: String,
    /// Optional role override, restricted to the closed role set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

/// LoginRequest
///
/// Input payload for POST /login. The identifier may be an email address or
/// a ten-digit phone number.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct LoginRequest {
    pub email_or_phone: String,
    pub password: String,
}

/// UpdateUserRequest
///
/// Partial update payload for the authenticated profile (PUT /me). Only
/// provided fields are touched.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateUserRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// CreatePoiRequest
///
/// Input payload for registering a new POI (POST /admin/pois). `location` is
/// the `"lat,lng"` text form and is validated before encryption.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreatePoiRequest {
    pub name: String,
    #[schema(example = "18.9220,72.8347")]
    pub location: String,
    #[schema(example = "monument")]
    pub category: String,
}

// --- Response Schemas (Output) ---

/// AuthResponse
///
/// Output of both register and login: a signed bearer token for subsequent
/// requests.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct AuthResponse {
    pub success: bool,
    pub message: String,
    pub token: String,
}

/// UserProfile
///
/// Output schema for the authenticated user's profile (GET /me). Mirrors
/// [`User`] minus the password hash.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UserProfile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub role: Role,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            phone: user.phone,
            role: user.role,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// CreatePoiResponse
///
/// Acknowledgment returned by the admin create endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreatePoiResponse {
    pub success: bool,
    pub message: String,
    pub poi_id: Uuid,
}

/// PoiSearchResult
///
/// Full decrypted projection returned by keyword search. `distance` is
/// present (two decimal places, kilometers) only when the caller supplied a
/// center coordinate; it serializes as `null` otherwise.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct PoiSearchResult {
    pub id: Uuid,
    pub name: String,
    pub location: String,
    pub category: String,
    pub uploaded_by: Uuid,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
    pub distance: Option<f64>,
}

/// OwnedPoi
///
/// Decrypted projection for the caller's own records (GET /me/pois).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct OwnedPoi {
    pub id: Uuid,
    pub name: String,
    pub location: String,
    pub category: String,
}

/// NearbyPoi
///
/// Decrypted projection for radius search hits. `distance` is kilometers
/// from the supplied center, rounded to two decimal places.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct NearbyPoi {
    pub id: Uuid,
    pub name: String,
    pub location: String,
    pub category: String,
    pub distance: f64,
}
