use crate::{
    AppState,
    auth::{AuthUser, issue_token},
    error::ApiError,
    models::{
        AuthResponse, CreatePoiRequest, CreatePoiResponse, LoginRequest, NearbyPoi, OwnedPoi,
        PoiSearchResult, RegisterRequest, UpdateUserRequest, User, UserProfile,
    },
};
use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use uuid::Uuid;

// --- Filter Structs ---

/// SearchQuery
///
/// Accepted query parameters for keyword search (GET /pois/search). All
/// fields are optional at the HTTP layer; the catalog owns the validation so
/// a missing keyword reports the same error shape as an empty one.
#[derive(Deserialize, utoipa::IntoParams)]
pub struct SearchQuery {
    /// Case-insensitive substring to match against decrypted POI names.
    pub keyword: Option<String>,
    /// Optional center latitude; requires `lng`.
    pub lat: Option<f64>,
    /// Optional center longitude; requires `lat`.
    pub lng: Option<f64>,
}

/// NearbyQuery
///
/// Accepted query parameters for radius search (GET /pois/nearby).
#[derive(Deserialize, utoipa::IntoParams)]
pub struct NearbyQuery {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    /// Radius in kilometers, positive. The boundary is inclusive.
    pub radius: Option<f64>,
}

// --- Field validation helpers (registration / profile update) ---

fn looks_like_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

fn is_ten_digit_phone(value: &str) -> bool {
    value.len() == 10 && value.chars().all(|c| c.is_ascii_digit())
}

// --- Identity Handlers ---

/// register_user
///
/// [Public Route] Creates a user account and returns a signed bearer token.
/// The password is hashed with Argon2id before storage; the clear text is
/// never persisted or logged.
#[utoipa::path(
    post,
    path = "/register",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Registered", body = AuthResponse),
        (status = 400, description = "Invalid fields or duplicate email", body = crate::error::ErrorBody)
    )
)]
pub async fn register_user(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    if payload.name.trim().len() < 3 {
        return Err(ApiError::validation("Enter a valid user name."));
    }
    if !looks_like_email(&payload.email) {
        return Err(ApiError::validation("Enter a valid user email."));
    }
    if payload.password.len() < 8 {
        return Err(ApiError::validation("Enter a valid strong password."));
    }
    if !is_ten_digit_phone(&payload.phone) {
        return Err(ApiError::validation("Phone number must be 10 digits long."));
    }

    if state.repo.get_user_by_email(&payload.email).await?.is_some() {
        return Err(ApiError::validation(
            "Sorry, a user with this email already exists",
        ));
    }

    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(payload.password.as_bytes(), &salt)
        .map_err(|e| {
            tracing::error!("password hashing failed: {e}");
            ApiError::StoreUnavailable
        })?
        .to_string();

    let user = state
        .repo
        .create_user(User {
            id: Uuid::new_v4(),
            name: payload.name,
            email: payload.email,
            phone: payload.phone,
            password_hash,
            role: payload.role.unwrap_or_default(),
            ..User::default()
        })
        .await?;

    let token = issue_token(&state.config.jwt_secret, user.id, user.role);
    Ok(Json(AuthResponse {
        success: true,
        message: "User successfully added to the database.".to_string(),
        token,
    }))
}

/// login_user
///
/// [Public Route] Exchanges an email-or-phone identifier plus password for a
/// fresh bearer token. Unknown identifiers and wrong passwords produce the
/// same response, so the endpoint does not leak which accounts exist.
#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = AuthResponse),
        (status = 400, description = "Invalid credentials", body = crate::error::ErrorBody)
    )
)]
pub async fn login_user(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let identifier = payload.email_or_phone.trim();

    let user = if identifier.contains('@') {
        if !looks_like_email(identifier) {
            return Err(ApiError::validation("Enter a valid login option."));
        }
        state.repo.get_user_by_email(identifier).await?
    } else {
        if !is_ten_digit_phone(identifier) {
            return Err(ApiError::validation("Enter a valid login option."));
        }
        state.repo.get_user_by_phone(identifier).await?
    };

    let user = user.ok_or_else(|| ApiError::validation("Login with correct credentials."))?;

    let parsed_hash = PasswordHash::new(&user.password_hash).map_err(|e| {
        tracing::error!(user_id = %user.id, "stored password hash unreadable: {e}");
        ApiError::StoreUnavailable
    })?;
    if Argon2::default()
        .verify_password(payload.password.as_bytes(), &parsed_hash)
        .is_err()
    {
        return Err(ApiError::validation("Login with correct credentials."));
    }

    let token = issue_token(&state.config.jwt_secret, user.id, user.role);
    Ok(Json(AuthResponse {
        success: true,
        message: "Login successful.".to_string(),
        token,
    }))
}

/// get_me
///
/// [Authenticated Route] The authenticated user's profile. The password hash
/// never appears in the projection.
#[utoipa::path(
    get,
    path = "/me",
    responses(
        (status = 200, description = "Profile", body = UserProfile),
        (status = 404, description = "User no longer exists", body = crate::error::ErrorBody)
    )
)]
pub async fn get_me(
    AuthUser { id, .. }: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<UserProfile>, ApiError> {
    let user = state
        .repo
        .get_user(id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    Ok(Json(user.into()))
}

/// update_me
///
/// [Authenticated Route] Partial update of the caller's profile. Only the
/// provided fields are validated and written.
#[utoipa::path(
    put,
    path = "/me",
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Updated", body = UserProfile),
        (status = 404, description = "User no longer exists", body = crate::error::ErrorBody)
    )
)]
pub async fn update_me(
    AuthUser { id, .. }: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<UserProfile>, ApiError> {
    if let Some(name) = &payload.name {
        if name.trim().len() < 3 {
            return Err(ApiError::validation("Name must be at least 3 characters."));
        }
    }
    if let Some(email) = &payload.email {
        if !looks_like_email(email) {
            return Err(ApiError::validation("Invalid email format."));
        }
    }
    if let Some(phone) = &payload.phone {
        if !is_ten_digit_phone(phone) {
            return Err(ApiError::validation(
                "Phone number must be exactly 10 digits.",
            ));
        }
    }

    let user = state
        .repo
        .update_user(id, payload)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    Ok(Json(user.into()))
}

// --- POI Catalog Handlers ---

/// create_poi
///
/// [Admin Route] Registers a new POI. The caller's admin role is enforced by
/// the catalog's authorization guard; the caller becomes the record's owner.
#[utoipa::path(
    post,
    path = "/admin/pois",
    request_body = CreatePoiRequest,
    responses(
        (status = 201, description = "POI registered", body = CreatePoiResponse),
        (status = 400, description = "Missing fields or bad location", body = crate::error::ErrorBody),
        (status = 403, description = "Caller is not an admin", body = crate::error::ErrorBody)
    )
)]
pub async fn create_poi(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreatePoiRequest>,
) -> Result<(StatusCode, Json<CreatePoiResponse>), ApiError> {
    let response = state.catalog.create(&auth, payload).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// search_pois
///
/// [Authenticated Route] Keyword search over decrypted POI names, with an
/// optional center for distance annotation.
#[utoipa::path(
    get,
    path = "/pois/search",
    params(SearchQuery),
    responses(
        (status = 200, description = "Matches", body = [PoiSearchResult]),
        (status = 400, description = "Missing keyword or half a center", body = crate::error::ErrorBody)
    )
)]
pub async fn search_pois(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<PoiSearchResult>>, ApiError> {
    let results = state
        .catalog
        .search_by_keyword(
            &auth,
            query.keyword.as_deref().unwrap_or(""),
            query.lat,
            query.lng,
        )
        .await?;
    Ok(Json(results))
}

/// get_my_pois
///
/// [Authenticated Route] Lists every POI the caller uploaded, decrypted.
#[utoipa::path(
    get,
    path = "/me/pois",
    responses((status = 200, description = "My POIs", body = [OwnedPoi]))
)]
pub async fn get_my_pois(
    auth: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<OwnedPoi>>, ApiError> {
    Ok(Json(state.catalog.list_own(&auth).await?))
}

/// delete_poi
///
/// [Authenticated Route] Removes a POI. The catalog allows only the record's
/// owner or an admin; anyone else receives 403.
#[utoipa::path(
    delete,
    path = "/pois/{id}",
    params(("id" = Uuid, Path, description = "POI ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Not owner or admin", body = crate::error::ErrorBody),
        (status = 404, description = "Not Found", body = crate::error::ErrorBody)
    )
)]
pub async fn delete_poi(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.catalog.delete(&auth, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// nearby_pois
///
/// [Authenticated Route] All POIs within `radius` kilometers of the center,
/// boundary inclusive, distances rounded to two decimals.
#[utoipa::path(
    get,
    path = "/pois/nearby",
    params(NearbyQuery),
    responses(
        (status = 200, description = "POIs inside the radius", body = [NearbyPoi]),
        (status = 400, description = "Missing or non-positive parameters", body = crate::error::ErrorBody)
    )
)]
pub async fn nearby_pois(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<NearbyQuery>,
) -> Result<Json<Vec<NearbyPoi>>, ApiError> {
    let results = state
        .catalog
        .nearby(&auth, query.lat, query.lng, query.radius)
        .await?;
    Ok(Json(results))
}
