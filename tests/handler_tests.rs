use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use poi_atlas::{
    AppState, CryptoCodec, PoiCatalog,
    auth::{AuthUser, Role},
    config::AppConfig,
    error::ApiError,
    handlers::{self, NearbyQuery, SearchQuery},
    models::{CreatePoiRequest, LoginRequest, RegisterRequest, UpdateUserRequest},
    repository::{InMemoryRepository, RepositoryState},
};
use std::sync::Arc;
use tokio::test;
use uuid::Uuid;

// --- TEST UTILITIES ---

const TEST_ADMIN_ID: Uuid = Uuid::from_u128(456);
const TEST_USER_ID: Uuid = Uuid::from_u128(123);

// Creates an AppState over the in-memory repository and the default config.
fn create_test_state() -> AppState {
    let repo = Arc::new(InMemoryRepository::new());
    let config = AppConfig::default();
    let codec = Arc::new(
        CryptoCodec::from_base64_key(&config.encryption_key)
            .expect("default config carries a valid key"),
    );
    let catalog = PoiCatalog::new(repo.clone() as RepositoryState, codec);
    AppState {
        repo,
        catalog,
        config,
    }
}

fn admin_user() -> AuthUser {
    AuthUser {
        id: TEST_ADMIN_ID,
        role: Role::Admin,
    }
}

fn student_user() -> AuthUser {
    AuthUser {
        id: TEST_USER_ID,
        role: Role::User,
    }
}

fn register_payload(email: &str, phone: &str) -> RegisterRequest {
    RegisterRequest {
        name: "Asha Traveller".to_string(),
        email: email.to_string(),
        password: "correct-horse-battery".to_string(),
        phone: phone.to_string(),
        role: None,
    }
}

// --- IDENTITY HANDLER TESTS ---

#[test]
async fn test_register_and_login_roundtrip() {
    let state = create_test_state();

    let Json(registered) = handlers::register_user(
        State(state.clone()),
        Json(register_payload("asha@example.com", "0123456789")),
    )
    .await
    .unwrap();
    assert!(registered.success);
    assert!(!registered.token.is_empty());

    let Json(logged_in) = handlers::login_user(
        State(state),
        Json(LoginRequest {
            email_or_phone: "asha@example.com".to_string(),
            password: "correct-horse-battery".to_string(),
        }),
    )
    .await
    .unwrap();
    assert!(logged_in.success);
    assert!(!logged_in.token.is_empty());
}

#[test]
async fn test_register_rejects_duplicate_email() {
    let state = create_test_state();

    handlers::register_user(
        State(state.clone()),
        Json(register_payload("asha@example.com", "0123456789")),
    )
    .await
    .unwrap();

    let err = handlers::register_user(
        State(state),
        Json(register_payload("asha@example.com", "9876543210")),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));
}

#[test]
async fn test_register_validates_fields() {
    let state = create_test_state();

    // Name too short.
    let mut bad = register_payload("asha@example.com", "0123456789");
    bad.name = "Al".to_string();
    let err = handlers::register_user(State(state.clone()), Json(bad))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));

    // Phone not ten digits.
    let err = handlers::register_user(
        State(state.clone()),
        Json(register_payload("asha@example.com", "12345")),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));

    // Email without a domain.
    let err = handlers::register_user(
        State(state),
        Json(register_payload("not-an-email", "0123456789")),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));
}

#[test]
async fn test_login_rejects_wrong_password() {
    let state = create_test_state();

    handlers::register_user(
        State(state.clone()),
        Json(register_payload("asha@example.com", "0123456789")),
    )
    .await
    .unwrap();

    let err = handlers::login_user(
        State(state),
        Json(LoginRequest {
            email_or_phone: "asha@example.com".to_string(),
            password: "wrong-password-entirely".to_string(),
        }),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));
}

#[test]
async fn test_login_accepts_phone_identifier() {
    let state = create_test_state();

    handlers::register_user(
        State(state.clone()),
        Json(register_payload("asha@example.com", "0123456789")),
    )
    .await
    .unwrap();

    let result = handlers::login_user(
        State(state),
        Json(LoginRequest {
            email_or_phone: "0123456789".to_string(),
            password: "correct-horse-battery".to_string(),
        }),
    )
    .await;
    assert!(result.is_ok());
}

#[test]
async fn test_get_me_when_user_is_gone() {
    let state = create_test_state();

    // A valid token for a user the store no longer has.
    let err = handlers::get_me(student_user(), State(state))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}

#[test]
async fn test_update_me_validates_phone() {
    let state = create_test_state();

    let err = handlers::update_me(
        student_user(),
        State(state),
        Json(UpdateUserRequest {
            phone: Some("123".to_string()),
            ..UpdateUserRequest::default()
        }),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));
}

// --- POI HANDLER TESTS ---

fn gateway_payload() -> CreatePoiRequest {
    CreatePoiRequest {
        name: "Gateway of India".to_string(),
        location: "18.9220,72.8347".to_string(),
        category: "monument".to_string(),
    }
}

#[test]
async fn test_create_poi_forbidden_for_plain_users() {
    let state = create_test_state();

    let err = handlers::create_poi(student_user(), State(state), Json(gateway_payload()))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Forbidden(_)));
}

#[test]
async fn test_create_poi_success_returns_201() {
    let state = create_test_state();

    let (status, Json(body)) =
        handlers::create_poi(admin_user(), State(state), Json(gateway_payload()))
            .await
            .unwrap();
    assert_eq!(status, StatusCode::CREATED);
    assert!(body.success);
}

#[test]
async fn test_search_requires_keyword() {
    let state = create_test_state();

    let err = handlers::search_pois(
        student_user(),
        State(state),
        Query(SearchQuery {
            keyword: None,
            lat: None,
            lng: None,
        }),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));
}

#[test]
async fn test_search_finds_created_poi() {
    let state = create_test_state();
    handlers::create_poi(admin_user(), State(state.clone()), Json(gateway_payload()))
        .await
        .unwrap();

    let Json(results) = handlers::search_pois(
        student_user(),
        State(state),
        Query(SearchQuery {
            keyword: Some("gateway".to_string()),
            lat: None,
            lng: None,
        }),
    )
    .await
    .unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].name, "Gateway of India");
    assert_eq!(results[0].distance, None);
}

#[test]
async fn test_delete_poi_owner_gets_204() {
    let state = create_test_state();
    let (_, Json(created)) =
        handlers::create_poi(admin_user(), State(state.clone()), Json(gateway_payload()))
            .await
            .unwrap();

    let status = handlers::delete_poi(admin_user(), State(state), Path(created.poi_id))
        .await
        .unwrap();
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[test]
async fn test_delete_poi_not_found() {
    let state = create_test_state();

    let err = handlers::delete_poi(admin_user(), State(state), Path(Uuid::new_v4()))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}

#[test]
async fn test_nearby_returns_poi_inside_radius() {
    let state = create_test_state();
    handlers::create_poi(admin_user(), State(state.clone()), Json(gateway_payload()))
        .await
        .unwrap();

    let Json(results) = handlers::nearby_pois(
        student_user(),
        State(state),
        Query(NearbyQuery {
            lat: Some(18.92),
            lng: Some(72.83),
            radius: Some(5.0),
        }),
    )
    .await
    .unwrap();

    assert_eq!(results.len(), 1);
    assert!(results[0].distance <= 5.0);
}

#[test]
async fn test_nearby_requires_all_parameters() {
    let state = create_test_state();

    let err = handlers::nearby_pois(
        student_user(),
        State(state),
        Query(NearbyQuery {
            lat: Some(18.92),
            lng: None,
            radius: Some(5.0),
        }),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));
}
