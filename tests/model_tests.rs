use poi_atlas::{
    auth::Role,
    models::{PoiSearchResult, RegisterRequest, UpdateUserRequest, UserProfile},
};

#[test]
fn test_search_result_distance_serializes_as_null_without_center() {
    let result = PoiSearchResult {
        name: "Taj Mahal".to_string(),
        distance: None,
        ..PoiSearchResult::default()
    };

    let json_output = serde_json::to_string(&result).unwrap();

    // A missing center means distance must be explicit null, not omitted.
    assert!(
        json_output.contains(r#""distance":null"#),
        "distance must serialize as null: {json_output}"
    );
}

#[test]
fn test_search_result_distance_serializes_as_number_with_center() {
    let result = PoiSearchResult {
        distance: Some(4.02),
        ..PoiSearchResult::default()
    };

    let json_output = serde_json::to_string(&result).unwrap();
    assert!(json_output.contains(r#""distance":4.02"#));
}

#[test]
fn test_role_uses_lowercase_wire_form() {
    assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), r#""admin""#);
    assert_eq!(serde_json::to_string(&Role::User).unwrap(), r#""user""#);

    assert_eq!(
        serde_json::from_str::<Role>(r#""admin""#).unwrap(),
        Role::Admin
    );
    // Anything outside the closed set fails to deserialize.
    assert!(serde_json::from_str::<Role>(r#""root""#).is_err());
}

#[test]
fn test_register_request_role_is_optional() {
    let payload: RegisterRequest = serde_json::from_str(
        r#"{
            "name": "Asha Traveller",
            "email": "asha@example.com",
            "password": "correct-horse-battery",
            "phone": "0123456789"
        }"#,
    )
    .unwrap();

    assert!(payload.role.is_none());
}

#[test]
fn test_update_user_request_optionality() {
    // Confirms the structure supports partial updates (all fields are Option<T>)
    let partial_update = UpdateUserRequest {
        name: Some("New Name Only".to_string()),
        email: None,
        phone: None,
    };

    let json_output = serde_json::to_string(&partial_update).unwrap();
    assert!(json_output.contains(r#""name":"New Name Only""#));
    assert!(!json_output.contains("email")); // None fields are omitted
}

#[test]
fn test_user_profile_never_carries_password_material() {
    let profile = UserProfile::default();
    let json_output = serde_json::to_string(&profile).unwrap();

    assert!(!json_output.contains("password"));
}
