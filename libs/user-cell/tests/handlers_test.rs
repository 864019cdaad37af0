use axum::extract::{Extension, Path, State};
use axum::Json;
use assert_matches::assert_matches;
use serde_json::{json, Map, Value};
use wiremock::{MockServer, Mock, ResponseTemplate};
use wiremock::matchers::{body_json, body_partial_json, method, path, query_param};

use user_cell::handlers::{check_admin, list_users, make_admin, upsert_user};
use shared_models::error::AppError;
use shared_utils::jwt::validate_token;
use shared_utils::test_utils::{MockSupabaseResponses, TestConfig, TestUser};

async fn mount_user_lookup(mock_server: &MockServer, email: &str, rows: Value) {
    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .and(query_param("email", format!("eq.{}", email)))
        .respond_with(ResponseTemplate::new(200).set_body_json(rows))
        .mount(mock_server)
        .await;
}

fn profile(value: Value) -> Json<Map<String, Value>> {
    match value {
        Value::Object(map) => Json(map),
        _ => panic!("profile must be an object"),
    }
}

#[tokio::test]
async fn test_upsert_user_returns_record_and_token() {
    let mock_server = MockServer::start().await;
    mount_user_lookup(&mock_server, "ann@x.com", json!([])).await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/users"))
        .and(query_param("on_conflict", "email"))
        .and(body_json(json!({ "email": "ann@x.com", "profile": { "name": "Ann" } })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            { "email": "ann@x.com", "profile": { "name": "Ann" } }
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = TestConfig::with_database(&mock_server.uri()).to_arc();
    let body = profile(json!({ "email": "spoofed@x.com", "name": "Ann", "role": "admin" }));

    let response = upsert_user(State(config.clone()), Path("ann@x.com".to_string()), body)
        .await
        .unwrap()
        .0;

    assert_eq!(response["result"]["email"], "ann@x.com");
    assert_eq!(response["result"]["name"], "Ann");
    assert!(response["result"].get("role").is_none());

    let token = response["token"].as_str().unwrap();
    let identity = validate_token(token, &config.jwt_secret).unwrap();
    assert_eq!(identity.email, "ann@x.com");
    assert!(!identity.is_admin());
}

#[tokio::test]
async fn test_upsert_keeps_arbitrary_fields_and_merges_existing_profile() {
    let mock_server = MockServer::start().await;
    mount_user_lookup(&mock_server, "ann@x.com", json!([
        { "email": "ann@x.com", "profile": { "name": "Ann", "phone": "555-0100" } }
    ])).await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/users"))
        .and(body_json(json!({
            "email": "ann@x.com",
            "profile": { "name": "Ann B.", "phone": "555-0100", "nickname": "annie" }
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            {
                "email": "ann@x.com",
                "profile": { "name": "Ann B.", "phone": "555-0100", "nickname": "annie" }
            }
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = TestConfig::with_database(&mock_server.uri()).to_arc();
    let body = profile(json!({ "name": "Ann B.", "nickname": "annie" }));

    let response = upsert_user(State(config), Path("ann@x.com".to_string()), body)
        .await
        .unwrap()
        .0;

    assert_eq!(response["result"]["nickname"], "annie");
    assert_eq!(response["result"]["phone"], "555-0100");
    assert_eq!(response["result"]["name"], "Ann B.");
}

#[tokio::test]
async fn test_upsert_existing_admin_keeps_role_in_token() {
    let mock_server = MockServer::start().await;
    mount_user_lookup(&mock_server, "boss@x.com", json!([
        MockSupabaseResponses::user_row("boss@x.com", Some("admin"))
    ])).await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::user_row("boss@x.com", Some("admin"))
        ])))
        .mount(&mock_server)
        .await;

    let config = TestConfig::with_database(&mock_server.uri()).to_arc();
    let response = upsert_user(State(config.clone()), Path("boss@x.com".to_string()), profile(json!({})))
        .await
        .unwrap()
        .0;

    let identity = validate_token(response["token"].as_str().unwrap(), &config.jwt_secret).unwrap();
    assert!(identity.is_admin());
}

#[tokio::test]
async fn test_upsert_without_secret_fails() {
    let mock_server = MockServer::start().await;
    mount_user_lookup(&mock_server, "ann@x.com", json!([])).await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/users"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            MockSupabaseResponses::user_row("ann@x.com", None)
        ])))
        .mount(&mock_server)
        .await;

    let mut config = TestConfig::with_database(&mock_server.uri()).to_app_config();
    config.jwt_secret.clear();

    let result = upsert_user(State(std::sync::Arc::new(config)), Path("ann@x.com".to_string()), profile(json!({}))).await;

    assert_matches!(result, Err(AppError::Internal(_)));
}

#[tokio::test]
async fn test_admin_promotes_target() {
    let mock_server = MockServer::start().await;
    mount_user_lookup(&mock_server, "boss@x.com", json!([
        MockSupabaseResponses::user_row("boss@x.com", Some("admin"))
    ])).await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/users"))
        .and(query_param("email", "eq.ann@x.com"))
        .and(body_partial_json(json!({ "role": "admin" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::user_row("ann@x.com", Some("admin"))
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = TestConfig::with_database(&mock_server.uri()).to_arc();
    let identity = TestUser::patient("boss@x.com").to_identity();

    let outcome = make_admin(State(config), Extension(identity), Path("ann@x.com".to_string()))
        .await
        .unwrap()
        .0;

    assert_eq!(outcome.modified_count, 1);
}

#[tokio::test]
async fn test_non_admin_cannot_promote() {
    let mock_server = MockServer::start().await;
    mount_user_lookup(&mock_server, "ann@x.com", json!([
        MockSupabaseResponses::user_row("ann@x.com", None)
    ])).await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&mock_server)
        .await;

    let config = TestConfig::with_database(&mock_server.uri()).to_arc();
    // An admin claim in the token is not enough; the stored record decides.
    let identity = TestUser::admin("ann@x.com").to_identity();

    let result = make_admin(State(config), Extension(identity), Path("bob@x.com".to_string())).await;

    assert_matches!(result, Err(AppError::Forbidden));
}

#[tokio::test]
async fn test_unknown_requester_cannot_promote() {
    let mock_server = MockServer::start().await;
    mount_user_lookup(&mock_server, "ghost@x.com", json!([])).await;

    let config = TestConfig::with_database(&mock_server.uri()).to_arc();
    let identity = TestUser::patient("ghost@x.com").to_identity();

    let result = make_admin(State(config), Extension(identity), Path("bob@x.com".to_string())).await;

    assert_matches!(result, Err(AppError::Forbidden));
}

#[tokio::test]
async fn test_list_users() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::user_row("ann@x.com", None),
            MockSupabaseResponses::user_row("boss@x.com", Some("admin"))
        ])))
        .mount(&mock_server)
        .await;

    let config = TestConfig::with_database(&mock_server.uri()).to_arc();
    let identity = TestUser::patient("ann@x.com").to_identity();

    let users = list_users(State(config), Extension(identity)).await.unwrap().0;

    assert_eq!(users.len(), 2);
    assert!(users[1].is_admin());
    assert_eq!(users[0].profile["name"], "Test User");
}

#[tokio::test]
async fn test_check_admin() {
    let mock_server = MockServer::start().await;
    mount_user_lookup(&mock_server, "boss@x.com", json!([
        MockSupabaseResponses::user_row("boss@x.com", Some("admin"))
    ])).await;
    mount_user_lookup(&mock_server, "ann@x.com", json!([
        MockSupabaseResponses::user_row("ann@x.com", None)
    ])).await;
    mount_user_lookup(&mock_server, "ghost@x.com", json!([])).await;

    let config = TestConfig::with_database(&mock_server.uri()).to_arc();

    for (email, expected) in [("boss@x.com", true), ("ann@x.com", false), ("ghost@x.com", false)] {
        let status = check_admin(State(config.clone()), Path(email.to_string())).await.unwrap().0;
        assert_eq!(status.admin, expected, "{}", email);
    }
}
