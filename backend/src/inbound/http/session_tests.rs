//! Tests for account and session handlers.

use actix_web::http::StatusCode;
use actix_web::test as actix_test;
use rstest::rstest;
use serde_json::{Value, json};

use crate::domain::ports::{KeyValueStore, StoreKey};
use crate::inbound::http::test_utils::{
    ADMIN_LOGIN, USER_LOGIN, detail, fixture_state, login, send, test_app,
};

fn register_request(body: Value) -> actix_test::TestRequest {
    actix_test::TestRequest::post()
        .uri("/api/v1/register")
        .set_json(body)
}

async fn session_of(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
    >,
) -> Value {
    let (status, body) = send(app, actix_test::TestRequest::get().uri("/api/v1/session")).await;
    assert_eq!(status, StatusCode::OK);
    body
}

#[actix_web::test]
async fn session_starts_empty() {
    let (state, _) = fixture_state().await;
    let app = actix_test::init_service(test_app(state)).await;

    let body = session_of(&app).await;
    assert_eq!(body, json!({ "user": null, "isAuthenticated": false }));
}

#[actix_web::test]
async fn seeded_user_can_sign_in_and_out() {
    let (state, ports) = fixture_state().await;
    let app = actix_test::init_service(test_app(state)).await;

    let user = login(&app, USER_LOGIN).await;
    assert_eq!(
        user,
        json!({
            "id": "user-1",
            "name": "Manish Kumar",
            "email": "manish@example.com",
            "role": "user",
        })
    );
    let body = session_of(&app).await;
    assert_eq!(body["isAuthenticated"], true);
    assert_eq!(body["user"]["id"], "user-1");
    assert!(
        ports
            .store
            .load(StoreKey::CurrentUser)
            .await
            .expect("store read")
            .is_some()
    );

    let (status, _) = send(&app, actix_test::TestRequest::post().uri("/api/v1/logout")).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(session_of(&app).await["isAuthenticated"], false);
    assert!(
        ports
            .store
            .load(StoreKey::CurrentUser)
            .await
            .expect("store read")
            .is_none()
    );
}

#[rstest]
#[case::wrong_role(json!({ "email": "manish@example.com", "password": "password123", "role": "admin" }))]
#[case::wrong_password(json!({ "email": "manish@example.com", "password": "password124" }))]
#[case::email_case(json!({ "email": "Manish@example.com", "password": "password123" }))]
#[actix_web::test]
async fn mismatched_credentials_are_unauthorised(#[case] body: Value) {
    let (state, _) = fixture_state().await;
    let app = actix_test::init_service(test_app(state)).await;

    let (status, error) = send(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/login")
            .set_json(body),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error["code"], "unauthorized");
    assert_eq!(session_of(&app).await["isAuthenticated"], false);
}

#[rstest]
#[case::blank_email(json!({ "email": " ", "password": "x" }), "email", "missing_field")]
#[case::unknown_role(
    json!({ "email": "a@x.com", "password": "x", "role": "root" }),
    "role",
    "unknown_value"
)]
#[actix_web::test]
async fn malformed_logins_are_invalid_requests(
    #[case] body: Value,
    #[case] field: &str,
    #[case] code: &str,
) {
    let (state, _) = fixture_state().await;
    let app = actix_test::init_service(test_app(state)).await;

    let (status, error) = send(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/login")
            .set_json(body),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(detail(&error, "field"), Some(field));
    assert_eq!(detail(&error, "code"), Some(code));
}

#[actix_web::test]
async fn registration_signs_in_and_rejects_duplicates() {
    let (state, _) = fixture_state().await;
    let app = actix_test::init_service(test_app(state)).await;
    let alice = json!({
        "name": "Alice",
        "email": "a@x.com",
        "password": "secret1",
        "confirmPassword": "secret1",
        "role": "user",
    });

    let (status, user) = send(&app, register_request(alice.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(user["email"], "a@x.com");
    assert!(user.get("password").is_none());
    assert_eq!(session_of(&app).await["user"]["email"], "a@x.com");

    let (status, error) = send(&app, register_request(alice)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error["message"], "email already exists");
}

#[rstest]
#[case::mismatch("secret1", "secret2", "confirmPassword", "password_mismatch")]
#[case::too_short("abc", "abc", "password", "password_too_short")]
#[actix_web::test]
async fn registration_validates_passwords(
    #[case] password: &str,
    #[case] confirm: &str,
    #[case] field: &str,
    #[case] code: &str,
) {
    let (state, _) = fixture_state().await;
    let app = actix_test::init_service(test_app(state)).await;

    let (status, error) = send(
        &app,
        register_request(json!({
            "name": "Alice",
            "email": "a@x.com",
            "password": password,
            "confirmPassword": confirm,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(detail(&error, "field"), Some(field));
    assert_eq!(detail(&error, "code"), Some(code));
}

#[actix_web::test]
async fn registration_reports_store_outage() {
    let (state, ports) = fixture_state().await;
    let app = actix_test::init_service(test_app(state)).await;
    ports.store.set_fail_writes(true);

    let (status, error) = send(
        &app,
        register_request(json!({
            "name": "Alice",
            "email": "a@x.com",
            "password": "secret1",
            "confirmPassword": "secret1",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(error["code"], "service_unavailable");
    assert_eq!(session_of(&app).await["isAuthenticated"], false);
}

#[actix_web::test]
async fn profile_updates_require_a_session() {
    let (state, _) = fixture_state().await;
    let app = actix_test::init_service(test_app(state)).await;

    let (status, _) = send(
        &app,
        actix_test::TestRequest::patch()
            .uri("/api/v1/users/me")
            .set_json(json!({ "name": "Someone" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn profile_updates_change_the_session_user() {
    let (state, _) = fixture_state().await;
    let app = actix_test::init_service(test_app(state)).await;
    login(&app, USER_LOGIN).await;

    let (status, user) = send(
        &app,
        actix_test::TestRequest::patch()
            .uri("/api/v1/users/me")
            .set_json(json!({ "name": "Manish K." })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(user["name"], "Manish K.");
    assert_eq!(session_of(&app).await["user"]["name"], "Manish K.");

    let (status, error) = send(
        &app,
        actix_test::TestRequest::patch()
            .uri("/api/v1/users/me")
            .set_json(json!({ "email": ADMIN_LOGIN.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error["code"], "conflict");

    let (status, error) = send(
        &app,
        actix_test::TestRequest::patch()
            .uri("/api/v1/users/me")
            .set_json(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(detail(&error, "code"), Some("empty_update"));
}
