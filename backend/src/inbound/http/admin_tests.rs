//! Tests for administrator handlers.

use actix_web::http::StatusCode;
use actix_web::test as actix_test;
use rstest::rstest;
use serde_json::{Value, json};

use crate::inbound::http::test_utils::{
    ADMIN_LOGIN, USER_LOGIN, detail, fixture_state, login, send, test_app,
};

fn ids(body: &Value) -> Vec<&str> {
    body.as_array()
        .expect("array body")
        .iter()
        .filter_map(|complaint| complaint["id"].as_str())
        .collect()
}

#[rstest]
#[case("/api/v1/admin")]
#[case("/api/v1/admin/users")]
#[case("/api/v1/admin/complaints")]
#[actix_web::test]
async fn admin_routes_reject_regular_users(#[case] uri: &str) {
    let (state, _) = fixture_state().await;
    let app = actix_test::init_service(test_app(state)).await;

    let (status, _) = send(&app, actix_test::TestRequest::get().uri(uri)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    login(&app, USER_LOGIN).await;
    let (status, error) = send(&app, actix_test::TestRequest::get().uri(uri)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(error["message"], "administrator role required");
}

#[actix_web::test]
async fn overview_covers_the_whole_desk() {
    let (state, _) = fixture_state().await;
    let app = actix_test::init_service(test_app(state)).await;
    login(&app, ADMIN_LOGIN).await;

    let (status, body) = send(&app, actix_test::TestRequest::get().uri("/api/v1/admin")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["stats"]["total"], 3);
    assert_eq!(body["userCount"], 2);
    assert_eq!(
        body["stats"]["byPriority"],
        json!({ "low": 1, "medium": 1, "high": 1 })
    );
    assert_eq!(ids(&body["recent"]), ["CMP-003", "CMP-002", "CMP-001"]);
}

#[actix_web::test]
async fn user_listing_omits_credentials() {
    let (state, _) = fixture_state().await;
    let app = actix_test::init_service(test_app(state)).await;
    login(&app, ADMIN_LOGIN).await;

    let (status, users) = send(&app, actix_test::TestRequest::get().uri("/api/v1/admin/users")).await;
    assert_eq!(status, StatusCode::OK);
    let users = users.as_array().expect("user list");
    assert_eq!(users.len(), 2);
    for user in users {
        assert!(user.get("passwordHash").is_none());
        assert!(user.get("password").is_none());
    }
}

#[rstest]
#[case::everything("", &["CMP-003", "CMP-002", "CMP-001"])]
#[case::by_status("?status=in_progress", &["CMP-002"])]
#[case::by_priority("?priority=high", &["CMP-001"])]
#[case::category_ignores_case("?category=sanitation", &["CMP-002"])]
#[case::by_owner("?owner=admin-1", &[])]
#[case::search("?search=LEAK", &["CMP-003"])]
#[case::search_by_id("?search=cmp-001", &["CMP-001"])]
#[case::combined("?status=resolved&priority=low", &["CMP-003"])]
#[actix_web::test]
async fn complaint_listing_applies_filters(#[case] query: &str, #[case] expected: &[&str]) {
    let (state, _) = fixture_state().await;
    let app = actix_test::init_service(test_app(state)).await;
    login(&app, ADMIN_LOGIN).await;

    let (status, body) = send(
        &app,
        actix_test::TestRequest::get().uri(&format!("/api/v1/admin/complaints{query}")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body), expected);
}

#[rstest]
#[case("?status=closed", "status")]
#[case("?priority=urgent", "priority")]
#[case("?owner=bad%20id", "owner")]
#[actix_web::test]
async fn complaint_listing_rejects_bad_filters(#[case] query: &str, #[case] field: &str) {
    let (state, _) = fixture_state().await;
    let app = actix_test::init_service(test_app(state)).await;
    login(&app, ADMIN_LOGIN).await;

    let (status, error) = send(
        &app,
        actix_test::TestRequest::get().uri(&format!("/api/v1/admin/complaints{query}")),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(detail(&error, "field"), Some(field));
}

#[actix_web::test]
async fn status_updates_are_recorded_and_notified() {
    let (state, _) = fixture_state().await;
    let app = actix_test::init_service(test_app(state)).await;
    login(&app, ADMIN_LOGIN).await;

    let (status, complaint) = send(
        &app,
        actix_test::TestRequest::patch()
            .uri("/api/v1/admin/complaints/CMP-001/status")
            .set_json(json!({ "status": "in_progress", "note": "  Crew assigned  " })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(complaint["status"], "in_progress");
    let change = &complaint["history"][0];
    assert_eq!(change["from"], "submitted");
    assert_eq!(change["to"], "in_progress");
    assert_eq!(change["changedBy"], "admin-1");
    assert_eq!(change["note"], "Crew assigned");

    let (status, error) = send(
        &app,
        actix_test::TestRequest::patch()
            .uri("/api/v1/admin/complaints/CMP-001/status")
            .set_json(json!({ "status": "in_progress" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["code"], "invalid_request");

    let (status, _) = send(&app, actix_test::TestRequest::post().uri("/api/v1/logout")).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    login(&app, USER_LOGIN).await;
    let (_, feed) = send(
        &app,
        actix_test::TestRequest::get().uri("/api/v1/notifications"),
    )
    .await;
    assert_eq!(feed[0]["message"], "Complaint CMP-001 in progress");
}

#[rstest]
#[case("CMP-999", json!({ "status": "resolved" }), StatusCode::NOT_FOUND)]
#[case("CMP-001", json!({ "status": "closed" }), StatusCode::BAD_REQUEST)]
#[case("CMP-001", json!({ "status": "resolved", "note": "x".repeat(501) }), StatusCode::BAD_REQUEST)]
#[actix_web::test]
async fn status_updates_validate_input(
    #[case] id: &str,
    #[case] body: Value,
    #[case] expected: StatusCode,
) {
    let (state, _) = fixture_state().await;
    let app = actix_test::init_service(test_app(state)).await;
    login(&app, ADMIN_LOGIN).await;

    let (status, _) = send(
        &app,
        actix_test::TestRequest::patch()
            .uri(&format!("/api/v1/admin/complaints/{id}/status"))
            .set_json(body),
    )
    .await;
    assert_eq!(status, expected);
}
