//! End-to-end flow through the HTTP API: a resident files a complaint, an
//! administrator works it, and the resident follows progress.

use actix_web::dev::ServiceResponse;
use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use complaint_desk::Trace;
use complaint_desk::domain::TRACE_ID_HEADER;
use complaint_desk::inbound::http::configure;
use complaint_desk::inbound::http::state::HttpState;
use complaint_desk::test_support::FixturePorts;
use serde_json::{Value, json};

async fn body_of(response: ServiceResponse) -> (StatusCode, Option<String>, Value) {
    let status = response.status();
    let trace_id = response
        .headers()
        .get(TRACE_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);
    let bytes = test::read_body(response).await;
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("JSON body")
    };
    (status, trace_id, body)
}

macro_rules! call {
    ($app:expr, $request:expr) => {
        body_of(test::call_service(&$app, $request.to_request()).await).await
    };
}

#[actix_web::test]
async fn complaint_lifecycle_across_roles() {
    let ports = FixturePorts::new();
    let (desk, _) = ports.open().await;
    let app = test::init_service(
        App::new()
            .wrap(Trace)
            .app_data(web::Data::new(HttpState::new(desk)))
            .service(web::scope("/api/v1").configure(configure)),
    )
    .await;

    let (status, _, user) = call!(
        app,
        test::TestRequest::post().uri("/api/v1/register").set_json(json!({
            "name": "Alice",
            "email": "a@x.com",
            "password": "secret1",
            "confirmPassword": "secret1",
            "role": "user",
        }))
    );
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(user["email"], "a@x.com");

    let (status, _, complaint) = call!(
        app,
        test::TestRequest::post()
            .uri("/api/v1/complaint/new")
            .set_json(json!({
                "title": "Broken swing",
                "description": "The left swing chain in Elm Park snapped.",
                "category": "Parks",
                "priority": "high",
            }))
    );
    assert_eq!(status, StatusCode::CREATED);
    let id = complaint["id"].as_str().expect("complaint id").to_owned();

    let (status, _, _) = call!(app, test::TestRequest::post().uri("/api/v1/logout"));
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, trace_id, error) = call!(app, test::TestRequest::get().uri("/api/v1/admin"));
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error["traceId"].as_str(), trace_id.as_deref());

    let (status, _, _) = call!(
        app,
        test::TestRequest::post().uri("/api/v1/login").set_json(json!({
            "email": "admin@example.com",
            "password": "admin123",
            "role": "admin",
        }))
    );
    assert_eq!(status, StatusCode::OK);

    let (status, _, filtered) = call!(
        app,
        test::TestRequest::get().uri("/api/v1/admin/complaints?priority=high&category=parks")
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(filtered[0]["id"], id.as_str());
    assert_eq!(filtered[0]["ownerName"], "Alice");

    for (next, note) in [("in_progress", "Parts ordered"), ("resolved", "Chain replaced")] {
        let (status, _, updated) = call!(
            app,
            test::TestRequest::patch()
                .uri(&format!("/api/v1/admin/complaints/{id}/status"))
                .set_json(json!({ "status": next, "note": note }))
        );
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["status"], next);
    }

    let (status, _, _) = call!(app, test::TestRequest::post().uri("/api/v1/logout"));
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _, _) = call!(
        app,
        test::TestRequest::post().uri("/api/v1/login").set_json(json!({
            "email": "a@x.com",
            "password": "secret1",
        }))
    );
    assert_eq!(status, StatusCode::OK);

    let (_, _, tracked) = call!(
        app,
        test::TestRequest::get().uri(&format!("/api/v1/complaints/{id}"))
    );
    let history = tracked["history"].as_array().expect("history");
    assert_eq!(history.len(), 2);
    assert_eq!(history[1]["note"], "Chain replaced");

    let (_, _, dashboard) = call!(app, test::TestRequest::get().uri("/api/v1/dashboard"));
    assert_eq!(dashboard["stats"]["total"], 1);
    assert_eq!(dashboard["stats"]["byStatus"]["resolved"], 1);

    let (_, _, feed) = call!(app, test::TestRequest::get().uri("/api/v1/notifications"));
    assert_eq!(feed[0]["message"], format!("Complaint {id} resolved"));
}

#[actix_web::test]
async fn session_is_restored_after_a_restart() {
    let ports = FixturePorts::new();
    {
        let (desk, _) = ports.open().await;
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(HttpState::new(desk)))
                .service(web::scope("/api/v1").configure(configure)),
        )
        .await;
        let (status, _, _) = call!(
            app,
            test::TestRequest::post().uri("/api/v1/login").set_json(json!({
                "email": "manish@example.com",
                "password": "password123",
                "role": "user",
            }))
        );
        assert_eq!(status, StatusCode::OK);
    }

    let (desk, report) = ports.open().await;
    assert!(report.is_clean());
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(HttpState::new(desk)))
            .service(web::scope("/api/v1").configure(configure)),
    )
    .await;
    let (status, _, session) = call!(app, test::TestRequest::get().uri("/api/v1/session"));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(session["isAuthenticated"], true);
    assert_eq!(session["user"]["email"], "manish@example.com");
}
