//! Test helpers for inbound HTTP components.

use actix_web::dev::{Service, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, test as actix_test, web};
use serde_json::{Value, json};

use crate::inbound::http::configure;
use crate::inbound::http::state::HttpState;
use crate::test_support::FixturePorts;

/// Credentials of the seeded accounts.
pub(crate) const USER_LOGIN: (&str, &str, &str) = ("manish@example.com", "password123", "user");
pub(crate) const ADMIN_LOGIN: (&str, &str, &str) = ("admin@example.com", "admin123", "admin");

/// Open a seeded desk over in-memory doubles.
pub(crate) async fn fixture_state() -> (HttpState, FixturePorts) {
    let ports = FixturePorts::new();
    let (desk, _) = ports.open().await;
    (HttpState::new(desk), ports)
}

/// App serving every API route under `/api/v1`.
pub(crate) fn test_app(
    state: HttpState,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(state))
        .service(web::scope("/api/v1").configure(configure))
}

/// Send a JSON request and return the status plus decoded body
/// (`Value::Null` for empty bodies).
pub(crate) async fn send(
    app: &impl Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
    request: actix_test::TestRequest,
) -> (actix_web::http::StatusCode, Value) {
    let response = actix_test::call_service(app, request.to_request()).await;
    let status = response.status();
    let body = actix_test::read_body(response).await;
    let value = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).expect("JSON body")
    };
    (status, value)
}

/// Sign in through the API, asserting success.
pub(crate) async fn login(
    app: &impl Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
    (email, password, role): (&str, &str, &str),
) -> Value {
    let (status, body) = send(
        app,
        actix_test::TestRequest::post()
            .uri("/api/v1/login")
            .set_json(json!({ "email": email, "password": password, "role": role })),
    )
    .await;
    assert!(status.is_success(), "login failed: {body}");
    body
}

/// `details.<key>` of an error payload.
pub(crate) fn detail<'a>(body: &'a Value, key: &str) -> Option<&'a str> {
    body.get("details")
        .and_then(|details| details.get(key))
        .and_then(Value::as_str)
}
