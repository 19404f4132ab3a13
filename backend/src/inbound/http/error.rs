//! Rendering desk failures as HTTP responses.
//!
//! [`Error`] stays HTTP-agnostic in the domain; this module gives it a
//! status code and a JSON body. Extractor failures (a body that is not
//! JSON, a query string with an unknown enum value) are routed through the
//! same envelope by the handlers registered in [`extractor_config`], so a
//! client only ever sees one error shape.
//!
//! Store outages answer `503` with `Retry-After`. Internal failures are
//! logged in full and returned with a generic message.

use actix_web::error::{JsonPayloadError, QueryPayloadError};
use actix_web::http::StatusCode;
use actix_web::http::header::RETRY_AFTER;
use actix_web::{HttpRequest, HttpResponse, ResponseError, web};
use serde_json::json;
use tracing::{debug, error, warn};

use crate::domain::{Error, ErrorCode, TRACE_ID_HEADER};

/// Convenient result alias for HTTP handlers.
pub use crate::domain::ApiResult;

const REDACTED_MESSAGE: &str = "Internal server error";
const RETRY_AFTER_SECONDS: &str = "1";

const fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::Forbidden => StatusCode::FORBIDDEN,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Conflict => StatusCode::CONFLICT,
        ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// The body clients receive: internal failures lose message and details.
fn client_view(err: &Error) -> Error {
    if err.code() != ErrorCode::InternalError {
        return err.clone();
    }
    let redacted = Error::internal(REDACTED_MESSAGE);
    match err.trace_id() {
        Some(id) => redacted.with_trace_id(id.to_owned()),
        None => redacted,
    }
}

fn log_failure(err: &Error, status: StatusCode) {
    let trace_id = err.trace_id().unwrap_or("-");
    match err.code() {
        ErrorCode::InternalError => {
            error!(%status, trace_id, message = err.message(), "request failed");
        }
        ErrorCode::ServiceUnavailable => {
            warn!(%status, trace_id, message = err.message(), "store unavailable");
        }
        _ => debug!(%status, trace_id, message = err.message(), "request rejected"),
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        log_failure(self, status);

        let mut response = HttpResponse::build(status);
        if let Some(id) = self.trace_id() {
            response.insert_header((TRACE_ID_HEADER, id.to_owned()));
        }
        if self.code() == ErrorCode::ServiceUnavailable {
            response.insert_header((RETRY_AFTER, RETRY_AFTER_SECONDS));
        }
        response.json(client_view(self))
    }
}

fn malformed_body(err: &JsonPayloadError) -> Error {
    let code = match err {
        JsonPayloadError::ContentType => "unsupported_content_type",
        JsonPayloadError::Overflow { .. } | JsonPayloadError::OverflowKnownLength { .. } => {
            "body_too_large"
        }
        _ => "malformed_body",
    };
    Error::invalid_request(format!("request body rejected: {err}"))
        .with_details(json!({ "code": code }))
}

fn malformed_query(err: &QueryPayloadError) -> Error {
    Error::invalid_request(format!("query string rejected: {err}"))
        .with_details(json!({ "code": "malformed_query" }))
}

/// Extractor settings that report failures with the desk error envelope.
///
/// Register once per scope via `configure`.
pub fn extractor_config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req: &HttpRequest| malformed_body(&err).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req: &HttpRequest| malformed_query(&err).into()),
    );
}
