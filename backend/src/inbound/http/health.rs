//! Health endpoints: liveness and readiness probes.
//!
//! The desk becomes ready once it has been opened; readiness also reports
//! how many store keys fell back to defaults while hydrating so operators
//! can spot a damaged data directory without reading the logs.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use actix_web::{HttpResponse, get, http::header, web};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::HydrationReport;

/// Shared probe state for the desk process.
pub struct HealthState {
    ready: AtomicBool,
    live: AtomicBool,
    hydration_issues: AtomicUsize,
}

impl Default for HealthState {
    fn default() -> Self {
        Self {
            ready: AtomicBool::new(false),
            live: AtomicBool::new(true),
            hydration_issues: AtomicUsize::new(0),
        }
    }
}

impl HealthState {
    /// Create a new health state starting as not ready but live.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the desk as opened, remembering how hydration went.
    pub fn mark_ready(&self, report: &HydrationReport) {
        self.hydration_issues
            .store(report.issues().len(), Ordering::Release);
        self.ready.store(true, Ordering::Release);
    }

    /// Flag the process as draining so liveness checks fail fast.
    pub fn mark_unhealthy(&self) {
        self.live.store(false, Ordering::Release);
    }

    /// Whether hydration has finished.
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// Whether the process is still serving.
    pub fn is_alive(&self) -> bool {
        self.live.load(Ordering::Acquire)
    }

    fn body(&self, probe_ok: bool) -> ProbeBody {
        ProbeBody {
            status: if probe_ok { "ok" } else { "unavailable" }.to_owned(),
            hydration_issues: self.hydration_issues.load(Ordering::Acquire),
        }
    }

    fn probe_response(&self, probe_ok: bool) -> HttpResponse {
        let mut response = if probe_ok {
            HttpResponse::Ok()
        } else {
            HttpResponse::ServiceUnavailable()
        };

        response
            .insert_header((header::CACHE_CONTROL, "no-store"))
            .json(self.body(probe_ok))
    }
}

/// Probe response body.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProbeBody {
    #[schema(example = "ok")]
    status: String,
    /// Store keys that fell back to defaults when the desk was opened.
    hydration_issues: usize,
}

/// Readiness probe. Return 200 once the desk is open; 503 before.
#[utoipa::path(
    get,
    path = "/health/ready",
    tags = ["health"],
    responses(
        (status = 200, description = "Desk is open", body = ProbeBody),
        (status = 503, description = "Desk is still hydrating", body = ProbeBody)
    )
)]
#[get("/health/ready")]
pub async fn ready(state: web::Data<HealthState>) -> HttpResponse {
    state.probe_response(state.is_ready())
}

/// Liveness probe. Return 200 while the process is marked alive and 503 once draining.
#[utoipa::path(
    get,
    path = "/health/live",
    tags = ["health"],
    responses(
        (status = 200, description = "Server is alive", body = ProbeBody),
        (status = 503, description = "Server is shutting down", body = ProbeBody)
    )
)]
#[get("/health/live")]
pub async fn live(state: web::Data<HealthState>) -> HttpResponse {
    state.probe_response(state.is_alive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::HydrationIssueKind;
    use crate::domain::ports::StoreKey;
    use actix_web::http::StatusCode;
    use actix_web::{App, test as actix_test};
    use rstest::rstest;
    use serde_json::Value;

    async fn probe(state: web::Data<HealthState>, uri: &str) -> (StatusCode, Value) {
        let app = actix_test::init_service(
            App::new().app_data(state).service(ready).service(live),
        )
        .await;
        let response =
            actix_test::call_service(&app, actix_test::TestRequest::get().uri(uri).to_request())
                .await;
        let status = response.status();
        assert_eq!(
            response
                .headers()
                .get(header::CACHE_CONTROL)
                .and_then(|value| value.to_str().ok()),
            Some("no-store")
        );
        let body = actix_test::read_body(response).await;
        (status, serde_json::from_slice(&body).expect("probe body"))
    }

    #[rstest]
    #[actix_web::test]
    async fn readiness_waits_for_the_desk() {
        let state = web::Data::new(HealthState::new());
        let (status, _) = probe(state.clone(), "/health/ready").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

        let mut report = HydrationReport::default();
        report.record(
            StoreKey::Theme,
            HydrationIssueKind::Corrupt {
                message: "expected an envelope object".into(),
            },
        );
        state.mark_ready(&report);

        let (status, body) = probe(state, "/health/ready").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["hydrationIssues"], 1);
    }

    #[rstest]
    #[actix_web::test]
    async fn liveness_fails_once_draining() {
        let state = web::Data::new(HealthState::new());
        let (status, body) = probe(state.clone(), "/health/live").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");

        state.mark_unhealthy();
        let (status, body) = probe(state, "/health/live").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["status"], "unavailable");
    }
}
