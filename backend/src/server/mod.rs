//! Server construction and middleware wiring.

mod config;

pub use config::{DeskSettings, ServerConfig, StorageMode};

use std::sync::Arc;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use mockable::DefaultClock;
use tracing::info;

use complaint_desk::Trace;
#[cfg(debug_assertions)]
use complaint_desk::doc::ApiDoc;
use complaint_desk::domain::ports::{KeyValueStore, MemoryKeyValueStore};
use complaint_desk::domain::{Desk, DeskPorts, HydrationReport};
use complaint_desk::inbound::http::configure;
use complaint_desk::inbound::http::health::{HealthState, live, ready};
use complaint_desk::inbound::http::state::HttpState;
use complaint_desk::outbound::hashing::Argon2PasswordHasher;
use complaint_desk::outbound::storage::CapStdKeyValueStore;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

/// Select the store adapter for the configured storage mode.
///
/// # Errors
/// Returns [`std::io::Error`] when the data directory cannot be created or
/// opened.
fn build_store(config: &ServerConfig) -> std::io::Result<Arc<dyn KeyValueStore>> {
    match config.storage() {
        StorageMode::Directory(path) => {
            let store = CapStdKeyValueStore::open(path).map_err(std::io::Error::other)?;
            info!(data_dir = %path, "using on-disk store");
            Ok(Arc::new(store))
        }
        StorageMode::Ephemeral => {
            info!("using in-memory store; documents are lost on exit");
            Ok(Arc::new(MemoryKeyValueStore::new()))
        }
    }
}

/// Open the desk over the production adapters.
///
/// # Errors
/// Returns [`std::io::Error`] when the store cannot be opened or the desk
/// fails to hydrate.
pub async fn open_desk(config: &ServerConfig) -> std::io::Result<(Desk, HydrationReport)> {
    let ports = DeskPorts {
        store: build_store(config)?,
        hasher: Arc::new(Argon2PasswordHasher::new()),
        clock: Arc::new(DefaultClock),
    };
    Desk::open(ports)
        .await
        .map_err(|err| std::io::Error::other(format!("desk failed to open: {err}")))
}

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
    } = deps;

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(Trace)
        .service(web::scope("/api/v1").configure(configure))
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
    #[cfg(not(debug_assertions))]
    let app = app;

    app
}

/// Open the desk and construct an Actix HTTP server around it.
///
/// # Parameters
/// - `health_state`: shared readiness state, marked ready once the desk has
///   been hydrated.
/// - `config`: pre-built [`ServerConfig`] holding the bind address and the
///   storage mode.
///
/// # Returns
/// A spawned [`Server`] that must be awaited to drive the listener.
///
/// # Errors
/// Propagates [`std::io::Error`] when opening the desk, binding the socket or
/// starting the server fails.
pub async fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let (desk, report) = open_desk(&config).await?;
    let http_state = web::Data::new(HttpState::new(desk));
    let server_health_state = health_state.clone();

    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
        })
    })
    .bind(config.bind_addr())?
    .run();

    health_state.mark_ready(&report);
    info!(
        bind_addr = %config.bind_addr(),
        hydration_issues = report.issues().len(),
        "complaint desk listening"
    );
    Ok(server)
}

#[cfg(test)]
mod tests {
    //! Wiring tests for the assembled application.

    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use rstest::rstest;
    use serde_json::Value;

    async fn ephemeral_deps() -> AppDependencies {
        let config = ServerConfig::new("127.0.0.1:0".parse().expect("socket address"), "unused".into())
            .ephemeral();
        let (desk, report) = open_desk(&config).await.expect("ephemeral desk opens");
        let health_state = web::Data::new(HealthState::new());
        health_state.mark_ready(&report);
        AppDependencies {
            health_state,
            http_state: web::Data::new(HttpState::new(desk)),
        }
    }

    #[rstest]
    #[case("/health/ready")]
    #[case("/health/live")]
    #[actix_web::test]
    async fn probes_are_served_outside_the_api_scope(#[case] uri: &str) {
        let app = actix_test::init_service(build_app(ephemeral_deps().await)).await;
        let res = actix_test::call_service(&app, actix_test::TestRequest::get().uri(uri).to_request())
            .await;
        assert_eq!(res.status(), StatusCode::OK);
        assert!(res.headers().contains_key("trace-id"));
    }

    #[actix_web::test]
    async fn seeded_accounts_can_log_in_through_the_assembled_app() {
        let app = actix_test::init_service(build_app(ephemeral_deps().await)).await;
        let req = actix_test::TestRequest::post()
            .uri("/api/v1/login")
            .set_json(serde_json::json!({
                "email": "admin@example.com",
                "password": "admin123",
                "role": "admin",
            }))
            .to_request();
        let res = actix_test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body["role"], "admin");
    }

    #[cfg(debug_assertions)]
    #[actix_web::test]
    async fn openapi_document_is_served_in_debug_builds() {
        let app = actix_test::init_service(build_app(ephemeral_deps().await)).await;
        let req = actix_test::TestRequest::get()
            .uri("/api-docs/openapi.json")
            .to_request();
        let res = actix_test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(res).await;
        assert!(body["paths"].get("/api/v1/complaint/new").is_some());
    }
}
