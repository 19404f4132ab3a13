//! OpenAPI documentation configuration.
//!
//! This module defines the [`ApiDoc`] struct which generates the OpenAPI
//! specification for the desk API. It registers:
//!
//! - **Paths**: every handler from the inbound HTTP layer plus the probes
//! - **Schemas**: domain type wrappers from
//!   [`crate::inbound::http::schemas`] and the request/response bodies the
//!   handlers define, so domain types stay free of utoipa
//!
//! The generated specification is used by Swagger UI (debug builds) and
//! exported via `cargo run --bin openapi-dump` for external tooling.

use crate::inbound::http::admin::{AdminOverviewResponse, StatusUpdateRequest};
use crate::inbound::http::complaints::{
    ComplaintEditRequest, DashboardResponse, NewComplaintRequest,
};
use crate::inbound::http::health::ProbeBody;
use crate::inbound::http::schemas::{
    CategoryCountSchema, ComplaintSchema, ComplaintStatsSchema, ComplaintStatusSchema,
    ErrorCodeSchema, ErrorSchema, NotificationKindSchema, NotificationSchema,
    PriorityCountsSchema, PrioritySchema, ResolvedThemeSchema, RoleSchema, StatusChangeSchema,
    StatusCountsSchema, ThemePreferenceSchema, UserSchema,
};
use crate::inbound::http::session::{
    LoginRequest, RegisterRequest, SessionResponse, UpdateUserRequest,
};
use crate::inbound::http::theme::{ThemeRequest, ThemeResponse};
use utoipa::OpenApi;

/// OpenAPI document for the desk API.
/// Swagger UI is enabled in debug builds only and used by tooling.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Complaint desk API",
        description = "Local HTTP interface for accounts, complaints, theme preference and health probes.",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::session::login,
        crate::inbound::http::session::register,
        crate::inbound::http::session::logout,
        crate::inbound::http::session::current_session,
        crate::inbound::http::session::update_current_user,
        crate::inbound::http::complaints::dashboard,
        crate::inbound::http::complaints::list_own_complaints,
        crate::inbound::http::complaints::file_complaint,
        crate::inbound::http::complaints::get_complaint,
        crate::inbound::http::complaints::edit_complaint,
        crate::inbound::http::complaints::notifications,
        crate::inbound::http::admin::admin_overview,
        crate::inbound::http::admin::list_users,
        crate::inbound::http::admin::list_complaints,
        crate::inbound::http::admin::update_status,
        crate::inbound::http::theme::get_theme,
        crate::inbound::http::theme::set_theme,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        RoleSchema,
        UserSchema,
        ComplaintStatusSchema,
        PrioritySchema,
        StatusChangeSchema,
        ComplaintSchema,
        StatusCountsSchema,
        PriorityCountsSchema,
        CategoryCountSchema,
        ComplaintStatsSchema,
        NotificationKindSchema,
        NotificationSchema,
        ThemePreferenceSchema,
        ResolvedThemeSchema,
        LoginRequest,
        RegisterRequest,
        UpdateUserRequest,
        SessionResponse,
        NewComplaintRequest,
        ComplaintEditRequest,
        DashboardResponse,
        AdminOverviewResponse,
        StatusUpdateRequest,
        ThemeRequest,
        ThemeResponse,
        ProbeBody,
    )),
    tags(
        (name = "session", description = "Registration, login and the current session"),
        (name = "complaints", description = "Filing and tracking your own complaints"),
        (name = "admin", description = "Administrator views and status changes"),
        (name = "theme", description = "Light, dark or system theme preference"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    //! Tests verifying OpenAPI schema field structure and path registration.

    use super::*;
    use rstest::rstest;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    // Note: utoipa replaces :: with . in schema names
    const ERROR_SCHEMA_NAME: &str = "crate.domain.Error";
    const USER_SCHEMA_NAME: &str = "crate.domain.User";
    const COMPLAINT_SCHEMA_NAME: &str = "crate.domain.Complaint";

    /// Assert that an Object schema contains a field with the given name.
    fn assert_object_schema_has_field(schema: &RefOr<Schema>, field: &str) {
        match schema {
            RefOr::T(Schema::Object(obj)) => {
                assert!(
                    obj.properties.contains_key(field),
                    "schema should have field '{field}'"
                );
            }
            _ => panic!("expected Object schema"),
        }
    }

    #[rstest]
    #[case(ERROR_SCHEMA_NAME, &["code", "message", "traceId"])]
    #[case(USER_SCHEMA_NAME, &["id", "name", "email", "role"])]
    #[case(COMPLAINT_SCHEMA_NAME, &["id", "status", "ownerId", "history"])]
    fn openapi_schemas_have_required_fields(#[case] name: &str, #[case] fields: &[&str]) {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let schema = schemas.get(name).expect("schema registered");
        for field in fields {
            assert_object_schema_has_field(schema, field);
        }
    }

    #[rstest]
    #[case("/api/v1/login")]
    #[case("/api/v1/register")]
    #[case("/api/v1/complaint/new")]
    #[case("/api/v1/complaints/{id}")]
    #[case("/api/v1/admin/complaints/{id}/status")]
    #[case("/api/v1/theme")]
    #[case("/health/ready")]
    fn openapi_registers_paths(#[case] path: &str) {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key(path), "missing path {path}");
    }

    #[rstest]
    fn user_schema_never_exposes_credentials() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        match schemas.get(USER_SCHEMA_NAME).expect("User schema") {
            RefOr::T(Schema::Object(obj)) => {
                assert!(!obj.properties.contains_key("password"));
                assert!(!obj.properties.contains_key("passwordHash"));
            }
            _ => panic!("expected Object schema"),
        }
    }
}
