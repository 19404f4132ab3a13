//! Theme preference handlers.
//!
//! The client tells the desk whether its system prefers a dark scheme; the
//! response carries both the stored preference and the theme to apply.

use actix_web::{get, put, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{ResolvedTheme, ThemePreference};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{ErrorSchema, ResolvedThemeSchema, ThemePreferenceSchema};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_theme};

/// `?systemPrefersDark=true|false`; absent means light.
#[derive(Debug, Default, Deserialize, Serialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ThemeQuery {
    /// Whether the client's system prefers a dark palette.
    pub system_prefers_dark: Option<bool>,
}

/// Body of `PUT /api/v1/theme`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ThemeRequest {
    /// `light`, `dark` or `system`.
    #[schema(example = "dark")]
    pub preference: String,
}

/// Stored preference plus the theme it resolves to.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ThemeResponse {
    /// Stored preference.
    #[schema(value_type = ThemePreferenceSchema)]
    pub preference: ThemePreference,
    /// Palette to apply.
    #[schema(value_type = ResolvedThemeSchema)]
    pub resolved: ResolvedTheme,
}

impl ThemeResponse {
    fn new(preference: ThemePreference, query: &ThemeQuery) -> Self {
        Self {
            preference,
            resolved: preference.resolve(query.system_prefers_dark.unwrap_or(false)),
        }
    }
}

/// Read the theme preference and the palette it resolves to.
#[utoipa::path(
    get,
    path = "/api/v1/theme",
    params(ThemeQuery),
    responses((status = 200, description = "Theme", body = ThemeResponse)),
    tags = ["theme"],
    operation_id = "getTheme"
)]
#[get("/theme")]
pub async fn get_theme(
    state: web::Data<HttpState>,
    query: web::Query<ThemeQuery>,
) -> web::Json<ThemeResponse> {
    let desk = state.desk().await;
    web::Json(ThemeResponse::new(desk.theme().preference(), &query))
}

/// Store a new preference.
#[utoipa::path(
    put,
    path = "/api/v1/theme",
    params(ThemeQuery),
    request_body = ThemeRequest,
    responses(
        (status = 200, description = "Theme", body = ThemeResponse),
        (status = 400, description = "Unknown preference", body = ErrorSchema),
        (status = 503, description = "Preference could not be saved", body = ErrorSchema)
    ),
    tags = ["theme"],
    operation_id = "setTheme"
)]
#[put("/theme")]
pub async fn set_theme(
    state: web::Data<HttpState>,
    query: web::Query<ThemeQuery>,
    payload: web::Json<ThemeRequest>,
) -> ApiResult<web::Json<ThemeResponse>> {
    let preference = parse_theme(&payload.preference, FieldName::new("preference"))?;
    let mut desk = state.desk().await;
    let preference = desk.theme_mut().set(preference).await?;
    Ok(web::Json(ThemeResponse::new(preference, &query)))
}
